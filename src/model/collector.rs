use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::{
    answer::{first_missing, Answer, AnswerError, AnswerValue},
    question::Question,
};

/// The answers given so far in one response session, keyed by question index.
///
/// A collector lives as long as the screen taking the response; dropping it
/// discards the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCollector {
    answers: BTreeMap<usize, AnswerValue>,
}

impl ResponseCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current value for the question at `index`, if it has been touched.
    pub fn answer(&self, index: usize) -> Option<&AnswerValue> {
        self.answers.get(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Record `value` for the question at `index`, replacing whatever was there.
    pub fn set_answer(&mut self, index: usize, value: AnswerValue) {
        self.answers.insert(index, value);
    }

    /// Select `option` for the multi-choice question at `index` if it is not
    /// selected yet, or deselect it if it is.
    pub fn toggle_option(&mut self, index: usize, option: impl Into<String>) {
        let option = option.into();
        let entry = self
            .answers
            .entry(index)
            .or_insert_with(|| AnswerValue::Choices(BTreeSet::new()));
        match entry {
            AnswerValue::Choices(selected) => {
                if !selected.remove(&option) {
                    selected.insert(option);
                }
            }
            other => *other = AnswerValue::Choices(BTreeSet::from([option])),
        }
    }

    /// Check that every question has a non-blank answer.
    ///
    /// Questions are checked in ascending order and only the first missing
    /// one is reported.
    pub fn validate_complete(&self, questions: &[Question]) -> Result<(), AnswerError> {
        match first_missing(questions.len(), &self.answers) {
            Some(index) => Err(AnswerError::MissingAnswer(index)),
            None => Ok(()),
        }
    }

    /// Build the submission for `questions`, ordered by question index.
    ///
    /// Fails if any question is unanswered or an answer does not fit its
    /// question. Answers for indices beyond the last question are dropped.
    pub fn to_submission(&self, questions: &[Question]) -> Result<Submission, AnswerError> {
        self.validate_complete(questions)?;
        let answers = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                // Present and non-blank after `validate_complete`.
                match self.answers.get(&index) {
                    Some(value) if question.accepts(value) => Ok(Answer {
                        question_index: index,
                        answer: value.clone(),
                    }),
                    _ => Err(AnswerError::MismatchedAnswer(index)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Submission { answers })
    }
}

/// The body of a response submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub answers: Vec<Answer>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn questions() -> Vec<Question> {
        vec![
            Question::short_text_example(),
            Question::multi_example(),
            Question::rating_example(),
        ]
    }

    fn complete() -> ResponseCollector {
        let mut collector = ResponseCollector::new();
        collector.set_answer(2, AnswerValue::Rating(3));
        collector.set_answer(0, AnswerValue::Text("Compilers".into()));
        collector.toggle_option(1, "Red");
        collector
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut collector = ResponseCollector::new();
        collector.toggle_option(0, "Red");
        collector.toggle_option(0, "Blue");
        collector.toggle_option(0, "Red");
        assert_eq!(
            collector.answer(0),
            Some(&AnswerValue::Choices(BTreeSet::from(["Blue".to_string()])))
        );

        collector.toggle_option(0, "Blue");
        assert_eq!(collector.answer(0), Some(&AnswerValue::Choices(BTreeSet::new())));
        assert_eq!(
            collector.validate_complete(&[Question::multi_example()]),
            Err(AnswerError::MissingAnswer(0))
        );
    }

    #[test]
    fn toggling_replaces_other_values() {
        let mut collector = ResponseCollector::new();
        collector.set_answer(0, AnswerValue::Text("Red".into()));
        collector.toggle_option(0, "Blue");
        assert_eq!(
            collector.answer(0),
            Some(&AnswerValue::Choices(BTreeSet::from(["Blue".to_string()])))
        );
    }

    #[test]
    fn setting_an_answer_is_idempotent() {
        let mut once = ResponseCollector::new();
        once.set_answer(1, AnswerValue::Rating(2));

        let mut twice = ResponseCollector::new();
        twice.set_answer(1, AnswerValue::Rating(2));
        twice.set_answer(1, AnswerValue::Rating(2));

        assert_eq!(once, twice);
    }

    #[test]
    fn last_write_wins() {
        let mut collector = ResponseCollector::new();
        collector.set_answer(0, AnswerValue::Rating(1));
        collector.set_answer(0, AnswerValue::Rating(5));
        assert_eq!(collector.answer(0), Some(&AnswerValue::Rating(5)));
    }

    #[test]
    fn reports_lowest_missing_index() {
        let questions = questions();
        let mut collector = ResponseCollector::new();
        assert!(collector.is_empty());
        assert_eq!(
            collector.validate_complete(&questions),
            Err(AnswerError::MissingAnswer(0))
        );

        collector.set_answer(2, AnswerValue::Rating(4));
        assert_eq!(
            collector.validate_complete(&questions),
            Err(AnswerError::MissingAnswer(0))
        );

        collector.set_answer(0, AnswerValue::Text("Databases".into()));
        assert_eq!(
            collector.validate_complete(&questions),
            Err(AnswerError::MissingAnswer(1))
        );

        collector.toggle_option(1, "Blue");
        assert_eq!(collector.validate_complete(&questions), Ok(()));
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let mut collector = ResponseCollector::new();
        collector.set_answer(0, AnswerValue::Text(String::new()));
        assert_eq!(
            collector.validate_complete(&[Question::short_text_example()]),
            Err(AnswerError::MissingAnswer(0))
        );

        collector.set_answer(0, AnswerValue::Text("   ".into()));
        assert_eq!(
            collector.validate_complete(&[Question::short_text_example()]),
            Err(AnswerError::MissingAnswer(0))
        );
    }

    #[test]
    fn submission_covers_every_index_in_order() {
        let mut collector = complete();
        // Stale entry from a question that no longer exists.
        collector.set_answer(9, AnswerValue::Rating(1));

        let submission = collector.to_submission(&questions()).unwrap();
        let indices = submission
            .answers
            .iter()
            .map(|a| a.question_index)
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![0, 1, 2]);

        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({
                "answers": [
                    {"question_index": 0, "answer": "Compilers"},
                    {"question_index": 1, "answer": ["Red"]},
                    {"question_index": 2, "answer": 3},
                ]
            })
        );
    }

    #[test]
    fn submission_rejects_mismatched_shapes() {
        let mut collector = complete();
        collector.set_answer(2, AnswerValue::Text("five".into()));
        assert_eq!(
            collector.to_submission(&questions()),
            Err(AnswerError::MismatchedAnswer(2))
        );

        let mut collector = complete();
        collector.toggle_option(1, "Green");
        assert_eq!(
            collector.to_submission(&questions()),
            Err(AnswerError::MismatchedAnswer(1))
        );
    }

    #[test]
    fn incomplete_submission_fails_before_shape_checks() {
        let mut collector = ResponseCollector::new();
        collector.set_answer(2, AnswerValue::Text("wrong shape".into()));
        assert_eq!(
            collector.to_submission(&questions()),
            Err(AnswerError::MissingAnswer(0))
        );
    }
}
