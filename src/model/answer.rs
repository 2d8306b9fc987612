use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::question::{Question, MAX_RATING};

/// The value a respondent gave for one question.
///
/// Serializes to the bare JSON value the survey API expects: a string for
/// single choices and text, an array of strings for multiple choices, and an
/// integer for ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// The selected option of a single-choice question.
    Choice(String),
    /// The selected options of a multi-choice question.
    Choices(BTreeSet<String>),
    /// Free text.
    Text(String),
    /// A rating from 1 to [`MAX_RATING`].
    Rating(u8),
}

impl AnswerValue {
    /// Does this value count as "not answered"?
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Choice(s) | Self::Text(s) => s.trim().is_empty(),
            Self::Choices(set) => set.is_empty(),
            Self::Rating(_) => false,
        }
    }

    /// Interpret a loosely-typed JSON answer according to the question it answers.
    ///
    /// Returns `None` if the JSON has the wrong shape for that question.
    pub fn from_json(question: &Question, value: &Value) -> Option<Self> {
        match question {
            Question::SingleChoice { .. } => value.as_str().map(|s| Self::Choice(s.to_string())),
            Question::MultiChoice { .. } => value
                .as_array()?
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<BTreeSet<_>>>()
                .map(Self::Choices),
            Question::ShortText { .. } | Question::LongText { .. } => {
                value.as_str().map(|s| Self::Text(s.to_string()))
            }
            Question::Rating { .. } => value
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .filter(|n| (1..=MAX_RATING).contains(n))
                .map(Self::Rating),
        }
    }
}

impl Question {
    /// Can `value` be submitted as an answer to this question?
    ///
    /// Blank values are accepted here; completeness is checked separately.
    pub fn accepts(&self, value: &AnswerValue) -> bool {
        match (self, value) {
            (Question::SingleChoice { options, .. }, AnswerValue::Choice(choice)) => {
                choice.trim().is_empty() || options.contains(choice)
            }
            (Question::MultiChoice { options, .. }, AnswerValue::Choices(choices)) => {
                choices.iter().all(|c| options.contains(c))
            }
            (Question::ShortText { .. } | Question::LongText { .. }, AnswerValue::Text(_)) => true,
            (Question::Rating { .. }, AnswerValue::Rating(n)) => (1..=MAX_RATING).contains(n),
            _ => false,
        }
    }
}

/// One entry of a submission, ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub question_index: usize,
    pub answer: AnswerValue,
}

/// One entry of a submission as received, before it has been checked
/// against the survey's questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnswer {
    pub question_index: usize,
    pub answer: Value,
}

/// Reasons a set of answers cannot be submitted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    /// The question at this (0-based) index has no usable answer.
    #[error("please answer question {}", .0 + 1)]
    MissingAnswer(usize),
    /// The answer at this index does not fit its question.
    #[error("the answer to question {} does not fit the question", .0 + 1)]
    MismatchedAnswer(usize),
    /// More than one answer was given for this index.
    #[error("question {} was answered more than once", .0 + 1)]
    DuplicateAnswer(usize),
    /// The answer refers to a question that does not exist.
    #[error("there is no question {}", .0 + 1)]
    UnknownQuestion(usize),
}

/// Find the first question, in ascending index order, without a usable answer.
pub(crate) fn first_missing(
    question_count: usize,
    answers: &BTreeMap<usize, AnswerValue>,
) -> Option<usize> {
    (0..question_count).find(|i| answers.get(i).map_or(true, AnswerValue::is_blank))
}

/// Check a received submission against the survey's questions and turn it
/// into typed answers, ordered by question index.
pub fn check_submission(
    questions: &[Question],
    raw_answers: Vec<RawAnswer>,
) -> Result<Vec<Answer>, AnswerError> {
    let mut answers = BTreeMap::new();
    for raw in raw_answers {
        let index = raw.question_index;
        let question = questions
            .get(index)
            .ok_or(AnswerError::UnknownQuestion(index))?;
        if answers.contains_key(&index) {
            return Err(AnswerError::DuplicateAnswer(index));
        }
        let value = AnswerValue::from_json(question, &raw.answer)
            .filter(|value| question.accepts(value))
            .ok_or(AnswerError::MismatchedAnswer(index))?;
        answers.insert(index, value);
    }

    if let Some(index) = first_missing(questions.len(), &answers) {
        return Err(AnswerError::MissingAnswer(index));
    }

    Ok(answers
        .into_iter()
        .map(|(question_index, answer)| Answer {
            question_index,
            answer,
        })
        .collect())
}
