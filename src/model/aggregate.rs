use std::collections::BTreeMap;

use crate::model::{
    answer::AnswerValue,
    question::Question,
    results::{AggregatedResult, QuestionResult, RatingSummary, SurveyResults, TextSummary},
    survey::{StoredResponse, Survey},
};

/// Summarise every stored response to `survey`.
///
/// Raw text answers are only included if `reveal_text` is set.
pub fn aggregate<'a>(
    survey: &Survey,
    responses: impl IntoIterator<Item = &'a StoredResponse>,
    reveal_text: bool,
) -> SurveyResults {
    let mut tallies = survey
        .questions
        .iter()
        .map(Tally::for_question)
        .collect::<Vec<_>>();

    let mut total_responses = 0;
    for response in responses {
        total_responses += 1;
        for answer in &response.answers {
            if let Some(tally) = tallies.get_mut(answer.question_index) {
                tally.add(&answer.answer);
            }
        }
    }

    let aggregated_results = survey
        .questions
        .iter()
        .zip(tallies)
        .enumerate()
        .map(|(question_index, (question, tally))| QuestionResult {
            question_index,
            question_text: question.text().to_string(),
            question_type: question.question_type(),
            results: tally.finish(reveal_text),
        })
        .collect();

    SurveyResults {
        survey_id: survey.id,
        title: survey.title.clone(),
        total_responses,
        aggregated_results,
    }
}

/// Running totals for one question.
enum Tally {
    Choice(Vec<(String, u64)>),
    Rating(BTreeMap<u8, u64>),
    Text(Vec<String>),
}

impl Tally {
    fn for_question(question: &Question) -> Self {
        match question {
            Question::SingleChoice { options, .. } | Question::MultiChoice { options, .. } => {
                let mut counts: Vec<(String, u64)> = Vec::with_capacity(options.len());
                for option in options {
                    if !option.trim().is_empty()
                        && !counts.iter().any(|(label, _)| label == option)
                    {
                        counts.push((option.clone(), 0));
                    }
                }
                Self::Choice(counts)
            }
            Question::Rating { .. } => Self::Rating(BTreeMap::new()),
            Question::ShortText { .. } | Question::LongText { .. } => Self::Text(Vec::new()),
        }
    }

    fn add(&mut self, value: &AnswerValue) {
        match (self, value) {
            (Self::Choice(counts), AnswerValue::Choice(option)) => vote(counts, option),
            (Self::Choice(counts), AnswerValue::Choices(options)) => {
                for option in options {
                    vote(counts, option);
                }
            }
            (Self::Rating(distribution), AnswerValue::Rating(rating)) => {
                *distribution.entry(*rating).or_default() += 1;
            }
            (Self::Text(responses), AnswerValue::Text(text)) => responses.push(text.clone()),
            // Answers of the wrong shape do not contribute.
            _ => {}
        }
    }

    fn finish(self, reveal_text: bool) -> AggregatedResult {
        match self {
            Self::Choice(counts) => AggregatedResult::Choice(counts),
            Self::Rating(distribution) => {
                let count: u64 = distribution.values().sum();
                let sum: u64 = distribution
                    .iter()
                    .map(|(rating, n)| u64::from(*rating) * n)
                    .sum();
                let average = if count == 0 {
                    0.0
                } else {
                    sum as f64 / count as f64
                };
                AggregatedResult::Rating(RatingSummary {
                    average,
                    distribution,
                })
            }
            Self::Text(responses) => AggregatedResult::Text(TextSummary {
                count: Some(responses.len() as u64),
                responses: if reveal_text { responses } else { Vec::new() },
            }),
        }
    }
}

/// Count a vote for `option`, ignoring options the question never declared.
fn vote(counts: &mut [(String, u64)], option: &str) {
    if let Some((_, count)) = counts.iter_mut().find(|(label, _)| label == option) {
        *count += 1;
    }
}
