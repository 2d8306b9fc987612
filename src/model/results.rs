use std::collections::BTreeMap;

use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::model::{id::Id, question::QuestionType, question::MAX_RATING};

/// Aggregated results for a whole survey, as served by
/// `GET /api/surveys/<id>/results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResults {
    pub survey_id: Id,
    pub title: String,
    pub total_responses: u64,
    pub aggregated_results: Vec<QuestionResult>,
}

/// Aggregated results for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question_index: usize,
    pub question_text: String,
    pub question_type: QuestionType,
    pub results: AggregatedResult,
}

/// The summary of every answer to one question.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatedResult {
    /// Votes per option, in the order the payload lists them.
    Choice(Vec<(String, u64)>),
    Rating(RatingSummary),
    Text(TextSummary),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatingSummary {
    pub average: f64,
    /// Number of responses per rating. Ratings nobody gave may be absent.
    pub distribution: BTreeMap<u8, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextSummary {
    /// Number of answers. `None` if the payload did not say.
    pub count: Option<u64>,
    /// Raw answers. Only ever filled in for survey owners.
    pub responses: Vec<String>,
}

impl AggregatedResult {
    /// Read the `results` object of a payload according to the question type.
    ///
    /// Parts of the payload that do not fit the expected shape are dropped, so
    /// a degenerate payload comes out as an empty result rather than an error.
    pub fn from_json(question_type: QuestionType, results: &Value) -> Self {
        let empty = Map::new();
        let fields = results.as_object().unwrap_or(&empty);
        match question_type {
            QuestionType::SingleChoice | QuestionType::MultiChoice => Self::Choice(
                fields
                    .iter()
                    .filter_map(|(label, count)| Some((label.clone(), count.as_u64()?)))
                    .collect(),
            ),
            QuestionType::Rating => {
                // Without an average the distribution cannot be trusted either.
                let Some(average) = fields
                    .get("average")
                    .and_then(Value::as_f64)
                    .filter(|average| average.is_finite())
                else {
                    return Self::Rating(RatingSummary::default());
                };
                Self::Rating(RatingSummary {
                    average,
                    distribution: fields
                        .get("distribution")
                        .and_then(Value::as_object)
                        .map(|distribution| {
                            distribution
                                .iter()
                                .filter_map(|(rating, count)| {
                                    Some((parse_rating(rating)?, count.as_u64()?))
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                })
            }
            QuestionType::ShortText | QuestionType::LongText => Self::Text(TextSummary {
                count: fields.get("count").and_then(Value::as_u64),
                responses: fields
                    .get("responses")
                    .and_then(Value::as_array)
                    .map(|responses| {
                        responses
                            .iter()
                            .filter_map(|r| r.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default(),
            }),
        }
    }
}

/// Distribution keys are ratings rendered as strings, possibly as whole
/// floats ("3.0") when produced by a loosely-typed backend.
fn parse_rating(key: &str) -> Option<u8> {
    let rating = key.parse::<u8>().ok().or_else(|| {
        let float = key.parse::<f64>().ok()?;
        (float.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&float))
            .then_some(float as u8)
    })?;
    (1..=MAX_RATING).contains(&rating).then_some(rating)
}

impl Serialize for AggregatedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Choice(counts) => {
                let mut map = serializer.serialize_map(Some(counts.len()))?;
                for (label, count) in counts {
                    map.serialize_entry(label, count)?;
                }
                map.end()
            }
            Self::Rating(summary) => {
                let distribution = summary
                    .distribution
                    .iter()
                    .map(|(rating, count)| (rating.to_string(), *count))
                    .collect::<BTreeMap<_, _>>();
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("average", &summary.average)?;
                map.serialize_entry("distribution", &distribution)?;
                map.end()
            }
            Self::Text(summary) => {
                let mut map = serializer.serialize_map(None)?;
                if let Some(count) = summary.count {
                    map.serialize_entry("count", &count)?;
                }
                if !summary.responses.is_empty() {
                    map.serialize_entry("responses", &summary.responses)?;
                }
                map.end()
            }
        }
    }
}

/// The untyped form of a [`QuestionResult`]: `results` is interpreted once
/// the question type is known.
#[derive(Deserialize)]
struct RawQuestionResult {
    question_index: usize,
    question_text: String,
    question_type: QuestionType,
    #[serde(default)]
    results: Value,
}

impl<'de> Deserialize<'de> for QuestionResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawQuestionResult::deserialize(deserializer)?;
        Ok(Self {
            question_index: raw.question_index,
            question_text: raw.question_text,
            question_type: raw.question_type,
            results: AggregatedResult::from_json(raw.question_type, &raw.results),
        })
    }
}
