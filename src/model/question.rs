use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ratings always run from 1 up to and including this value.
pub const MAX_RATING: u8 = 5;

/// The wire tag for each kind of question.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Pick exactly one option.
    #[serde(rename = "multiple_choice_single")]
    SingleChoice,
    /// Pick one or more options.
    #[serde(rename = "multiple_choice_multiple")]
    MultiChoice,
    #[serde(rename = "text_short")]
    ShortText,
    #[serde(rename = "text_long")]
    LongText,
    /// A star rating from 1 to [`MAX_RATING`].
    #[serde(rename = "rating")]
    Rating,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "multiple_choice_single",
            Self::MultiChoice => "multiple_choice_multiple",
            Self::ShortText => "text_short",
            Self::LongText => "text_long",
            Self::Rating => "rating",
        }
    }

    /// Does this kind of question come with a list of options?
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single question within a survey.
///
/// The variant fixes which fields exist: only choice questions carry options,
/// and rating questions are always out of [`MAX_RATING`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionSpec", into = "QuestionSpec")]
pub enum Question {
    SingleChoice { text: String, options: Vec<String> },
    MultiChoice { text: String, options: Vec<String> },
    ShortText { text: String },
    LongText { text: String },
    Rating { text: String },
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::SingleChoice { .. } => QuestionType::SingleChoice,
            Self::MultiChoice { .. } => QuestionType::MultiChoice,
            Self::ShortText { .. } => QuestionType::ShortText,
            Self::LongText { .. } => QuestionType::LongText,
            Self::Rating { .. } => QuestionType::Rating,
        }
    }

    /// The prompt shown to respondents.
    pub fn text(&self) -> &str {
        match self {
            Self::SingleChoice { text, .. }
            | Self::MultiChoice { text, .. }
            | Self::ShortText { text }
            | Self::LongText { text }
            | Self::Rating { text } => text,
        }
    }

    /// The declared options, in authoring order, for choice questions.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::SingleChoice { options, .. } | Self::MultiChoice { options, .. } => {
                Some(options)
            }
            Self::ShortText { .. } | Self::LongText { .. } | Self::Rating { .. } => None,
        }
    }

    /// Check that this question may be added to a survey.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.text().trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if let Some(options) = self.options() {
            let filled = options.iter().filter(|o| !o.trim().is_empty()).count();
            if filled < 2 {
                return Err(QuestionError::InsufficientOptions);
            }
        }
        Ok(())
    }
}

/// Check that a candidate question may be added to a survey draft.
pub fn validate_question(question: &Question) -> Result<(), QuestionError> {
    question.validate()
}

/// Reasons a question cannot be added to a survey.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question text is required")]
    EmptyText,
    #[error("question must have at least 2 filled-in options")]
    InsufficientOptions,
}

/// Reasons a question's wire form cannot be turned into a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedQuestion {
    #[error("'{0}' questions cannot have options")]
    UnexpectedOptions(QuestionType),
    #[error("rating questions must have a maximum rating of {MAX_RATING}, not {0}")]
    UnsupportedMaxRating(u8),
}

/// The loosely-typed wire form of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<u8>,
}

impl TryFrom<QuestionSpec> for Question {
    type Error = MalformedQuestion;

    fn try_from(spec: QuestionSpec) -> Result<Self, Self::Error> {
        let QuestionSpec {
            question_type,
            text,
            options,
            max_rating,
        } = spec;

        if !question_type.is_choice() && options.is_some() {
            return Err(MalformedQuestion::UnexpectedOptions(question_type));
        }
        // Older payloads attach a default `max_rating` to every question, so it
        // is only checked where it means something.
        if question_type == QuestionType::Rating {
            if let Some(max) = max_rating.filter(|max| *max != MAX_RATING) {
                return Err(MalformedQuestion::UnsupportedMaxRating(max));
            }
        }

        // Missing options surface later as `InsufficientOptions`.
        let options = options.unwrap_or_default();
        Ok(match question_type {
            QuestionType::SingleChoice => Self::SingleChoice { text, options },
            QuestionType::MultiChoice => Self::MultiChoice { text, options },
            QuestionType::ShortText => Self::ShortText { text },
            QuestionType::LongText => Self::LongText { text },
            QuestionType::Rating => Self::Rating { text },
        })
    }
}

impl From<Question> for QuestionSpec {
    fn from(question: Question) -> Self {
        let question_type = question.question_type();
        let (text, options) = match question {
            Question::SingleChoice { text, options } | Question::MultiChoice { text, options } => {
                (text, Some(options))
            }
            Question::ShortText { text } | Question::LongText { text } | Question::Rating { text } => {
                (text, None)
            }
        };
        let max_rating = (question_type == QuestionType::Rating).then_some(MAX_RATING);
        Self {
            question_type,
            text,
            options,
            max_rating,
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn choice(options: &[&str]) -> Question {
        Question::SingleChoice {
            text: "Pick one".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn choice_questions_need_two_filled_options() {
        assert_eq!(
            validate_question(&choice(&[])),
            Err(QuestionError::InsufficientOptions)
        );
        assert_eq!(
            validate_question(&choice(&["Only"])),
            Err(QuestionError::InsufficientOptions)
        );
        assert_eq!(
            validate_question(&choice(&["Yes", "   ", ""])),
            Err(QuestionError::InsufficientOptions)
        );
        assert_eq!(validate_question(&choice(&["Yes", "No"])), Ok(()));
        assert_eq!(validate_question(&choice(&["Yes", " ", "No"])), Ok(()));

        let multi = Question::MultiChoice {
            text: "Pick some".to_string(),
            options: vec!["\t".to_string(), "A".to_string()],
        };
        assert_eq!(multi.validate(), Err(QuestionError::InsufficientOptions));
    }

    #[test]
    fn duplicate_options_are_accepted() {
        assert_eq!(validate_question(&choice(&["Same", "Same"])), Ok(()));
    }

    #[test]
    fn text_is_required_for_every_type() {
        let blank = Question::Rating {
            text: "  \n".to_string(),
        };
        assert_eq!(blank.validate(), Err(QuestionError::EmptyText));

        let blank_choice = Question::SingleChoice {
            text: String::new(),
            options: vec![],
        };
        // Text is checked before options.
        assert_eq!(blank_choice.validate(), Err(QuestionError::EmptyText));

        assert_eq!(Question::rating_example().validate(), Ok(()));
        assert_eq!(Question::short_text_example().validate(), Ok(()));
        assert_eq!(Question::long_text_example().validate(), Ok(()));
    }

    #[test]
    fn wire_form_uses_fixed_tags() {
        let json = serde_json::to_value(Question::multi_example()).unwrap();
        assert_eq!(
            json,
            json!({"type": "multiple_choice_multiple", "text": "Pick colors", "options": ["Red", "Blue"]})
        );

        let json = serde_json::to_value(Question::rating_example()).unwrap();
        assert_eq!(
            json,
            json!({"type": "rating", "text": "How would you rate the canteen?", "max_rating": 5})
        );

        let json = serde_json::to_value(Question::short_text_example()).unwrap();
        assert_eq!(json["type"], "text_short");
        assert!(json.get("options").is_none());
        assert!(json.get("max_rating").is_none());

        for question in [
            Question::single_example(),
            Question::multi_example(),
            Question::short_text_example(),
            Question::long_text_example(),
            Question::rating_example(),
        ] {
            let json = serde_json::to_string(&question).unwrap();
            assert_eq!(serde_json::from_str::<Question>(&json).unwrap(), question);
        }
    }

    #[test]
    fn parses_legacy_payloads() {
        // Every question used to be stored with a default max rating and null options.
        let question: Question = serde_json::from_value(json!({
            "type": "text_long",
            "text": "Tell us more",
            "options": null,
            "max_rating": 5,
        }))
        .unwrap();
        assert_eq!(
            question,
            Question::LongText {
                text: "Tell us more".to_string()
            }
        );

        let question: Question = serde_json::from_value(json!({
            "type": "multiple_choice_single",
            "text": "Missing options",
        }))
        .unwrap();
        assert_eq!(question.options(), Some(&[][..]));
        assert_eq!(question.validate(), Err(QuestionError::InsufficientOptions));
    }

    #[test]
    fn rejects_shape_violations() {
        let result = serde_json::from_value::<Question>(json!({
            "type": "rating",
            "text": "Out of ten",
            "max_rating": 10,
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<Question>(json!({
            "type": "text_short",
            "text": "Has options",
            "options": ["a", "b"],
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<Question>(json!({
            "type": "dropdown",
            "text": "Unknown type",
        }));
        assert!(result.is_err());
    }
}
