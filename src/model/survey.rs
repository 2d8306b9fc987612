use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    answer::Answer,
    auth::UserId,
    id::Id,
    question::{Question, QuestionError},
};

/// A survey as submitted by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    /// Responses are no longer accepted after this moment.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl SurveySpec {
    /// Check that this survey may be published.
    pub fn validate(&self) -> Result<(), SurveyError> {
        if self.title.trim().is_empty() {
            return Err(SurveyError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }
        for (index, question) in self.questions.iter().enumerate() {
            question
                .validate()
                .map_err(|source| SurveyError::Question { index, source })?;
        }
        Ok(())
    }
}

/// Check that a survey draft may be published. Questions are checked in order
/// and the first failure is reported.
pub fn validate_survey(spec: &SurveySpec) -> Result<(), SurveyError> {
    spec.validate()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("survey title is required")]
    EmptyTitle,
    #[error("survey must have at least one question")]
    NoQuestions,
    #[error("question {}: {source}", .index + 1)]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// A published survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub response_count: u64,
}

impl Survey {
    /// Publish a validated spec on behalf of `author`.
    pub fn new(spec: SurveySpec, author: UserId) -> Self {
        Self {
            id: Id::new(),
            title: spec.title,
            description: spec.description,
            questions: spec.questions,
            created_by: author,
            created_at: Utc::now(),
            end_date: spec.end_date,
            response_count: 0,
        }
    }

    /// Whether the survey had stopped taking responses at `at`.
    pub fn is_closed_at(&self, at: DateTime<Utc>) -> bool {
        self.end_date.map_or(false, |end_date| at >= end_date)
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed_at(Utc::now())
    }

    pub fn summary(&self, has_answered: bool) -> SurveySummary {
        SurveySummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            end_date: self.end_date,
            is_closed: self.is_closed(),
            response_count: self.response_count,
            has_answered,
        }
    }

    pub fn detail(self, has_answered: bool) -> SurveyDetail {
        SurveyDetail {
            is_closed: self.is_closed(),
            survey: self,
            has_answered,
        }
    }
}

/// A survey list entry, as seen by a particular user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_closed: bool,
    pub response_count: u64,
    pub has_answered: bool,
}

/// A full survey, as seen by a particular user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub is_closed: bool,
    pub has_answered: bool,
}

/// One user's submitted answers to one survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredResponse {
    pub id: Id,
    pub survey_id: Id,
    pub user_id: UserId,
    pub user_name: String,
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
}

impl StoredResponse {
    pub fn new(survey_id: Id, user_id: UserId, user_name: String, answers: Vec<Answer>) -> Self {
        Self {
            id: Id::new(),
            survey_id,
            user_id,
            user_name,
            answers,
            submitted_at: Utc::now(),
        }
    }
}

/// A reference to a survey the requesting user has answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyResponse {
    pub survey_id: Id,
    pub survey_title: String,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod examples {
    use super::*;

    impl SurveySpec {
        pub fn example() -> Self {
            Self {
                title: "Campus life".to_string(),
                description: "Tell us how the term went.".to_string(),
                questions: vec![
                    Question::single_example(),
                    Question::multi_example(),
                    Question::short_text_example(),
                    Question::rating_example(),
                ],
                end_date: None,
            }
        }
    }
}
