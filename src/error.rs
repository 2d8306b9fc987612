use rocket::{
    http::Status,
    response::Responder,
    serde::json::{json, Json},
    Request,
};
use thiserror::Error;

use crate::model::{
    answer::AnswerError,
    store::StoreError,
    survey::SurveyError,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Survey(#[from] SurveyError),
    #[error(transparent)]
    Answers(#[from] AnswerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", what.into()))
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Survey(_) | Self::Answers(_) => Status::BadRequest,
            Self::Store(StoreError::UnknownSurvey) => Status::NotFound,
            Self::Store(StoreError::AlreadyAnswered | StoreError::Closed) => Status::BadRequest,
            Self::Status(status, _) => *status,
        }
    }
}

/// Errors are sent back as `{"detail": "..."}` with the matching status.
impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {}: {self}", req.method(), req.uri());
        } else {
            debug!("{} {}: {self}", req.method(), req.uri());
        }
        (status, Json(json!({ "detail": self.to_string() }))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_failure() {
        assert_eq!(Error::not_found("Survey").status(), Status::NotFound);
        assert_eq!(Error::not_found("Survey").to_string(), "Survey not found");
        assert_eq!(
            Error::from(StoreError::AlreadyAnswered).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::from(StoreError::UnknownSurvey).status(),
            Status::NotFound
        );
        assert_eq!(
            Error::from(AnswerError::MissingAnswer(2)).to_string(),
            "please answer question 3"
        );
        assert_eq!(
            Error::Status(Status::Forbidden, "nope".to_string()).status(),
            Status::Forbidden
        );
    }
}
