//! A typed client for the survey API.

use reqwest::{header::AUTHORIZATION, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    answer::AnswerError,
    collector::ResponseCollector,
    id::Id,
    question::Question,
    results::SurveyResults,
    survey::SurveyDetail,
};

/// Shown when the backend gives no reason of its own.
pub const FALLBACK_DETAIL: &str = "Request failed";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The answers were rejected locally and never sent.
    #[error(transparent)]
    Answers(#[from] AnswerError),
    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend refused the request.
    #[error("{detail}")]
    Backend { status: u16, detail: String },
}

/// Build the error for a failed response from its status and body, using the
/// backend's `detail` if it sent one.
pub fn backend_error(status: u16, body: &str) -> ClientError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("detail")?.as_str().map(str::to_string))
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_DETAIL.to_string());
    ClientError::Backend { status, detail }
}

pub struct SurveyClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SurveyClient {
    /// A client for the server at `base_url`, authenticating with the bearer
    /// `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// Fetch a survey and its questions.
    pub async fn survey(&self, survey_id: Id) -> Result<SurveyDetail, ClientError> {
        let request = self.http.get(self.url(&format!("/surveys/{survey_id}")));
        let response = self.authorized(request).send().await?;
        parse(response).await
    }

    /// Submit the collected answers. Incomplete or ill-fitting answers are
    /// rejected without contacting the server, and the collector is left
    /// untouched either way.
    pub async fn submit(
        &self,
        survey_id: Id,
        collector: &ResponseCollector,
        questions: &[Question],
    ) -> Result<(), ClientError> {
        let submission = collector.to_submission(questions)?;
        let request = self
            .http
            .post(self.url(&format!("/surveys/{survey_id}/respond")))
            .json(&submission);
        let response = self.authorized(request).send().await?;
        parse::<Value>(response).await.map(|_| ())
    }

    /// Fetch the aggregated results of a survey. Malformed parts of the
    /// payload are defaulted rather than rejected.
    pub async fn results(&self, survey_id: Id) -> Result<SurveyResults, ClientError> {
        let request = self.http.get(self.url(&format!("/surveys/{survey_id}/results")));
        let response = self.authorized(request).send().await?;
        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        debug!("Request failed with {status}: {body}");
        Err(backend_error(status.as_u16(), &body))
    }
}
