use std::sync::Arc;

use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
    tokio::sync::RwLock,
    State,
};
use thiserror::Error;

use crate::model::{
    auth::UserId,
    id::Id,
    survey::{MyResponse, StoredResponse, Survey},
};

/// In-memory storage for surveys and their responses.
///
/// Cloning gives another handle on the same storage.
#[derive(Clone, Default)]
pub struct Store(Arc<RwLock<Inner>>);

#[derive(Default)]
struct Inner {
    /// In order of publication.
    surveys: Vec<Survey>,
    /// In order of submission.
    responses: Vec<StoredResponse>,
}

impl Inner {
    fn survey_mut(&mut self, id: Id) -> Option<&mut Survey> {
        self.surveys.iter_mut().find(|survey| survey.id == id)
    }

    fn has_answered(&self, survey_id: Id, user_id: &UserId) -> bool {
        self.responses
            .iter()
            .any(|r| r.survey_id == survey_id && &r.user_id == user_id)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Survey not found")]
    UnknownSurvey,
    #[error("You have already answered this survey")]
    AlreadyAnswered,
    #[error("This survey is closed")]
    Closed,
}

impl Store {
    pub async fn insert_survey(&self, survey: Survey) {
        self.0.write().await.surveys.push(survey);
    }

    /// All surveys, newest first.
    pub async fn surveys(&self) -> Vec<Survey> {
        self.0.read().await.surveys.iter().rev().cloned().collect()
    }

    pub async fn survey(&self, id: Id) -> Option<Survey> {
        let inner = self.0.read().await;
        inner.surveys.iter().find(|survey| survey.id == id).cloned()
    }

    /// Has `user_id` already responded to the given survey?
    pub async fn has_answered(&self, survey_id: Id, user_id: &UserId) -> bool {
        self.0.read().await.has_answered(survey_id, user_id)
    }

    /// Delete a survey along with every response to it.
    pub async fn remove_survey(&self, id: Id) -> Result<Survey, StoreError> {
        let mut inner = self.0.write().await;
        let index = inner
            .surveys
            .iter()
            .position(|survey| survey.id == id)
            .ok_or(StoreError::UnknownSurvey)?;
        let survey = inner.surveys.remove(index);
        inner.responses.retain(|r| r.survey_id != id);
        Ok(survey)
    }

    /// Record a response and bump the survey's response count, unless the
    /// user has already responded or the survey had closed when it was
    /// submitted.
    pub async fn insert_response(&self, response: StoredResponse) -> Result<(), StoreError> {
        let mut inner = self.0.write().await;
        if inner.has_answered(response.survey_id, &response.user_id) {
            return Err(StoreError::AlreadyAnswered);
        }
        let survey = inner
            .survey_mut(response.survey_id)
            .ok_or(StoreError::UnknownSurvey)?;
        if survey.is_closed_at(response.submitted_at) {
            return Err(StoreError::Closed);
        }
        survey.response_count += 1;
        inner.responses.push(response);
        Ok(())
    }

    /// Every response to the given survey, newest first.
    pub async fn responses_for(&self, survey_id: Id) -> Vec<StoredResponse> {
        let inner = self.0.read().await;
        inner
            .responses
            .iter()
            .rev()
            .filter(|r| r.survey_id == survey_id)
            .cloned()
            .collect()
    }

    /// The surveys `user_id` has responded to, in the order they answered them.
    pub async fn responses_by(&self, user_id: &UserId) -> Vec<MyResponse> {
        let inner = self.0.read().await;
        inner
            .responses
            .iter()
            .filter(|r| &r.user_id == user_id)
            .filter_map(|r| {
                let survey = inner.surveys.iter().find(|s| s.id == r.survey_id)?;
                Some(MyResponse {
                    survey_id: r.survey_id,
                    survey_title: survey.title.clone(),
                    submitted_at: r.submitted_at,
                })
            })
            .collect()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Store {
    type Error = ();

    /// Get a handle on the managed store.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.guard::<&State<Store>>().await {
            request::Outcome::Success(store) => request::Outcome::Success(store.inner().clone()),
            _ => {
                error!("Survey store is not managed");
                request::Outcome::Failure((Status::InternalServerError, ()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::model::survey::SurveySpec;

    use super::*;

    fn survey(title: &str) -> Survey {
        let mut spec = SurveySpec::example();
        spec.title = title.to_string();
        Survey::new(spec, UserId::from("owner"))
    }

    fn response(survey: &Survey, user: &str) -> StoredResponse {
        StoredResponse::new(survey.id, UserId::from(user), user.to_string(), vec![])
    }

    #[rocket::async_test]
    async fn surveys_are_listed_newest_first() {
        let store = Store::default();
        let first = survey("First");
        let second = survey("Second");
        store.insert_survey(first.clone()).await;
        store.insert_survey(second.clone()).await;

        let titles = store
            .surveys()
            .await
            .into_iter()
            .map(|s| s.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(store.survey(first.id).await, Some(first));
        assert_eq!(store.survey(Id::new()).await, None);
    }

    #[rocket::async_test]
    async fn one_response_per_user() {
        let store = Store::default();
        let survey = survey("Poll");
        store.insert_survey(survey.clone()).await;

        let alice = UserId::from("alice");
        assert!(!store.has_answered(survey.id, &alice).await);
        store.insert_response(response(&survey, "alice")).await.unwrap();
        assert!(store.has_answered(survey.id, &alice).await);

        assert_eq!(
            store.insert_response(response(&survey, "alice")).await,
            Err(StoreError::AlreadyAnswered)
        );
        store.insert_response(response(&survey, "bob")).await.unwrap();

        let stored = store.survey(survey.id).await.unwrap();
        assert_eq!(stored.response_count, 2);

        let users = store
            .responses_for(survey.id)
            .await
            .into_iter()
            .map(|r| r.user_name)
            .collect::<Vec<_>>();
        assert_eq!(users, vec!["bob", "alice"]);
    }

    #[rocket::async_test]
    async fn responses_need_a_survey() {
        let store = Store::default();
        let missing = survey("Never published");
        assert_eq!(
            store.insert_response(response(&missing, "alice")).await,
            Err(StoreError::UnknownSurvey)
        );
    }

    #[rocket::async_test]
    async fn responses_by_user_carry_titles() {
        let store = Store::default();
        let poll = survey("Poll");
        let other = survey("Other");
        store.insert_survey(poll.clone()).await;
        store.insert_survey(other.clone()).await;
        store.insert_response(response(&poll, "alice")).await.unwrap();
        store.insert_response(response(&other, "bob")).await.unwrap();

        let mine = store.responses_by(&UserId::from("alice")).await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].survey_id, poll.id);
        assert_eq!(mine[0].survey_title, "Poll");
    }

    #[rocket::async_test]
    async fn closed_surveys_refuse_responses() {
        let store = Store::default();
        let mut spec = SurveySpec::example();
        spec.end_date = Some(Utc::now() - Duration::hours(1));
        let closed = Survey::new(spec, UserId::from("owner"));
        store.insert_survey(closed.clone()).await;

        assert_eq!(
            store.insert_response(response(&closed, "alice")).await,
            Err(StoreError::Closed)
        );
        assert_eq!(store.survey(closed.id).await.unwrap().response_count, 0);
        assert!(store.responses_for(closed.id).await.is_empty());
    }

    #[rocket::async_test]
    async fn removing_a_survey_drops_its_responses() {
        let store = Store::default();
        let poll = survey("Poll");
        let other = survey("Other");
        store.insert_survey(poll.clone()).await;
        store.insert_survey(other.clone()).await;
        store.insert_response(response(&poll, "alice")).await.unwrap();
        store.insert_response(response(&other, "alice")).await.unwrap();

        assert_eq!(store.remove_survey(poll.id).await, Ok(poll.clone()));
        assert_eq!(store.survey(poll.id).await, None);
        assert!(store.responses_for(poll.id).await.is_empty());
        assert!(!store.has_answered(poll.id, &UserId::from("alice")).await);
        assert_eq!(store.responses_for(other.id).await.len(), 1);

        assert_eq!(
            store.remove_survey(poll.id).await,
            Err(StoreError::UnknownSurvey)
        );
    }
}
