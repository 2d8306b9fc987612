use rocket::{
    serde::json::{json, Json, Value},
    Route,
};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    logging::RequestId,
    model::{
        answer::{check_submission, RawAnswer},
        auth::{AnyUser, AuthToken, Owner},
        id::Id,
        store::{Store, StoreError},
        survey::{MyResponse, StoredResponse},
    },
};

pub fn routes() -> Vec<Route> {
    routes![submit_response, get_responses, get_my_responses]
}

/// The body of a response submission, before its answers are checked.
#[derive(Debug, Deserialize)]
struct ResponseBody {
    answers: Vec<RawAnswer>,
}

#[post("/api/surveys/<survey_id>/respond", data = "<body>", format = "json")]
async fn submit_response(
    token: AuthToken<AnyUser>,
    survey_id: Id,
    body: Json<ResponseBody>,
    store: Store,
    request_id: &RequestId,
) -> Result<Json<Value>> {
    let survey = store
        .survey(survey_id)
        .await
        .ok_or_else(|| Error::not_found("Survey"))?;
    if survey.is_closed() {
        return Err(StoreError::Closed.into());
    }
    if store.has_answered(survey_id, token.id()).await {
        return Err(StoreError::AlreadyAnswered.into());
    }

    let answers = check_submission(&survey.questions, body.0.answers)?;
    let response = StoredResponse::new(
        survey_id,
        token.id().clone(),
        token.name().to_string(),
        answers,
    );
    store.insert_response(response).await?;
    info!("req{request_id}: {} answered survey {survey_id}", token.id());

    Ok(Json(json!({ "message": "Response submitted successfully" })))
}

#[get("/api/surveys/<survey_id>/responses")]
async fn get_responses(
    _token: AuthToken<Owner>,
    survey_id: Id,
    store: Store,
) -> Result<Json<Vec<StoredResponse>>> {
    if store.survey(survey_id).await.is_none() {
        return Err(Error::not_found("Survey"));
    }
    Ok(Json(store.responses_for(survey_id).await))
}

#[get("/api/my-responses")]
async fn get_my_responses(token: AuthToken<AnyUser>, store: Store) -> Json<Vec<MyResponse>> {
    Json(store.responses_by(token.id()).await)
}
