use rocket::{
    serde::json::{json, Json, Value},
    Route,
};

use crate::{
    error::{Error, Result},
    model::{
        auth::{AnyUser, AuthToken, Owner},
        id::Id,
        store::Store,
        survey::{Survey, SurveyDetail, SurveySpec, SurveySummary},
    },
};

pub fn routes() -> Vec<Route> {
    routes![create_survey, get_surveys, get_survey, delete_survey]
}

#[post("/api/surveys", data = "<spec>", format = "json")]
async fn create_survey(
    token: AuthToken<Owner>,
    spec: Json<SurveySpec>,
    store: Store,
) -> Result<Json<Survey>> {
    spec.validate()?;
    let survey = Survey::new(spec.0, token.id().clone());
    info!(
        "{} published survey {} with {} questions",
        token.id(),
        survey.id,
        survey.questions.len()
    );
    store.insert_survey(survey.clone()).await;
    Ok(Json(survey))
}

#[get("/api/surveys")]
async fn get_surveys(token: AuthToken<AnyUser>, store: Store) -> Json<Vec<SurveySummary>> {
    let mut summaries = Vec::new();
    for survey in store.surveys().await {
        let has_answered = store.has_answered(survey.id, token.id()).await;
        summaries.push(survey.summary(has_answered));
    }
    Json(summaries)
}

#[get("/api/surveys/<survey_id>")]
async fn get_survey(
    token: AuthToken<AnyUser>,
    survey_id: Id,
    store: Store,
) -> Result<Json<SurveyDetail>> {
    let survey = store
        .survey(survey_id)
        .await
        .ok_or_else(|| Error::not_found("Survey"))?;
    let has_answered = store.has_answered(survey_id, token.id()).await;
    Ok(Json(survey.detail(has_answered)))
}

/// Delete a survey and every response to it.
#[delete("/api/surveys/<survey_id>")]
async fn delete_survey(
    token: AuthToken<Owner>,
    survey_id: Id,
    store: Store,
) -> Result<Json<Value>> {
    let survey = store.remove_survey(survey_id).await?;
    info!(
        "{} deleted survey {survey_id} along with {} responses",
        token.id(),
        survey.response_count
    );
    Ok(Json(json!({ "message": "Survey deleted successfully" })))
}
