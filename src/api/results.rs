use rocket::{http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        aggregate::aggregate,
        auth::{AnyUser, AuthToken},
        id::Id,
        results::SurveyResults,
        store::Store,
    },
};

pub fn routes() -> Vec<Route> {
    routes![get_results]
}

/// Results are recomputed on every request. Until the survey closes, only
/// owners and users who have answered it themselves may see them.
#[get("/api/surveys/<survey_id>/results")]
async fn get_results(
    token: AuthToken<AnyUser>,
    survey_id: Id,
    store: Store,
) -> Result<Json<SurveyResults>> {
    let survey = store
        .survey(survey_id)
        .await
        .ok_or_else(|| Error::not_found("Survey"))?;
    if !token.is_owner()
        && !survey.is_closed()
        && !store.has_answered(survey_id, token.id()).await
    {
        return Err(Error::Status(
            Status::Forbidden,
            "You must answer the survey to see results".to_string(),
        ));
    }

    // Oldest first, so raw text reads in submission order.
    let responses = store.responses_for(survey_id).await;
    Ok(Json(aggregate(&survey, responses.iter().rev(), token.is_owner())))
}
