use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
    Catcher, Request, Route,
};

use crate::model::auth::GuardFailure;

mod responses;
mod results;
mod surveys;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(surveys::routes());
    routes.extend(responses::routes());
    routes.extend(results::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![detail]
}

/// Report every failure as `{"detail": "..."}`, using the reason a request
/// guard gave if there is one.
#[catch(default)]
fn detail(status: Status, req: &Request<'_>) -> (Status, Json<Value>) {
    let detail = req
        .local_cache(GuardFailure::default)
        .0
        .clone()
        .or_else(|| status.reason().map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string());
    (status, Json(json!({ "detail": detail })))
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Duration;
    use rocket::{
        http::{ContentType, Header, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::{serde_json, Value},
    };

    use crate::{
        config::Config,
        model::{
            auth::{AnyUser, AuthToken, Role, UserId},
            survey::{Survey, SurveySpec},
        },
    };

    pub const OWNER: &str = "owner-1";
    pub const ALICE: &str = "alice";
    pub const BOB: &str = "bob";

    /// An `Authorization` header for the given user.
    pub fn bearer(client: &Client, user: &str, role: Role) -> Header<'static> {
        let config = client.rocket().state::<Config>().unwrap();
        let token = AuthToken::<AnyUser>::new(UserId::from(user), user, role)
            .encode(config, Duration::minutes(5))
            .unwrap();
        Header::new("Authorization", format!("Bearer {token}"))
    }

    pub fn owner(client: &Client) -> Header<'static> {
        bearer(client, OWNER, Role::Owner)
    }

    pub fn user(client: &Client, name: &str) -> Header<'static> {
        bearer(client, name, Role::User)
    }

    /// Publish the example survey as the owner.
    pub async fn publish(client: &Client) -> Survey {
        publish_spec(client, &SurveySpec::example()).await
    }

    pub async fn publish_spec(client: &Client, spec: &SurveySpec) -> Survey {
        let response = client
            .post("/api/surveys")
            .header(ContentType::JSON)
            .header(owner(client))
            .body(serde_json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    pub async fn into_json(response: LocalResponse<'_>) -> Value {
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }
}
