use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
#[cfg(test)]
use jsonwebtoken::{EncodingKey, Header};
use jsonwebtoken::{errors::Error as JwtError, DecodingKey, Validation};
use rocket::{
    http::Status,
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// The identifier the identity service assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Owner,
}

/// The roles allowed through a route.
pub trait Rights {
    fn permits(role: Role) -> bool;
}

/// Any authenticated user.
#[derive(Debug)]
pub struct AnyUser;

impl Rights for AnyUser {
    fn permits(_role: Role) -> bool {
        true
    }
}

/// Users with the [`Role::Owner`] role only.
#[derive(Debug)]
pub struct Owner;

impl Rights for Owner {
    fn permits(role: Role) -> bool {
        role == Role::Owner
    }
}

/// A verified bearer token for a user with the rights `U`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken<U> {
    #[serde(rename = "sub")]
    id: UserId,
    name: String,
    role: Role,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            phantom: PhantomData,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// The user's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// Sign this token, valid for `ttl`. Tokens are normally issued by the
    /// identity service, so only tests mint their own.
    #[cfg(test)]
    pub(crate) fn encode(
        self,
        config: &Config,
        ttl: chrono::Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + ttl,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
    }

    /// Verify and decode a signed token.
    pub fn decode(token: &str, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode::<Claims<U>>(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data| data.claims.token)
    }
}

/// Token claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// Why a request guard turned a request away. Stashed in the request-local
/// cache so the error catchers can report it.
#[derive(Debug, Clone, Default)]
pub struct GuardFailure(pub Option<String>);

impl GuardFailure {
    fn reject<T>(req: &Request<'_>, status: Status, detail: &str) -> request::Outcome<T, String> {
        let detail = detail.to_string();
        req.local_cache(|| GuardFailure(Some(detail.clone())));
        request::Outcome::Failure((status, detail))
    }
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: Rights,
{
    type Error = String;

    /// Read the token from the `Authorization: Bearer` header and check the
    /// user's role is allowed through.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<Config>>().await {
            request::Outcome::Success(config) => config,
            _ => return GuardFailure::reject(req, Status::InternalServerError, "Missing config"),
        };

        let bearer = req
            .headers()
            .get_one("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "));
        let Some(bearer) = bearer else {
            return GuardFailure::reject(req, Status::Unauthorized, "Not authenticated");
        };

        let token = match Self::decode(bearer.trim(), config) {
            Ok(token) => token,
            Err(err) => {
                debug!("Rejected bearer token: {err}");
                return GuardFailure::reject(req, Status::Unauthorized, "Invalid token");
            }
        };

        if U::permits(token.role) {
            request::Outcome::Success(token)
        } else {
            GuardFailure::reject(req, Status::Forbidden, "Only owner can perform this action")
        }
    }
}
