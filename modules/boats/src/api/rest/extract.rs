use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use problem::ProblemResponse;
use serde::de::DeserializeOwned;

use crate::api::rest::error::from_code;
use crate::contract::model::Identity;
use crate::errors::ErrorCode;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Caller identity forwarded by the authenticating gateway in front of the service.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Identity);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (Some(user_id), Some(email)) = (
            header(&parts.headers, USER_ID_HEADER),
            header(&parts.headers, USER_EMAIL_HEADER),
        ) else {
            return Err(from_code(
                ErrorCode::boats_identity_unauthenticated_v1,
                format!("{USER_ID_HEADER} and {USER_EMAIL_HEADER} headers are required"),
                parts.uri.path(),
            ));
        };

        let mut identity = Identity::new(user_id, email);
        if let Some(name) = header(&parts.headers, USER_NAME_HEADER) {
            identity = identity.with_first_name(name);
        }
        Ok(Self(identity))
    }
}

/// `Json` that answers malformed bodies with a validation problem.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(from_code(
                ErrorCode::boats_request_validation_v1,
                rejection.body_text(),
                &instance,
            )),
        }
    }
}
