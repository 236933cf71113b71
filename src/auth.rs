//! Request identity as reported by the upstream auth gateway.
//!
//! Sessions, tokens and sign-in UI live in the hosted auth service. All this
//! service learns is the signed-in user's id, carried in a configurable header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::Response,
};
use std::convert::Infallible;

use crate::handler::AppState;

pub fn user_from_headers(headers: &HeaderMap, header: &str) -> Option<String> {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// The current user, if any.
pub struct CurrentUser(pub Option<String>);

/// A signed-in user. Rejects with 401 otherwise.
pub struct SignedIn(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(user_from_headers(&parts.headers, &state.auth.user_header)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SignedIn {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match user_from_headers(&parts.headers, &state.auth.user_header) {
            Some(user) => Ok(SignedIn(user)),
            None => Err(crate::error_response(StatusCode::UNAUTHORIZED, "sign in required")),
        }
    }
}
