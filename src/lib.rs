use crate::api::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;

pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod favorites;
pub mod handler;
pub mod model;
pub mod render;
pub mod share;
pub mod speech;

pub use handler::{AppState, build_router};

pub fn error_response(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

pub fn server_error(msg: &str) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
}

pub fn bad_request(msg: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, msg)
}

pub fn not_found(msg: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, msg)
}

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

/// Percent-encodes a poet/poem pair into the public page path.
pub fn poem_path(poet: &str, slug: &str) -> String {
    format!(
        "/poem/{}/{}",
        urlencoding::encode(poet),
        urlencoding::encode(slug)
    )
}
