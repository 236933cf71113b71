//! HTTP Handlers for the Favorites API

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::{FavoriteTarget, FavoriteToggle};
use crate::auth::SignedIn;
use crate::error::FavoriteError;
use crate::handler::AppState;
use crate::{bad_request, error_response};

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub poet_name: String,
    pub poem_title: String,
}

#[derive(Debug, Serialize)]
struct FavoritesApiResponse<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct StatusBody<S> {
    status: S,
}

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(FavoritesApiResponse { data })).into_response()
}

fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(FavoritesApiResponse { data })).into_response()
}

fn favorite_error(action: &str, e: FavoriteError) -> Response {
    match e {
        FavoriteError::Invalid(msg) => bad_request(&msg),
        FavoriteError::Busy => error_response(StatusCode::CONFLICT, "favorite update already in progress"),
        FavoriteError::StatusUnknown | FavoriteError::Store(_) => {
            tracing::error!("failed to {}: {}", action, e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "favorites store unavailable")
        }
        FavoriteError::Cancelled => {
            tracing::warn!("{} abandoned: {}", action, e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "service shutting down")
        }
    }
}

pub async fn list_favorites(State(state): State<AppState>, SignedIn(user_id): SignedIn) -> Response {
    match state.favorites.list(&user_id).await {
        Ok(favorites) => success(favorites),
        Err(e) => favorite_error("list favorites", e),
    }
}

pub async fn create_favorite(
    State(state): State<AppState>,
    SignedIn(user_id): SignedIn,
    Json(payload): Json<FavoriteTarget>,
) -> Response {
    match state.favorites.add(&user_id, payload).await {
        Ok(favorite) => created(favorite),
        Err(e) => favorite_error("add favorite", e),
    }
}

pub async fn favorite_status(
    State(state): State<AppState>,
    SignedIn(user_id): SignedIn,
    Path(slug): Path<String>,
) -> Response {
    match state.favorites.check(&user_id, &slug).await {
        Ok(status) => success(StatusBody { status }),
        Err(e) => favorite_error("check favorite", e),
    }
}

pub async fn delete_favorite(
    State(state): State<AppState>,
    SignedIn(user_id): SignedIn,
    Path(slug): Path<String>,
) -> Response {
    match state.favorites.remove(&user_id, &slug).await {
        Ok(()) => (StatusCode::NO_CONTENT, ()).into_response(),
        Err(e) => favorite_error("remove favorite", e),
    }
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    SignedIn(user_id): SignedIn,
    Path(slug): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Response {
    let Some(_permit) = state.in_flight.try_acquire(&user_id, &slug) else {
        return favorite_error("toggle favorite", FavoriteError::Busy);
    };

    let toggle = FavoriteToggle::new(
        state.favorites.clone(),
        user_id,
        FavoriteTarget {
            poem_slug: slug,
            poet_name: payload.poet_name,
            poem_title: payload.poem_title,
        },
    );
    let cancel = state.shutdown.child_token();

    if let Err(e) = toggle.refresh(&cancel).await {
        return favorite_error("check favorite", e);
    }

    match toggle.toggle(&cancel).await {
        Ok(next) => success(StatusBody { status: next }),
        Err(e) => favorite_error("toggle favorite", e),
    }
}
