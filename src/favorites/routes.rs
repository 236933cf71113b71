use axum::{
    Router,
    routing::{get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_favorites).post(handler::create_favorite))
        .route("/:slug", get(handler::favorite_status).delete(handler::delete_favorite))
        .route("/:slug/toggle", post(handler::toggle_favorite))
}
