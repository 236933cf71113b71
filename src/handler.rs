use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::api::{ApiResponse, PoemPage, PoemSummary, SearchParams, SectionView};
use crate::auth::CurrentUser;
use crate::config::Auth;
use crate::content::ContentTree;
use crate::content::sections::{Section, author_line, document_title, parse_sections};
use crate::favorites::{self, FavoriteStatus, Favorites, InFlight};
use crate::model::{Poem, Poet};
use crate::render::{self, PageView};
use crate::share::ShareCard;
use crate::speech::{Utterance, reading_lines};
use crate::{not_found, server_error};

#[derive(Clone)]
pub struct AppState {
    pub favorites: Favorites,
    pub content: Arc<ContentTree>,
    pub in_flight: Arc<InFlight>,
    pub auth: Auth,
    pub base_url: String,
    pub shutdown: CancellationToken,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/index", get(get_index))
        .route("/api/search", get(search))
        .route("/api/tags", get(get_tags))
        .route("/api/poems/:poet/:slug", get(get_poem))
        .route("/api/poems/:poet/:slug/speech", get(get_speech))
        .route("/api/poems/:poet/:slug/share", get(get_share_card))
        .route("/poem/:poet/:slug", get(poem_page))
        .route("/sitemap.xml", get(sitemap))
        .nest("/api/favorites", favorites::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// A parsed poem document together with whatever the index knows about it.
struct LoadedPoem<'a> {
    sections: Vec<Section>,
    title: String,
    author: String,
    meta: Option<(&'a Poet, &'a Poem)>,
}

impl LoadedPoem<'_> {
    fn dynasty(&self) -> Option<&str> {
        self.meta.map(|(poet, _)| poet.dynasty.as_str())
    }

    fn image(&self) -> Option<&str> {
        self.meta
            .map(|(_, poem)| poem.image.as_str())
            .filter(|image| !image.is_empty())
    }

    /// Index tags when the poem is listed, otherwise the document's tag line.
    fn tags(&self) -> Vec<String> {
        match self.meta {
            Some((_, poem)) => poem.tags.clone(),
            None => self.sections.iter().flat_map(|s| s.tags()).collect(),
        }
    }
}

fn load_poem<'a>(content: &'a ContentTree, poet: &str, slug: &str) -> Result<Option<LoadedPoem<'a>>, Response> {
    let body = match content.document(poet, slug) {
        Ok(Some(body)) => body,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::error!(poet, slug, "failed to read poem document: {:#}", e);
            return Err(server_error("failed to read poem"));
        }
    };

    let sections = parse_sections(&body);
    let title = document_title(&sections).unwrap_or(slug).to_string();
    let author = author_line(&sections).unwrap_or_default();

    Ok(Some(LoadedPoem {
        sections,
        title,
        author,
        meta: content.find_poem(poet, slug),
    }))
}

async fn favorite_status(state: &AppState, user: Option<&str>, slug: &str) -> Option<FavoriteStatus> {
    let user_id = user?;
    match state.favorites.check(user_id, slug).await {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(user_id, slug, "favorite status unavailable: {}", e);
            None
        }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_index(State(state): State<AppState>) -> Response {
    let timeline = state.content.timeline();
    (StatusCode::OK, Json(ApiResponse::new("got index", timeline))).into_response()
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let results: Vec<PoemSummary> = state
        .content
        .search(params.q.as_deref(), params.tag.as_deref())
        .into_iter()
        .map(|(poet, poem)| PoemSummary::new(poet, poem))
        .collect();

    info!(q = ?params.q, tag = ?params.tag, results = results.len(), "search");
    (StatusCode::OK, Json(ApiResponse::new("got poems", results))).into_response()
}

pub async fn get_tags(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(ApiResponse::new("got tags", state.content.tag_counts()))).into_response()
}

pub async fn get_poem(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((poet, slug)): Path<(String, String)>,
) -> Response {
    let poem = match load_poem(&state.content, &poet, &slug) {
        Ok(Some(poem)) => poem,
        Ok(None) => return not_found("poem not found"),
        Err(response) => return response,
    };
    let favorite = favorite_status(&state, user.as_deref(), &slug).await;

    let page = PoemPage {
        dynasty: poem.dynasty().map(str::to_string),
        image: poem.image().map(str::to_string),
        sections: poem.sections.iter().map(SectionView::from).collect(),
        title: poem.title,
        author: poem.author,
        poet,
        slug,
        favorite,
    };

    (StatusCode::OK, Json(ApiResponse::new("got poem", page))).into_response()
}

pub async fn get_speech(State(state): State<AppState>, Path((poet, slug)): Path<(String, String)>) -> Response {
    let poem = match load_poem(&state.content, &poet, &slug) {
        Ok(Some(poem)) => poem,
        Ok(None) => return not_found("poem not found"),
        Err(response) => return response,
    };

    let utterance = Utterance::for_poem(&poem.title, &poet, &reading_lines(&poem.sections));
    (StatusCode::OK, Json(ApiResponse::new("got utterance", utterance))).into_response()
}

pub async fn get_share_card(State(state): State<AppState>, Path((poet, slug)): Path<(String, String)>) -> Response {
    let poem = match load_poem(&state.content, &poet, &slug) {
        Ok(Some(poem)) => poem,
        Ok(None) => return not_found("poem not found"),
        Err(response) => return response,
    };

    let card = ShareCard::new(
        &poem.title,
        &poet,
        poem.dynasty().unwrap_or_default(),
        reading_lines(&poem.sections),
        poem.tags(),
    );
    (StatusCode::OK, Json(ApiResponse::new("got share card", card))).into_response()
}

pub async fn poem_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((poet, slug)): Path<(String, String)>,
) -> Response {
    let poem = match load_poem(&state.content, &poet, &slug) {
        Ok(Some(poem)) => poem,
        Ok(None) => return (StatusCode::NOT_FOUND, Html("<h1>404</h1>")).into_response(),
        Err(response) => return response,
    };
    let favorite = favorite_status(&state, user.as_deref(), &slug).await;

    let html = render::poem_page(&PageView {
        title: &poem.title,
        author: &poem.author,
        image: poem.image(),
        sections: &poem.sections,
        favorite,
    });
    Html(html).into_response()
}

pub async fn sitemap(State(state): State<AppState>) -> Response {
    let paths = match state.content.poem_paths() {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!("failed to list poems for sitemap: {:#}", e);
            return server_error("failed to build sitemap");
        }
    };

    let xml = render::sitemap(&state.base_url, &paths, chrono::Utc::now().date_naive());
    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}
