use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::{error::HttpError, feed::FeedService};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
}

impl HttpState {
    pub fn new(feed: Arc<FeedService>) -> Self {
        Self { feed }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/posts", get(posts))
        .route("/poems", get(poems))
        .route("/_health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn posts(State(state): State<HttpState>) -> Response {
    match state.feed.posts().await {
        Ok(data) => Json(data.as_slice()).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn poems(State(state): State<HttpState>) -> Response {
    match state.feed.poems().await {
        Ok(data) => Json(data.as_slice()).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found(uri: Uri) -> Response {
    HttpError::new(
        "infra::http::fallback",
        StatusCode::NOT_FOUND,
        format!("no route for `{}`", uri.path()),
    )
    .into_response()
}
