use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;

use crate::state::AppState;

pub mod handler;
pub mod model;
pub mod service;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/upload", post(handler::upload_video))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
}
