use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn configure_routes(state: AppState) -> Router<AppState> {
    // Matches the fixed CORS contract: any origin, this method list, this
    // header list. Preflight OPTIONS short-circuits with 200 in the layer.
    // Unlike a blanket header middleware, the layer only emits the
    // Access-Control-* headers when the request carries an Origin header;
    // browsers always send one, so only non-browser clients can tell.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ]);

    Router::new()
        .route("/ping", get(ping))
        .merge(crate::modules::upload::router(&state))
        .nest_service("/stream", ServeDir::new(state.config.hls_dir.clone()))
        .layer(cors)
}

async fn ping() -> &'static str {
    "pong"
}
