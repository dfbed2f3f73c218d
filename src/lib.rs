pub mod config;
pub mod email;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod submission;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::{AppState, SharedState};
use crate::submission::IngestionWorkflow;

pub fn build_app(config: Config, workflow: IngestionWorkflow) -> Router {
    let cors = middleware::cors::layer(config.environment, &config.cors);
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState { config, workflow });

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
