use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{CorsConfig, Environment};

/// Development mirrors any origin. Production only admits configured origins
/// and origins ending with a configured suffix.
pub fn layer(environment: Environment, config: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match environment {
        Environment::Development => base.allow_origin(AllowOrigin::mirror_request()),
        Environment::Production => {
            let config = config.clone();
            base.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
                let allowed = origin
                    .to_str()
                    .map(|origin| is_allowed(&config, origin))
                    .unwrap_or(false);
                tracing::debug!(?origin, allowed, "CORS request");
                allowed
            }))
        }
    }
}

pub fn is_allowed(config: &CorsConfig, origin: &str) -> bool {
    config.allowed_origins.iter().any(|o| o == origin)
        || config.allowed_suffixes.iter().any(|s| origin.ends_with(s.as_str()))
}
