use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::SystemConfig;
use crate::handlers::{health_check, translate_get, translate_post};
use crate::state::AppState;

/// Full application router with tracing and CORS applied.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.system_config);

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/translate", get(translate_get).post(translate_post))
        .layer(cors);

    Router::new()
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Credentials are only allowed for an explicit origin list.
pub fn cors_layer(system_config: &SystemConfig) -> CorsLayer {
    let base = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let origins: Vec<HeaderValue> = system_config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        base.allow_origin(Any).allow_headers(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}
