use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use crate::state::AppState;
use crate::translator::{normalize_code, LookupRequest, LookupResult};

/// `POST /api/translate`
///
/// The body is parsed as JSON whatever its content type; an unreadable
/// body is treated as an empty code.
pub async fn translate_post(State(state): State<AppState>, body: Bytes) -> Json<LookupResult> {
    let request = match serde_json::from_slice::<LookupRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Unreadable translate body: {}", e);
            LookupRequest::default()
        }
    };

    let uppercase = state.config.translator_config.uppercase_post_codes;
    dispatch(&state, request, uppercase).await
}

/// `GET /api/translate?code=...`; codes are always upper-cased here.
pub async fn translate_get(
    State(state): State<AppState>,
    query: Result<Query<LookupRequest>, QueryRejection>,
) -> Json<LookupResult> {
    let request = match query {
        Ok(Query(request)) => request,
        Err(rejection) => {
            debug!("Unreadable translate query: {}", rejection.body_text());
            LookupRequest::default()
        }
    };

    dispatch(&state, request, true).await
}

async fn dispatch(state: &AppState, request: LookupRequest, uppercase: bool) -> Json<LookupResult> {
    let request = LookupRequest {
        code: normalize_code(&request.code, uppercase),
        branch: request.branch,
    };
    Json(state.gateway.lookup_detached(request).await)
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "assistantConfigured": state.gateway.assistant_configured()
    }))
}
