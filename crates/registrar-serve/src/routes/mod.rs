pub mod changes;
pub mod error;
pub mod events;
pub mod registrations;
pub mod sessions;

use crate::middleware::correlation::correlation_middleware;
use crate::{openapi, AppState};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware;
use axum::Router;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(events::router(state.clone()))
        .merge(registrations::router(state.clone()))
        .merge(sessions::router(state.clone()))
        .merge(changes::router(state))
        .merge(openapi::router())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new().nest("/api", api)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
