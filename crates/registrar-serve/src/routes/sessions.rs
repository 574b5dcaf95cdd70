use crate::routes::bearer_token;
use crate::routes::error::map_error;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Duration;
use registrar_core::error::SessionError;
use registrar_core::types::UserId;
use utoipa::ToSchema;

const DEFAULT_TTL_HOURS: i64 = 8;
const MAX_TTL_HOURS: i64 = 720;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct OpenSessionInput {
    user_id: String,
    ttl_hours: Option<i64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(open_session))
        .route(
            "/sessions/current",
            get(current_session).delete(close_session),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = OpenSessionInput,
    responses((status = 200, body = registrar_core::types::OpenedSession))
)]
pub(crate) async fn open_session(
    State(state): State<AppState>,
    Json(input): Json<OpenSessionInput>,
) -> Response {
    let user_id = match UserId::new(input.user_id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &SessionError::InvalidInput {
                    message: err.to_string(),
                }
                .into(),
                None,
            )
            .into_response()
        }
    };
    let ttl_hours = input.ttl_hours.unwrap_or(DEFAULT_TTL_HOURS);
    if !(1..=MAX_TTL_HOURS).contains(&ttl_hours) {
        return map_error(
            &SessionError::InvalidInput {
                message: format!("ttl_hours must be between 1 and {MAX_TTL_HOURS}"),
            }
            .into(),
            None,
        )
        .into_response();
    }
    let ttl = Duration::hours(ttl_hours);
    let registrar = state.registrar.lock().await;
    // the token in the response is the only copy; the store keeps a hash
    match registrar.sessions().open(&user_id, ttl) {
        Ok(opened) => Json(opened).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/current",
    responses((status = 200, body = Option<registrar_core::types::Session>))
)]
pub(crate) async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let token = bearer_token(&headers);
    let registrar = state.registrar.lock().await;
    match registrar.sessions().current(token.as_deref()) {
        Ok(session) => Json(session).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/sessions/current",
    responses((status = 200), (status = 404, description = "No such session"))
)]
pub(crate) async fn close_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return map_error(&SessionError::NotFound.into(), None).into_response();
    };
    let registrar = state.registrar.lock().await;
    match registrar.sessions().close(&token) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use axum::http::StatusCode;
    use registrar_core::Registrar;
    use registrar_db::schema::with_test_db;
    use registrar_db::store::DbStore;
    use registrar_feed::bus::ChangeBus;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn state() -> AppState {
        let bus = ChangeBus::new(16);
        let registrar = Registrar::new(DbStore::new(with_test_db().unwrap()), bus.clone());
        AppState {
            registrar: Arc::new(Mutex::new(registrar)),
            bus,
            public_dir: None,
        }
    }

    async fn open(ttl_hours: Option<i64>) -> Response {
        open_session(
            State(state()),
            Json(OpenSessionInput {
                user_id: "usr-1".to_string(),
                ttl_hours,
            }),
        )
        .await
    }

    #[tokio::test]
    async fn oversized_ttl_is_rejected() {
        let response = open(Some(i64::MAX)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = open(Some(MAX_TTL_HOURS + 1)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_positive_ttl_is_rejected() {
        let response = open(Some(0)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = open(Some(i64::MIN)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn default_ttl_opens_a_session() {
        let response = open(None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
