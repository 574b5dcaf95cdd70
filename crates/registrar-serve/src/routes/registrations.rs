use crate::routes::error::map_error;
use crate::routes::bearer_token;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use registrar_core::error::EventError;
use registrar_core::types::EventId;
use registrar_core::RequestContext;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events/{id}/registrations", post(register).get(list_registrations))
        .route("/events/{id}/registration", get(my_registration))
        .with_state(state)
}

fn parse_event_id(id: String) -> Result<EventId, registrar_core::RegistrarError> {
    EventId::new(id).map_err(|err| {
        EventError::InvalidInput {
            message: err.to_string(),
        }
        .into()
    })
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/registrations",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, body = registrar_core::types::Registration),
        (status = 401, description = "No valid session"),
        (status = 404, description = "Event does not exist"),
        (status = 409, description = "Already registered or event full")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let event_id = match parse_event_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, ctx.correlation_id).into_response(),
    };
    let token = bearer_token(&headers);
    let registrar = state.registrar.lock().await;
    match registrar
        .registrations()
        .register(&ctx, token.as_deref(), &event_id)
    {
        Ok(registration) => Json(registration).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/registration",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 200, body = Option<registrar_core::types::Registration>))
)]
pub(crate) async fn my_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let event_id = match parse_event_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let token = bearer_token(&headers);
    let registrar = state.registrar.lock().await;
    match registrar
        .registrations()
        .registration(token.as_deref(), &event_id)
    {
        Ok(registration) => Json(registration).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/registrations",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 200, body = Vec<registrar_core::types::Registration>))
)]
pub(crate) async fn list_registrations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match parse_event_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let registrar = state.registrar.lock().await;
    match registrar.registrations().list_for_event(&event_id) {
        Ok(registrations) => Json(registrations).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
