use crate::routes::error::map_error;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use registrar_core::error::EventError;
use registrar_core::types::{CreateEventInput, EventFilter, EventId, UpdateEventInput};
use registrar_core::RequestContext;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", axum::routing::post(create_event).get(list_events))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
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
    path = "/api/events",
    request_body = CreateEventInput,
    responses((status = 200, body = registrar_core::types::Event))
)]
pub(crate) async fn create_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<CreateEventInput>,
) -> Response {
    let registrar = state.registrar.lock().await;
    match registrar.events().create(&ctx, input) {
        Ok(event) => Json(event).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventFilter),
    responses((status = 200, body = Vec<registrar_core::types::Event>))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Response {
    let registrar = state.registrar.lock().await;
    match registrar.events().list(filter) {
        Ok(events) => Json(events).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 200, body = Option<registrar_core::types::Event>))
)]
pub(crate) async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let event_id = match parse_event_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let registrar = state.registrar.lock().await;
    match registrar.events().get(&event_id) {
        Ok(Some(event)) => Json(event).into_response(),
        Ok(None) => map_error(&EventError::NotFound.into(), None).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    request_body = UpdateEventInput,
    responses((status = 200, body = registrar_core::types::Event))
)]
pub(crate) async fn update_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateEventInput>,
) -> Response {
    let event_id = match parse_event_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, ctx.correlation_id).into_response(),
    };
    let registrar = state.registrar.lock().await;
    match registrar.events().update(&ctx, &event_id, input) {
        Ok(event) => Json(event).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 200))
)]
pub(crate) async fn delete_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match parse_event_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, ctx.correlation_id).into_response(),
    };
    let registrar = state.registrar.lock().await;
    match registrar.events().delete(&ctx, &event_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
