use crate::routes::error::map_error;
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use registrar_feed::types::{ChangeRecord, ChangeTable};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct ChangesQuery {
    after: Option<i64>,
    limit: Option<u32>,
    table: Option<ChangeTable>,
}

/// The WebSocket route tails live changes only; use the SSE route or
/// `GET /changes` for history.
#[derive(Debug, serde::Deserialize, IntoParams)]
pub struct StreamQuery {
    table: Option<ChangeTable>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/changes", get(list_changes))
        .route("/changes/subscribe", get(subscribe))
        .route("/changes/stream", get(stream))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/changes",
    params(ChangesQuery),
    responses((status = 200, body = Vec<ChangeRecord>))
)]
pub(crate) async fn list_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Response {
    let registrar = state.registrar.lock().await;
    match registrar.changes().list(query.after, query.limit, query.table) {
        Ok(changes) => Json(changes).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/changes/subscribe",
    params(ChangesQuery),
    responses((status = 200, description = "SSE stream of change records"))
)]
pub(crate) async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Response {
    crate::sse::subscribe(state, query.after, query.table).await
}

#[utoipa::path(
    get,
    path = "/api/changes/stream",
    params(StreamQuery),
    responses((status = 200, description = "WebSocket live tail of change records, no history replay"))
)]
pub(crate) async fn stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stream(socket, state, query.table))
}

async fn handle_stream(mut socket: WebSocket, state: AppState, table: Option<ChangeTable>) {
    let mut receiver = state.bus.subscribe();
    while let Ok(change) = receiver.recv().await {
        if table.is_some_and(|wanted| wanted != change.table) {
            continue;
        }
        let json = serde_json::to_string(&change).unwrap_or_else(|_| "{}".to_string());
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}
