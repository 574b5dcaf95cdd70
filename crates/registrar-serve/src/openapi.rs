use utoipa::OpenApi;

use crate::routes::changes::ChangesQuery;
use crate::routes::sessions::OpenSessionInput;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use registrar_core::types::{
    ChangeBody, CreateEventInput, Event, EventFilter, EventId, OpenedSession, Registration,
    RegistrationId, RegistrationStatus, SeatCount, Session, SessionId, UpdateEventInput, UserId,
};
use registrar_feed::types::{ChangeOp, ChangeRecord, ChangeSource, ChangeTable};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::events::create_event,
        crate::routes::events::list_events,
        crate::routes::events::get_event,
        crate::routes::events::update_event,
        crate::routes::events::delete_event,
        crate::routes::registrations::register,
        crate::routes::registrations::my_registration,
        crate::routes::registrations::list_registrations,
        crate::routes::sessions::open_session,
        crate::routes::sessions::current_session,
        crate::routes::sessions::close_session,
        crate::routes::changes::list_changes,
        crate::routes::changes::subscribe,
        crate::routes::changes::stream
    ),
    components(schemas(
        Event,
        SeatCount,
        CreateEventInput,
        UpdateEventInput,
        EventFilter,
        Registration,
        RegistrationStatus,
        Session,
        OpenedSession,
        OpenSessionInput,
        ChangeBody,
        ChangeRecord,
        ChangeTable,
        ChangeOp,
        ChangeSource,
        ChangesQuery,
        EventId,
        RegistrationId,
        SessionId,
        UserId
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Registrar API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    (axum::http::StatusCode::OK, axum::response::Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_includes_guard_route() {
        let spec = generate_spec();
        assert!(spec.contains("/api/events/{id}/registrations"));
        assert!(spec.contains("/api/changes/subscribe"));
    }
}
