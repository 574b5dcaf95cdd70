use axum::http::StatusCode;
use axum::Json;
use registrar_core::error::{EventError, RegistrarError, RegistrationError, SessionError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &RegistrarError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        RegistrarError::Event(event) => map_event_error(event),
        RegistrarError::Registration(registration) => map_registration_error(registration),
        RegistrarError::Session(session) => map_session_error(session),
        RegistrarError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message.clone(),
        ),
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_event_error(err: &EventError) -> (StatusCode, &'static str, String) {
    match err {
        EventError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        EventError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        EventError::Store { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            err.to_string(),
        ),
    }
}

fn map_registration_error(err: &RegistrationError) -> (StatusCode, &'static str, String) {
    match err {
        RegistrationError::Unauthenticated => {
            (StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        RegistrationError::AlreadyRegistered => {
            (StatusCode::CONFLICT, "already_registered", err.to_string())
        }
        RegistrationError::EventNotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        RegistrationError::EventFull => (StatusCode::CONFLICT, "event_full", err.to_string()),
        RegistrationError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        RegistrationError::Store { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            err.to_string(),
        ),
    }
}

fn map_session_error(err: &SessionError) -> (StatusCode, &'static str, String) {
    match err {
        SessionError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        SessionError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        SessionError::Store { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            err.to_string(),
        ),
    }
}
