use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store error: {message}")]
    Store { message: String },
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("already registered for this event")]
    AlreadyRegistered,
    #[error("event not found")]
    EventNotFound,
    #[error("event is full")]
    EventFull,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store error: {message}")]
    Store { message: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store error: {message}")]
    Store { message: String },
}

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
