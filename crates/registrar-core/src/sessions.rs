use crate::error::SessionError;
use crate::types::{OpenedSession, Session, UserId};
use chrono::Duration;

pub trait SessionRepository {
    /// Open a session for an externally authenticated user. The
    /// plaintext token is returned exactly once.
    fn open(&self, user_id: &UserId, ttl: Duration) -> Result<OpenedSession, SessionError>;
    /// Look up the live session behind a bearer token. Expired or
    /// unknown tokens resolve to `None`, never an error.
    fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError>;
    fn revoke(&self, token: &str) -> Result<(), SessionError>;
}
