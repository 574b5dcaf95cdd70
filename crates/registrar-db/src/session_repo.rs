use crate::util::{from_rfc3339, to_rfc3339};
use chrono::{DateTime, Duration, Utc};
use registrar_core::error::SessionError;
use registrar_core::sessions::SessionRepository;
use registrar_core::types::{OpenedSession, Session, SessionId, UserId};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use ulid::Ulid;

pub struct SessionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> SessionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Drop sessions whose expiry has passed. Run at startup.
    pub fn cleanup(&self, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                [to_rfc3339(&now)],
            )
            .map_err(|err| SessionError::Store {
                message: err.to_string(),
            })?;
        Ok(affected as u64)
    }
}

impl<'a> SessionRepository for SessionRepo<'a> {
    fn open(&self, user_id: &UserId, ttl: Duration) -> Result<OpenedSession, SessionError> {
        let now = Utc::now();
        let Some(expires_at) = now.checked_add_signed(ttl) else {
            return Err(SessionError::InvalidInput {
                message: "ttl out of range".to_string(),
            });
        };
        let token = format!("tok_{}{}", Ulid::new(), Ulid::new());
        let session = Session {
            id: SessionId::generate(),
            user_id: user_id.clone(),
            created_at: now,
            expires_at,
        };
        let sql = "INSERT INTO sessions (token_hash, id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)";
        let params = (
            hash_token(&token),
            session.id.as_str(),
            session.user_id.as_str(),
            to_rfc3339(&session.created_at),
            to_rfc3339(&session.expires_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| SessionError::Store {
                message: err.to_string(),
            })?;
        Ok(OpenedSession { session, token })
    }

    fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?1")
            .map_err(|err| SessionError::Store {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([hash_token(token)])
            .map_err(|err| SessionError::Store {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| SessionError::Store {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        let session = map_session_row(row)?;
        if session.expires_at <= Utc::now() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM sessions WHERE token_hash = ?1",
                [hash_token(token)],
            )
            .map_err(|err| SessionError::Store {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(SessionError::NotFound);
        }
        Ok(())
    }
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_session_row(row: &rusqlite::Row<'_>) -> Result<Session, SessionError> {
    let store_err = |err: &dyn std::fmt::Display| SessionError::Store {
        message: err.to_string(),
    };
    let id: String = row.get(0).map_err(|err| store_err(&err))?;
    let user_id: String = row.get(1).map_err(|err| store_err(&err))?;
    let created_at: String = row.get(2).map_err(|err| store_err(&err))?;
    let expires_at: String = row.get(3).map_err(|err| store_err(&err))?;

    Ok(Session {
        id: SessionId::new(id).map_err(|err| store_err(&err))?,
        user_id: UserId::new(user_id).map_err(|err| store_err(&err))?,
        created_at: from_rfc3339(&created_at).map_err(|err| store_err(&err))?,
        expires_at: from_rfc3339(&expires_at).map_err(|err| store_err(&err))?,
    })
}
