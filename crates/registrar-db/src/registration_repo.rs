use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use chrono::Utc;
use registrar_core::error::RegistrationError;
use registrar_core::registrations::RegistrationRepository;
use registrar_core::types::{EventId, Registration, RegistrationId, RegistrationStatus, UserId};
use rusqlite::Connection;

pub struct RegistrationRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> RegistrationRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> RegistrationRepository for RegistrationRepo<'a> {
    fn create(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        status: RegistrationStatus,
    ) -> Result<Registration, RegistrationError> {
        let registration = Registration {
            id: RegistrationId::generate(),
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            status,
            created_at: Utc::now(),
        };
        let sql = "INSERT INTO registrations (id, user_id, event_id, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
        let params = (
            registration.id.as_str(),
            registration.user_id.as_str(),
            registration.event_id.as_str(),
            encode_enum(&registration.status).map_err(|err| RegistrationError::Store {
                message: err.to_string(),
            })?,
            to_rfc3339(&registration.created_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(map_insert_error)?;
        Ok(registration)
    }

    fn find(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, RegistrationError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, event_id, status, created_at FROM registrations WHERE user_id = ?1 AND event_id = ?2")
            .map_err(|err| RegistrationError::Store {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([user_id.as_str(), event_id.as_str()])
            .map_err(|err| RegistrationError::Store {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| RegistrationError::Store {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_registration_row(row).map(Some)
    }

    fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Registration>, RegistrationError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, event_id, status, created_at FROM registrations WHERE event_id = ?1 ORDER BY created_at ASC")
            .map_err(|err| RegistrationError::Store {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([event_id.as_str()])
            .map_err(|err| RegistrationError::Store {
                message: err.to_string(),
            })?;
        let mut registrations = Vec::new();
        while let Some(row) = rows.next().map_err(|err| RegistrationError::Store {
            message: err.to_string(),
        })? {
            registrations.push(map_registration_row(row)?);
        }
        Ok(registrations)
    }
}

/// The UNIQUE (user_id, event_id) constraint is the authoritative
/// duplicate check; the guard's lookup is only a fast path.
fn map_insert_error(err: rusqlite::Error) -> RegistrationError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return RegistrationError::AlreadyRegistered;
        }
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return RegistrationError::EventNotFound;
        }
    }
    RegistrationError::Store {
        message: err.to_string(),
    }
}

fn map_registration_row(row: &rusqlite::Row<'_>) -> Result<Registration, RegistrationError> {
    let store_err = |err: &dyn std::fmt::Display| RegistrationError::Store {
        message: err.to_string(),
    };
    let id: String = row.get(0).map_err(|err| store_err(&err))?;
    let user_id: String = row.get(1).map_err(|err| store_err(&err))?;
    let event_id: String = row.get(2).map_err(|err| store_err(&err))?;
    let status: String = row.get(3).map_err(|err| store_err(&err))?;
    let created_at: String = row.get(4).map_err(|err| store_err(&err))?;

    Ok(Registration {
        id: RegistrationId::new(id).map_err(|err| store_err(&err))?,
        user_id: UserId::new(user_id).map_err(|err| store_err(&err))?,
        event_id: EventId::new(event_id).map_err(|err| store_err(&err))?,
        status: decode_enum(&status).map_err(|err| store_err(&err))?,
        created_at: from_rfc3339(&created_at).map_err(|err| store_err(&err))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_repo::EventRepo;
    use crate::schema::with_test_db;
    use chrono::NaiveDate;
    use registrar_core::events::EventRepository;
    use registrar_core::types::CreateEventInput;
    use std::str::FromStr;

    fn seed_event(conn: &Connection) -> EventId {
        let repo = EventRepo::new(conn);
        let event = repo
            .create(CreateEventInput {
                title: "seeded".to_string(),
                description: "desc".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
                time: "15:00 EST".to_string(),
                max_seats: 10,
                price: 0,
                is_virtual: false,
            })
            .unwrap();
        event.id
    }

    #[test]
    fn duplicate_insert_maps_to_already_registered() {
        let conn = with_test_db().unwrap();
        let event_id = seed_event(&conn);
        let repo = RegistrationRepo::new(&conn);
        let user = UserId::from_str("usr-1").unwrap();
        repo.create(&user, &event_id, RegistrationStatus::Confirmed)
            .unwrap();
        let err = repo
            .create(&user, &event_id, RegistrationStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::AlreadyRegistered));
    }

    #[test]
    fn insert_against_missing_event_maps_to_event_not_found() {
        let conn = with_test_db().unwrap();
        let repo = RegistrationRepo::new(&conn);
        let user = UserId::from_str("usr-1").unwrap();
        let err = repo
            .create(&user, &EventId::generate(), RegistrationStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::EventNotFound));
    }

    #[test]
    fn find_returns_only_the_matching_pair() {
        let conn = with_test_db().unwrap();
        let event_id = seed_event(&conn);
        let repo = RegistrationRepo::new(&conn);
        let alice = UserId::from_str("usr-alice").unwrap();
        let bob = UserId::from_str("usr-bob").unwrap();
        let created = repo
            .create(&alice, &event_id, RegistrationStatus::Confirmed)
            .unwrap();
        assert_eq!(repo.find(&alice, &event_id).unwrap(), Some(created));
        assert_eq!(repo.find(&bob, &event_id).unwrap(), None);
    }
}
