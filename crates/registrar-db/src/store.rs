use registrar_core::RegistrarError;
use registrar_core::store::Store;
use rusqlite::Connection;

use crate::change_repo::ChangeRepo;
use crate::event_repo::EventRepo;
use crate::registration_repo::RegistrationRepo;
use crate::session_repo::SessionRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;
    type Registrations<'a>
        = RegistrationRepo<'a>
    where
        Self: 'a;
    type Sessions<'a>
        = SessionRepo<'a>
    where
        Self: 'a;
    type Changes<'a>
        = ChangeRepo<'a>
    where
        Self: 'a;

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    fn registrations(&self) -> Self::Registrations<'_> {
        RegistrationRepo::new(&self.conn)
    }

    fn sessions(&self) -> Self::Sessions<'_> {
        SessionRepo::new(&self.conn)
    }

    fn changes(&self) -> Self::Changes<'_> {
        ChangeRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&Self) -> Result<T, RegistrarError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|err| RegistrarError::Internal {
                message: err.to_string(),
            })?;
        let result = f(self);
        match result {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|err| RegistrarError::Internal {
                        message: err.to_string(),
                    })?;
                Ok(value)
            }
            Err(err) => {
                self.conn
                    .execute_batch("ROLLBACK")
                    .map_err(|rollback_err| RegistrarError::Internal {
                        message: rollback_err.to_string(),
                    })?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use chrono::NaiveDate;
    use registrar_core::events::EventRepository;
    use registrar_core::types::{CreateEventInput, EventFilter};

    #[test]
    fn failed_tx_rolls_back_writes() {
        let store = DbStore::new(with_test_db().unwrap());
        let input = CreateEventInput {
            title: "doomed".to_string(),
            description: "desc".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
            time: "15:00 EST".to_string(),
            max_seats: 10,
            price: 0,
            is_virtual: false,
        };
        let result: Result<(), RegistrarError> = store.with_tx(|store| {
            store.events().create(input)?;
            Err(RegistrarError::Internal {
                message: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        let events = store.events().list(EventFilter::default()).unwrap();
        assert!(events.is_empty());
    }
}
