use crate::util::{from_date_string, from_rfc3339, to_date_string, to_rfc3339};
use chrono::Utc;
use registrar_core::error::EventError;
use registrar_core::events::EventRepository;
use registrar_core::types::{
    CreateEventInput, Event, EventFilter, EventId, SeatCount, UpdateEventInput,
};
use rusqlite::Connection;

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const COLUMNS: &str = "id, title, description, date, time, max_seats, current_seats, price, is_virtual, created_at, updated_at";

impl<'a> EventRepository for EventRepo<'a> {
    fn create(&self, input: CreateEventInput) -> Result<Event, EventError> {
        let now = Utc::now();
        let event = Event {
            id: EventId::generate(),
            title: input.title,
            description: input.description,
            date: input.date,
            time: input.time,
            max_seats: input.max_seats,
            current_seats: 0,
            price: input.price,
            is_virtual: input.is_virtual,
            created_at: now,
            updated_at: now,
        };
        let sql = "INSERT INTO events (id, title, description, date, time, max_seats, current_seats, price, is_virtual, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
        let params = (
            event.id.as_str(),
            event.title.clone(),
            event.description.clone(),
            to_date_string(&event.date),
            event.time.clone(),
            event.max_seats,
            event.current_seats,
            event.price,
            i32::from(event.is_virtual),
            to_rfc3339(&event.created_at),
            to_rfc3339(&event.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        Ok(event)
    }

    fn get(&self, id: &EventId) -> Result<Option<Event>, EventError> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(|err| EventError::Store {
            message: err.to_string(),
        })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| EventError::Store {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_event_row(row).map(Some)
    }

    fn seats(&self, id: &EventId) -> Result<Option<SeatCount>, EventError> {
        let mut stmt = self
            .conn
            .prepare("SELECT current_seats, max_seats FROM events WHERE id = ?1")
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| EventError::Store {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        let current_seats: u32 = row.get(0).map_err(|err| EventError::Store {
            message: err.to_string(),
        })?;
        let max_seats: u32 = row.get(1).map_err(|err| EventError::Store {
            message: err.to_string(),
        })?;
        Ok(Some(SeatCount {
            current_seats,
            max_seats,
        }))
    }

    fn list(&self, filter: EventFilter) -> Result<Vec<Event>, EventError> {
        let mut sql = format!("SELECT {COLUMNS} FROM events");
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(is_virtual) = filter.is_virtual {
            params.push(i64::from(is_virtual).into());
            clauses.push(format!("is_virtual = ?{}", params.len()));
        }
        if let Some(from) = filter.from {
            params.push(to_date_string(&from).into());
            clauses.push(format!("date >= ?{}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date ASC, created_at ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(|err| EventError::Store {
            message: err.to_string(),
        })?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(|err| EventError::Store {
            message: err.to_string(),
        })? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }

    fn update(&self, id: &EventId, input: UpdateEventInput) -> Result<Event, EventError> {
        let Some(existing) = self.get(id)? else {
            return Err(EventError::NotFound);
        };
        let updated = Event {
            title: input.title.unwrap_or(existing.title),
            description: input.description.unwrap_or(existing.description),
            date: input.date.unwrap_or(existing.date),
            time: input.time.unwrap_or(existing.time),
            max_seats: input.max_seats.unwrap_or(existing.max_seats),
            price: input.price.unwrap_or(existing.price),
            is_virtual: input.is_virtual.unwrap_or(existing.is_virtual),
            updated_at: Utc::now(),
            ..existing
        };
        let sql = "UPDATE events SET title = ?1, description = ?2, date = ?3, time = ?4, max_seats = ?5, price = ?6, is_virtual = ?7, updated_at = ?8 WHERE id = ?9";
        let params = (
            updated.title.clone(),
            updated.description.clone(),
            to_date_string(&updated.date),
            updated.time.clone(),
            updated.max_seats,
            updated.price,
            i32::from(updated.is_virtual),
            to_rfc3339(&updated.updated_at),
            updated.id.as_str(),
        );
        self.conn.execute(sql, params).map_err(|err| {
            // lowering max_seats below current_seats trips the CHECK
            if is_constraint_violation(&err) {
                EventError::InvalidInput {
                    message: "max_seats cannot drop below current_seats".to_string(),
                }
            } else {
                EventError::Store {
                    message: err.to_string(),
                }
            }
        })?;
        Ok(updated)
    }

    fn delete(&self, id: &EventId) -> Result<(), EventError> {
        let affected = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1", [id.as_str()])
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(EventError::NotFound);
        }
        Ok(())
    }

    fn take_seat(&self, id: &EventId) -> Result<bool, EventError> {
        let affected = self
            .conn
            .execute(
                "UPDATE events SET current_seats = current_seats + 1, updated_at = ?2 WHERE id = ?1 AND current_seats < max_seats",
                (id.as_str(), to_rfc3339(&Utc::now())),
            )
            .map_err(|err| EventError::Store {
                message: err.to_string(),
            })?;
        if affected == 1 {
            return Ok(true);
        }
        // distinguish a full event from a missing one
        if self.seats(id)?.is_none() {
            return Err(EventError::NotFound);
        }
        Ok(false)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn map_event_row(row: &rusqlite::Row<'_>) -> Result<Event, EventError> {
    let store_err = |err: &dyn std::fmt::Display| EventError::Store {
        message: err.to_string(),
    };
    let id: String = row.get(0).map_err(|err| store_err(&err))?;
    let title: String = row.get(1).map_err(|err| store_err(&err))?;
    let description: String = row.get(2).map_err(|err| store_err(&err))?;
    let date: String = row.get(3).map_err(|err| store_err(&err))?;
    let time: String = row.get(4).map_err(|err| store_err(&err))?;
    let max_seats: u32 = row.get(5).map_err(|err| store_err(&err))?;
    let current_seats: u32 = row.get(6).map_err(|err| store_err(&err))?;
    let price: i64 = row.get(7).map_err(|err| store_err(&err))?;
    let is_virtual: i64 = row.get(8).map_err(|err| store_err(&err))?;
    let created_at: String = row.get(9).map_err(|err| store_err(&err))?;
    let updated_at: String = row.get(10).map_err(|err| store_err(&err))?;

    Ok(Event {
        id: EventId::new(id).map_err(|err| store_err(&err))?,
        title,
        description,
        date: from_date_string(&date).map_err(|err| store_err(&err))?,
        time,
        max_seats,
        current_seats,
        price,
        is_virtual: is_virtual != 0,
        created_at: from_rfc3339(&created_at).map_err(|err| store_err(&err))?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| store_err(&err))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use chrono::NaiveDate;

    fn input(title: &str, date: NaiveDate, max_seats: u32) -> CreateEventInput {
        CreateEventInput {
            title: title.to_string(),
            description: "desc".to_string(),
            date,
            time: "15:00 EST".to_string(),
            max_seats,
            price: 500,
            is_virtual: true,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
        let created = repo.create(input("UX Trends", date, 200)).unwrap();
        let fetched = repo.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.current_seats, 0);
    }

    #[test]
    fn list_orders_by_date_ascending() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        let later = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
        repo.create(input("later", later, 10)).unwrap();
        repo.create(input("earlier", earlier, 10)).unwrap();
        let events = repo.list(EventFilter::default()).unwrap();
        assert_eq!(events[0].title, "earlier");
        assert_eq!(events[1].title, "later");
    }

    #[test]
    fn take_seat_stops_at_capacity() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
        let event = repo.create(input("tiny", date, 2)).unwrap();
        assert!(repo.take_seat(&event.id).unwrap());
        assert!(repo.take_seat(&event.id).unwrap());
        assert!(!repo.take_seat(&event.id).unwrap());
        let seats = repo.seats(&event.id).unwrap().unwrap();
        assert_eq!(seats.current_seats, 2);
    }

    #[test]
    fn take_seat_on_missing_event_is_not_found() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        let err = repo.take_seat(&EventId::generate()).unwrap_err();
        assert!(matches!(err, EventError::NotFound));
    }

    #[test]
    fn update_cannot_shrink_below_taken_seats() {
        let conn = with_test_db().unwrap();
        let repo = EventRepo::new(&conn);
        let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
        let event = repo.create(input("shrink", date, 5)).unwrap();
        repo.take_seat(&event.id).unwrap();
        repo.take_seat(&event.id).unwrap();
        let update = UpdateEventInput {
            title: None,
            description: None,
            date: None,
            time: None,
            max_seats: Some(1),
            price: None,
            is_virtual: None,
        };
        let err = repo.update(&event.id, update).unwrap_err();
        assert!(matches!(err, EventError::InvalidInput { .. }));
    }
}
