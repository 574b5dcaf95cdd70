use crate::types::ids::EventId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Display string such as "15:00 EST"; the store never interprets it.
    pub time: String,
    pub max_seats: u32,
    pub current_seats: u32,
    pub price: i64,
    pub is_virtual: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.current_seats >= self.max_seats
    }

    pub fn seats_remaining(&self) -> u32 {
        self.max_seats.saturating_sub(self.current_seats)
    }
}

/// The two counters the registration guard reads before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeatCount {
    pub current_seats: u32,
    pub max_seats: u32,
}

impl SeatCount {
    pub fn is_full(&self) -> bool {
        self.current_seats >= self.max_seats
    }
}
