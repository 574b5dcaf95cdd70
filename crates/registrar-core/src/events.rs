use crate::error::EventError;
use crate::types::{CreateEventInput, Event, EventFilter, EventId, SeatCount, UpdateEventInput};

pub trait EventRepository {
    fn create(&self, input: CreateEventInput) -> Result<Event, EventError>;
    fn get(&self, id: &EventId) -> Result<Option<Event>, EventError>;
    /// Point lookup of the capacity counters only.
    fn seats(&self, id: &EventId) -> Result<Option<SeatCount>, EventError>;
    fn list(&self, filter: EventFilter) -> Result<Vec<Event>, EventError>;
    fn update(&self, id: &EventId, input: UpdateEventInput) -> Result<Event, EventError>;
    fn delete(&self, id: &EventId) -> Result<(), EventError>;
    /// Atomically claim one seat: succeeds only while
    /// `current_seats < max_seats`. Returns false when the event is
    /// full, `NotFound` when it does not exist.
    fn take_seat(&self, id: &EventId) -> Result<bool, EventError>;
}
