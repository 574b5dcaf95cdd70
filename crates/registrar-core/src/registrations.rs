use crate::error::RegistrationError;
use crate::types::{EventId, Registration, RegistrationStatus, UserId};

pub trait RegistrationRepository {
    /// Insert a new registration. A unique-constraint conflict on
    /// (user_id, event_id) surfaces as `AlreadyRegistered`.
    fn create(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        status: RegistrationStatus,
    ) -> Result<Registration, RegistrationError>;
    fn find(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<Registration>, RegistrationError>;
    fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Registration>, RegistrationError>;
}
