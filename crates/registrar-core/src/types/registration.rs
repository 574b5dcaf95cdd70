use crate::types::enums::RegistrationStatus;
use crate::types::ids::{EventId, RegistrationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Registration {
    pub id: RegistrationId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}
