use crate::types::event::Event;
use crate::types::ids::EventId;
use crate::types::registration::Registration;
use registrar_feed::types::{ChangeOp, ChangeTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Typed payload of a change before it is flattened into a
/// `ChangeRecord` for the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum ChangeBody {
    EventCreated { event: Event },
    EventUpdated { event: Event },
    EventDeleted { event_id: EventId },
    RegistrationCreated { registration: Registration },
}

impl ChangeBody {
    pub fn table(&self) -> ChangeTable {
        match self {
            Self::EventCreated { .. } | Self::EventUpdated { .. } | Self::EventDeleted { .. } => {
                ChangeTable::Events
            }
            Self::RegistrationCreated { .. } => ChangeTable::Registrations,
        }
    }

    pub fn op(&self) -> ChangeOp {
        match self {
            Self::EventCreated { .. } | Self::RegistrationCreated { .. } => ChangeOp::Created,
            Self::EventUpdated { .. } => ChangeOp::Updated,
            Self::EventDeleted { .. } => ChangeOp::Deleted,
        }
    }

    /// The affected row as subscribers see it. Deletes carry only the id.
    pub fn into_row(self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::EventCreated { event } | Self::EventUpdated { event } => {
                serde_json::to_value(event)
            }
            Self::EventDeleted { event_id } => Ok(serde_json::json!({ "id": event_id })),
            Self::RegistrationCreated { registration } => serde_json::to_value(registration),
        }
    }
}
