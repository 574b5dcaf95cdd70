pub mod change;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod registration;
pub mod session;

pub use change::ChangeBody;
pub use enums::RegistrationStatus;
pub use event::{Event, SeatCount};
pub use ids::{EventId, IdError, RegistrationId, SessionId, UserId};
pub use io::{CreateEventInput, EventFilter, UpdateEventInput};
pub use registration::Registration;
pub use session::{OpenedSession, Session};
