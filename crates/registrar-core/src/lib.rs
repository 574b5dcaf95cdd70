pub mod changes;
pub mod error;
pub mod events;
pub mod registrar;
pub mod registrations;
pub mod sessions;
pub mod store;
pub mod validation;

pub mod types;

pub use crate::error::RegistrarError;
pub use crate::registrar::{Registrar, RequestContext};
pub use crate::store::Store;
