use crate::changes::ChangeRepository;
use crate::events::EventRepository;
use crate::registrations::RegistrationRepository;
use crate::sessions::SessionRepository;
use crate::RegistrarError;

pub trait Store {
    type Events<'a>: EventRepository
    where
        Self: 'a;
    type Registrations<'a>: RegistrationRepository
    where
        Self: 'a;
    type Sessions<'a>: SessionRepository
    where
        Self: 'a;
    type Changes<'a>: ChangeRepository
    where
        Self: 'a;

    fn events(&self) -> Self::Events<'_>;
    fn registrations(&self) -> Self::Registrations<'_>;
    fn sessions(&self) -> Self::Sessions<'_>;
    fn changes(&self) -> Self::Changes<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&Self) -> Result<T, RegistrarError>;
}
