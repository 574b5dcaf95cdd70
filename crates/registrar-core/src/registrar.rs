use crate::changes::ChangeRepository;
use crate::error::{EventError, RegistrarError, RegistrationError, SessionError};
use crate::events::EventRepository;
use crate::registrations::RegistrationRepository;
use crate::sessions::SessionRepository;
use crate::store::Store;
use crate::types::{
    ChangeBody, CreateEventInput, Event, EventFilter, EventId, OpenedSession, Registration,
    RegistrationStatus, Session, UpdateEventInput, UserId,
};
use crate::validation::{validate_event_input, validate_event_update};
use chrono::{Duration, Utc};
use registrar_feed::bus::ChangeBus;
use registrar_feed::types::{ChangeRecord, ChangeSource, ChangeTable};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: ChangeSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: ChangeSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }
}

/// Single configured handle to the store, constructed once at startup
/// and shared by every caller.
pub struct Registrar<S: Store> {
    store: S,
    bus: ChangeBus,
}

impl<S: Store> Registrar<S> {
    pub fn new(store: S, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn registrations(&self) -> RegistrationsApi<'_, S> {
        RegistrationsApi { core: self }
    }

    pub fn sessions(&self) -> SessionsApi<'_, S> {
        SessionsApi { core: self }
    }

    pub fn changes(&self) -> ChangesApi<'_, S> {
        ChangesApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    fn resolve_identity(&self, token: Option<&str>) -> Result<Option<UserId>, RegistrarError> {
        let Some(token) = token else {
            return Ok(None);
        };
        let session = self.store.sessions().resolve(token)?;
        Ok(session.map(|session| session.user_id))
    }

    /// Run `f` in one transaction, append the changes it reports, and
    /// publish them on the bus after the commit lands.
    fn with_changes<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<ChangeBody>), RegistrarError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_change_record(ctx, body)?;
                let record = store.changes().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.bus.publish(record);
        }
        Ok(value)
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Registrar<S>,
}

impl<'a, S: Store> EventsApi<'a, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        input: CreateEventInput,
    ) -> Result<Event, RegistrarError> {
        validate_event_input(&input)?;
        self.core.with_changes(ctx, |store| {
            let event = store.events().create(input)?;
            Ok((
                event.clone(),
                vec![ChangeBody::EventCreated { event }],
            ))
        })
    }

    pub fn get(&self, id: &EventId) -> Result<Option<Event>, RegistrarError> {
        self.core.store.events().get(id).map_err(RegistrarError::from)
    }

    pub fn list(&self, filter: EventFilter) -> Result<Vec<Event>, RegistrarError> {
        self.core
            .store
            .events()
            .list(filter)
            .map_err(RegistrarError::from)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &EventId,
        input: UpdateEventInput,
    ) -> Result<Event, RegistrarError> {
        validate_event_update(&input)?;
        self.core.with_changes(ctx, |store| {
            let event = store.events().update(id, input)?;
            Ok((
                event.clone(),
                vec![ChangeBody::EventUpdated { event }],
            ))
        })
    }

    pub fn delete(&self, ctx: &RequestContext, id: &EventId) -> Result<(), RegistrarError> {
        self.core.with_changes(ctx, |store| {
            store.events().delete(id)?;
            Ok((
                (),
                vec![ChangeBody::EventDeleted {
                    event_id: id.clone(),
                }],
            ))
        })
    }
}

pub struct RegistrationsApi<'a, S: Store> {
    core: &'a Registrar<S>,
}

impl<'a, S: Store> RegistrationsApi<'a, S> {
    /// The registration guard. Checks run in order: identity, prior
    /// registration, capacity; then the seat take and the insert commit
    /// together in one transaction, so the application-level checks are
    /// only a fast path for user messaging.
    pub fn register(
        &self,
        ctx: &RequestContext,
        token: Option<&str>,
        event_id: &EventId,
    ) -> Result<Registration, RegistrarError> {
        let Some(user_id) = self.core.resolve_identity(token)? else {
            return Err(RegistrationError::Unauthenticated.into());
        };

        let existing = self
            .core
            .store
            .registrations()
            .find(&user_id, event_id)?;
        if existing.is_some() {
            return Err(RegistrationError::AlreadyRegistered.into());
        }

        let seats = self
            .core
            .store
            .events()
            .seats(event_id)
            .map_err(seat_lookup_error)?;
        let Some(seats) = seats else {
            return Err(RegistrationError::EventNotFound.into());
        };
        if seats.is_full() {
            return Err(RegistrationError::EventFull.into());
        }

        self.core.with_changes(ctx, |store| {
            let taken = store.events().take_seat(event_id).map_err(seat_lookup_error)?;
            if !taken {
                return Err(RegistrationError::EventFull.into());
            }
            let registration =
                store
                    .registrations()
                    .create(&user_id, event_id, RegistrationStatus::Confirmed)?;
            let event = store
                .events()
                .get(event_id)
                .map_err(seat_lookup_error)?
                .ok_or(RegistrationError::EventNotFound)?;
            Ok((
                registration.clone(),
                vec![
                    ChangeBody::RegistrationCreated { registration },
                    ChangeBody::EventUpdated { event },
                ],
            ))
        })
    }

    /// Companion read: the caller's registration for an event, absent
    /// (not an error) when unauthenticated or unregistered.
    pub fn registration(
        &self,
        token: Option<&str>,
        event_id: &EventId,
    ) -> Result<Option<Registration>, RegistrarError> {
        let Some(user_id) = self.core.resolve_identity(token)? else {
            return Ok(None);
        };
        self.core
            .store
            .registrations()
            .find(&user_id, event_id)
            .map_err(RegistrarError::from)
    }

    pub fn list_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<Registration>, RegistrarError> {
        self.core
            .store
            .registrations()
            .list_for_event(event_id)
            .map_err(RegistrarError::from)
    }
}

pub struct SessionsApi<'a, S: Store> {
    core: &'a Registrar<S>,
}

impl<'a, S: Store> SessionsApi<'a, S> {
    pub fn open(&self, user_id: &UserId, ttl: Duration) -> Result<OpenedSession, RegistrarError> {
        if ttl <= Duration::zero() {
            return Err(SessionError::InvalidInput {
                message: "ttl must be positive".to_string(),
            }
            .into());
        }
        self.core
            .store
            .sessions()
            .open(user_id, ttl)
            .map_err(RegistrarError::from)
    }

    pub fn current(&self, token: Option<&str>) -> Result<Option<Session>, RegistrarError> {
        let Some(token) = token else {
            return Ok(None);
        };
        self.core
            .store
            .sessions()
            .resolve(token)
            .map_err(RegistrarError::from)
    }

    pub fn close(&self, token: &str) -> Result<(), RegistrarError> {
        self.core
            .store
            .sessions()
            .revoke(token)
            .map_err(RegistrarError::from)
    }
}

pub struct ChangesApi<'a, S: Store> {
    core: &'a Registrar<S>,
}

impl<'a, S: Store> ChangesApi<'a, S> {
    pub fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
        table: Option<ChangeTable>,
    ) -> Result<Vec<ChangeRecord>, RegistrarError> {
        self.core.store.changes().list(after, limit, table)
    }
}

fn build_change_record(
    ctx: &RequestContext,
    body: ChangeBody,
) -> Result<ChangeRecord, RegistrarError> {
    let table = body.table();
    let op = body.op();
    let row = body.into_row().map_err(|err| RegistrarError::Internal {
        message: err.to_string(),
    })?;
    Ok(ChangeRecord {
        // id and seq are assigned by the change repo on append
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        table,
        op,
        body: row,
    })
}

fn seat_lookup_error(err: EventError) -> RegistrarError {
    match err {
        EventError::NotFound => RegistrationError::EventNotFound.into(),
        EventError::InvalidInput { message } => {
            RegistrationError::InvalidInput { message }.into()
        }
        EventError::Store { message } => RegistrationError::Store { message }.into(),
    }
}
