use chrono::{Duration, NaiveDate};
use registrar_core::error::{RegistrarError, RegistrationError};
use registrar_core::types::{CreateEventInput, EventId, RegistrationStatus, UserId};
use registrar_core::{Registrar, RequestContext};
use registrar_db::schema::with_test_db;
use registrar_db::store::DbStore;
use registrar_feed::bus::ChangeBus;
use registrar_feed::types::{ChangeOp, ChangeSource, ChangeTable};
use std::str::FromStr;

fn registrar() -> Registrar<DbStore> {
    let store = DbStore::new(with_test_db().unwrap());
    Registrar::new(store, ChangeBus::new(64))
}

fn ctx() -> RequestContext {
    RequestContext::new(ChangeSource::Api, Some("corr_test".to_string()))
}

fn seed_event(registrar: &Registrar<DbStore>, max_seats: u32) -> EventId {
    let event = registrar
        .events()
        .create(
            &ctx(),
            CreateEventInput {
                title: "UX Trends Workshop".to_string(),
                description: "A look ahead.".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
                time: "15:00 EST".to_string(),
                max_seats,
                price: 500,
                is_virtual: true,
            },
        )
        .unwrap();
    event.id
}

fn set_current_seats(registrar: &Registrar<DbStore>, event_id: &EventId, seats: u32) {
    registrar
        .store()
        .connection()
        .execute(
            "UPDATE events SET current_seats = ?1 WHERE id = ?2",
            (seats, event_id.as_str()),
        )
        .unwrap();
}

fn open_session(registrar: &Registrar<DbStore>, user: &str) -> String {
    let user_id = UserId::from_str(user).unwrap();
    registrar
        .sessions()
        .open(&user_id, Duration::hours(8))
        .unwrap()
        .token
}

#[test]
fn register_with_one_seat_left_succeeds() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 200);
    set_current_seats(&registrar, &event_id, 199);
    let token = open_session(&registrar, "usr-u1");

    let registration = registrar
        .registrations()
        .register(&ctx(), Some(&token), &event_id)
        .unwrap();

    assert_eq!(registration.event_id, event_id);
    assert_eq!(registration.user_id, UserId::from_str("usr-u1").unwrap());
    assert_eq!(registration.status, RegistrationStatus::Confirmed);

    let event = registrar.events().get(&event_id).unwrap().unwrap();
    assert_eq!(event.current_seats, 200);
    let roster = registrar.registrations().list_for_event(&event_id).unwrap();
    assert_eq!(roster.len(), 1);
}

#[test]
fn register_on_full_event_fails_without_insert() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 200);
    set_current_seats(&registrar, &event_id, 200);
    let token = open_session(&registrar, "usr-u1");

    let err = registrar
        .registrations()
        .register(&ctx(), Some(&token), &event_id)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::Registration(RegistrationError::EventFull)
    ));

    let roster = registrar.registrations().list_for_event(&event_id).unwrap();
    assert!(roster.is_empty());
    let event = registrar.events().get(&event_id).unwrap().unwrap();
    assert_eq!(event.current_seats, 200);
}

#[test]
fn second_register_for_same_pair_fails() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 10);
    let token = open_session(&registrar, "usr-u1");

    registrar
        .registrations()
        .register(&ctx(), Some(&token), &event_id)
        .unwrap();
    let err = registrar
        .registrations()
        .register(&ctx(), Some(&token), &event_id)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::Registration(RegistrationError::AlreadyRegistered)
    ));

    let roster = registrar.registrations().list_for_event(&event_id).unwrap();
    assert_eq!(roster.len(), 1);
    let event = registrar.events().get(&event_id).unwrap().unwrap();
    assert_eq!(event.current_seats, 1);
}

#[test]
fn register_against_unknown_event_fails() {
    let registrar = registrar();
    let token = open_session(&registrar, "usr-u1");
    let err = registrar
        .registrations()
        .register(&ctx(), Some(&token), &EventId::generate())
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::Registration(RegistrationError::EventNotFound)
    ));
}

#[test]
fn unauthenticated_register_fails_and_lookup_is_absent() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 10);

    let err = registrar
        .registrations()
        .register(&ctx(), None, &event_id)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::Registration(RegistrationError::Unauthenticated)
    ));

    assert_eq!(
        registrar
            .registrations()
            .registration(None, &event_id)
            .unwrap(),
        None
    );
    // a stale token behaves the same as no token
    assert_eq!(
        registrar
            .registrations()
            .registration(Some("tok_bogus"), &event_id)
            .unwrap(),
        None
    );
    assert!(registrar
        .registrations()
        .list_for_event(&event_id)
        .unwrap()
        .is_empty());
}

#[test]
fn registration_lookup_finds_own_record_only() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 10);
    let alice = open_session(&registrar, "usr-alice");
    let bob = open_session(&registrar, "usr-bob");

    let created = registrar
        .registrations()
        .register(&ctx(), Some(&alice), &event_id)
        .unwrap();

    assert_eq!(
        registrar
            .registrations()
            .registration(Some(&alice), &event_id)
            .unwrap(),
        Some(created)
    );
    assert_eq!(
        registrar
            .registrations()
            .registration(Some(&bob), &event_id)
            .unwrap(),
        None
    );
}

#[test]
fn successful_register_publishes_and_records_changes() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 10);
    let token = open_session(&registrar, "usr-u1");

    let mut receiver = registrar.bus().subscribe();
    registrar
        .registrations()
        .register(&ctx(), Some(&token), &event_id)
        .unwrap();

    let first = receiver.try_recv().unwrap();
    assert_eq!(first.table, ChangeTable::Registrations);
    assert_eq!(first.op, ChangeOp::Created);
    let second = receiver.try_recv().unwrap();
    assert_eq!(second.table, ChangeTable::Events);
    assert_eq!(second.op, ChangeOp::Updated);

    // and the same records are replayable from the log
    let recorded = registrar
        .changes()
        .list(None, None, Some(ChangeTable::Registrations))
        .unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].correlation_id.as_deref(), Some("corr_test"));
}

#[test]
fn failed_register_leaves_no_change_records() {
    let registrar = registrar();
    let event_id = seed_event(&registrar, 1);
    set_current_seats(&registrar, &event_id, 1);
    let token = open_session(&registrar, "usr-u1");

    registrar
        .registrations()
        .register(&ctx(), Some(&token), &event_id)
        .unwrap_err();

    let recorded = registrar
        .changes()
        .list(None, None, Some(ChangeTable::Registrations))
        .unwrap();
    assert!(recorded.is_empty());
}
