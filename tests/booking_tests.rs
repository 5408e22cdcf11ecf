//! Booking ledger behaviour against a real SQLite file.

use chrono::NaiveDate;
use marquee::config::Config;
use marquee::models::user::Role;
use marquee::services::{BookingError, BookingService};
use marquee::state::SharedState;
use std::sync::Arc;

fn test_config(allow_multiple: bool) -> Config {
    let db_path =
        std::env::temp_dir().join(format!("marquee-booking-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.booking.allow_multiple_per_user = allow_multiple;
    config
}

async fn setup(allow_multiple: bool) -> SharedState {
    SharedState::new(test_config(allow_multiple))
        .await
        .expect("failed to create state")
}

async fn add_user(state: &SharedState, email: &str) -> i32 {
    state
        .auth_service
        .register(email, "secret", Role::User)
        .await
        .expect("failed to register user")
}

async fn add_show(state: &SharedState, capacity: i32) -> (i32, i32) {
    let theater_id = state
        .booking_service
        .create_theater("Main Hall", capacity)
        .await
        .expect("failed to create theater");

    let date = NaiveDate::from_ymd_opt(2023, 11, 30)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap();
    let show_id = state
        .booking_service
        .create_show("Opening Night", theater_id, date, "Premiere")
        .await
        .expect("failed to create show");

    (theater_id, show_id)
}

#[tokio::test]
async fn test_available_seats_of_fresh_show_is_capacity() {
    let state = setup(true).await;
    let (_, show_id) = add_show(&state, 100).await;

    assert_eq!(
        state.booking_service.available_seats(show_id).await.unwrap(),
        100
    );
    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 0);

    let details = state.booking_service.get_show_details(show_id).await.unwrap();
    assert_eq!(details.theater_name, "Main Hall");
    assert_eq!(details.capacity, 100);
    assert_eq!(details.available, 100);
    assert!(!details.is_full());
}

#[tokio::test]
async fn test_capacity_one_scenario() {
    let state = setup(true).await;
    let user_a = add_user(&state, "a@example.com").await;
    let user_b = add_user(&state, "b@example.com").await;
    let (_, show_id) = add_show(&state, 1).await;

    let booking_a = state.booking_service.book(show_id, user_a).await.unwrap();

    let rejected = state.booking_service.book(show_id, user_b).await;
    assert!(matches!(
        rejected,
        Err(BookingError::CapacityExceeded { show_id: s, capacity: 1 }) if s == show_id
    ));
    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 1);

    state.booking_service.cancel_booking(booking_a).await.unwrap();

    let booking_b = state.booking_service.book(show_id, user_b).await.unwrap();
    let booking = state
        .booking_service
        .get_booking(booking_b)
        .await
        .unwrap()
        .expect("booking should exist");
    assert_eq!(booking.user_id, user_b);
    assert_eq!(booking.show_id, show_id);
}

#[tokio::test]
async fn test_zero_capacity_rejects_everything() {
    let state = setup(true).await;
    let user = add_user(&state, "a@example.com").await;
    let (_, show_id) = add_show(&state, 0).await;

    assert!(matches!(
        state.booking_service.book(show_id, user).await,
        Err(BookingError::CapacityExceeded { .. })
    ));
    assert_eq!(state.booking_service.available_seats(show_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_bookings_never_exceed_capacity() {
    let state = Arc::new(setup(true).await);
    let mut users = Vec::new();
    for i in 0..4 {
        users.push(add_user(&state, &format!("user{i}@example.com")).await);
    }
    let (_, show_id) = add_show(&state, 5).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = state.booking_service.clone();
        let user = users[i % users.len()];
        handles.push(tokio::spawn(
            async move { service.book(show_id, user).await },
        ));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(BookingError::CapacityExceeded { .. }) => rejected += 1,
            Err(e) => panic!("unexpected booking error: {e}"),
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(rejected, 15);
    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 5);
    assert_eq!(state.booking_service.available_seats(show_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_capacity_holds_across_independent_service_instances() {
    // Two services over one database share no in-process lock, so only the
    // conditional insert stands between them and an overbooked show.
    let first = setup(true).await;
    let config = first.config().await;
    let second = SharedState::with_store(config, first.store.clone());

    let user = add_user(&first, "a@example.com").await;
    let (_, show_id) = add_show(&first, 3).await;

    let services: [Arc<dyn BookingService>; 2] =
        [first.booking_service.clone(), second.booking_service.clone()];

    let mut handles = Vec::new();
    for i in 0..12 {
        let service = services[i % 2].clone();
        handles.push(tokio::spawn(
            async move { service.book(show_id, user).await },
        ));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 3);
    assert_eq!(first.booking_service.count_bookings(show_id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_cancel_booking_is_idempotent() {
    let state = setup(true).await;
    let user = add_user(&state, "a@example.com").await;
    let (_, show_id) = add_show(&state, 10).await;

    let keep = state.booking_service.book(show_id, user).await.unwrap();
    let cancel = state.booking_service.book(show_id, user).await.unwrap();

    state.booking_service.cancel_booking(cancel).await.unwrap();
    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 1);

    state.booking_service.cancel_booking(cancel).await.unwrap();
    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 1);

    state.booking_service.cancel_booking(9999).await.unwrap();
    assert!(state.booking_service.get_booking(keep).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_show_removes_show_and_bookings() {
    let state = setup(true).await;
    let user_a = add_user(&state, "a@example.com").await;
    let user_b = add_user(&state, "b@example.com").await;
    let (theater_id, show_id) = add_show(&state, 10).await;
    let (_, other_show) = add_show(&state, 10).await;

    let booking = state.booking_service.book(show_id, user_a).await.unwrap();
    state.booking_service.book(show_id, user_b).await.unwrap();
    state.booking_service.book(other_show, user_a).await.unwrap();

    assert!(state.booking_service.delete_show(show_id).await.unwrap());

    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 0);
    assert!(state.booking_service.get_booking(booking).await.unwrap().is_none());
    assert!(matches!(
        state.booking_service.get_show(show_id).await,
        Err(BookingError::UnknownShow(_))
    ));
    assert!(
        state
            .booking_service
            .list_shows(Some(theater_id))
            .await
            .unwrap()
            .iter()
            .all(|s| s.id != show_id)
    );

    // Other shows keep their bookings
    assert_eq!(
        state.booking_service.count_bookings(other_show).await.unwrap(),
        1
    );

    // Deleting again reports nothing removed
    assert!(!state.booking_service.delete_show(show_id).await.unwrap());
}

#[tokio::test]
async fn test_unknown_references() {
    let state = setup(true).await;
    let user = add_user(&state, "a@example.com").await;
    let date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap();

    assert!(matches!(
        state
            .booking_service
            .create_show("Ghost Show", 42, date, "")
            .await,
        Err(BookingError::UnknownTheater(42))
    ));
    assert!(matches!(
        state.booking_service.book(42, user).await,
        Err(BookingError::UnknownShow(42))
    ));
    assert!(matches!(
        state.booking_service.available_seats(42).await,
        Err(BookingError::UnknownShow(42))
    ));
    assert!(matches!(
        state.booking_service.get_theater(42).await,
        Err(BookingError::UnknownTheater(42))
    ));
    assert!(matches!(
        state.booking_service.spectators_of(42).await,
        Err(BookingError::UnknownShow(42))
    ));
}

#[tokio::test]
async fn test_theater_validation() {
    let state = setup(true).await;

    assert!(matches!(
        state.booking_service.create_theater("ab", 10).await,
        Err(BookingError::Validation(_))
    ));
    assert!(matches!(
        state.booking_service.create_theater("Main Hall", -1).await,
        Err(BookingError::Validation(_))
    ));

    // Names need not be unique
    let a = state.booking_service.create_theater("Main Hall", 10).await.unwrap();
    let b = state.booking_service.create_theater("Main Hall", 20).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_multiple_bookings_per_user_allowed_by_default() {
    let state = setup(true).await;
    let user = add_user(&state, "a@example.com").await;
    let (_, show_id) = add_show(&state, 3).await;

    state.booking_service.book(show_id, user).await.unwrap();
    state.booking_service.book(show_id, user).await.unwrap();

    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_single_booking_per_user_when_disabled() {
    let state = setup(false).await;
    let user_a = add_user(&state, "a@example.com").await;
    let user_b = add_user(&state, "b@example.com").await;
    let (_, show_id) = add_show(&state, 3).await;

    state.booking_service.book(show_id, user_a).await.unwrap();
    assert!(matches!(
        state.booking_service.book(show_id, user_a).await,
        Err(BookingError::AlreadyBooked { user_id, .. }) if user_id == user_a
    ));

    state.booking_service.book(show_id, user_b).await.unwrap();
    assert_eq!(state.booking_service.count_bookings(show_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_listings_are_ordered_and_joined() {
    let state = setup(true).await;
    let user = add_user(&state, "viewer@example.com").await;
    let (theater_id, first) = add_show(&state, 10).await;
    let (_, second) = add_show(&state, 2).await;

    state.booking_service.book(second, user).await.unwrap();
    state.booking_service.book(first, user).await.unwrap();

    let theaters = state.booking_service.list_theaters().await.unwrap();
    assert!(theaters.windows(2).all(|w| w[0].id < w[1].id));

    let shows = state.booking_service.list_show_details(None).await.unwrap();
    assert_eq!(shows.iter().map(|s| s.id).collect::<Vec<_>>(), vec![first, second]);
    assert_eq!(shows[1].booked, 1);
    assert_eq!(shows[1].available, 1);

    let only_first = state
        .booking_service
        .list_show_details(Some(theater_id))
        .await
        .unwrap();
    assert_eq!(only_first.len(), 1);
    assert_eq!(only_first[0].id, first);

    let bookings = state.booking_service.list_bookings(user).await.unwrap();
    assert_eq!(bookings.len(), 2);
    assert!(bookings[0].id < bookings[1].id);
    assert_eq!(bookings[0].show_id, second);
    assert_eq!(bookings[0].theater_name, "Main Hall");
    assert_eq!(bookings[0].show_name, "Opening Night");

    let spectators = state.booking_service.spectators_of(first).await.unwrap();
    assert_eq!(spectators.len(), 1);
    assert_eq!(spectators[0].email, "viewer@example.com");
    assert_eq!(spectators[0].user_id, user);
}

#[tokio::test]
async fn test_seed_demo_data_runs_once() {
    let state = setup(true).await;

    let summary = marquee::services::seed_demo_data(
        state.auth_service.as_ref(),
        state.booking_service.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(summary.users, 3);
    assert_eq!(summary.theaters, 4);
    assert_eq!(summary.shows, 5);

    let again = marquee::services::seed_demo_data(
        state.auth_service.as_ref(),
        state.booking_service.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(again, marquee::services::SeedSummary::default());

    let shows = state.booking_service.list_show_details(None).await.unwrap();
    assert_eq!(shows.len(), 5);
    assert_eq!(shows[4].capacity, 1_000_000);

    let manager = state
        .auth_service
        .authenticate("user3@example.com", "secret3", None)
        .await
        .unwrap();
    assert!(manager.is_manager());
}
