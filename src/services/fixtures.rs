//! Demo data for a fresh database (`marquee seed`).

use chrono::NaiveDateTime;
use tracing::info;

use crate::constants::SHOW_DATE_FORMAT;
use crate::models::user::Role;
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::booking_service::BookingService;

const USERS: &[(&str, &str, Role)] = &[
    ("user@example.com", "secret", Role::User),
    ("user2@example.com", "secret2", Role::User),
    ("user3@example.com", "secret3", Role::Manager),
];

const THEATERS: &[(&str, i32)] = &[
    ("Petite salle", 50),
    ("Salle moyenne", 150),
    ("Grande salle", 500),
    ("\"Petite\" salle", 1_000_000),
];

/// (name, index into `THEATERS`, date, description)
const SHOWS: &[(&str, usize, &str, &str)] = &[
    ("Spectacle 1", 0, "2023-11-30 21:00:00", "Descriptif 1"),
    ("Spectacle 2", 1, "2023-11-30 21:00:00", "Descriptif 2"),
    ("Spectacle 3", 0, "2023-11-30 22:00:00", "Descriptif 3"),
    ("Spectacle 4", 2, "2023-11-30 22:00:00", "Descriptif 4"),
    (
        "Spectacle \"quelconque\"",
        3,
        "2023-11-30 22:00:00",
        "Bienvenue dans ce \"banal\" spectacle, avec rien de surprenant...",
    ),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub theaters: usize,
    pub shows: usize,
}

/// Inserts the demo users, theaters and shows.
///
/// Users whose email already exists are skipped. Theaters and shows are only
/// created when the database has no theaters yet, so seeding twice does not
/// duplicate the catalogue.
pub async fn seed_demo_data(
    auth: &dyn AuthService,
    booking: &dyn BookingService,
) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for (email, password, role) in USERS {
        match auth.register(email, password, *role).await {
            Ok(_) => summary.users += 1,
            Err(AuthError::DuplicateEmail) => info!("Demo user already exists: {}", email),
            Err(e) => return Err(e.into()),
        }
    }

    if !booking.list_theaters().await?.is_empty() {
        info!("Theaters already present, skipping demo catalogue");
        return Ok(summary);
    }

    let mut theater_ids = Vec::with_capacity(THEATERS.len());
    for (name, capacity) in THEATERS {
        theater_ids.push(booking.create_theater(name, *capacity).await?);
        summary.theaters += 1;
    }

    for (name, theater, date, description) in SHOWS {
        let date = NaiveDateTime::parse_from_str(date, SHOW_DATE_FORMAT)?;
        booking
            .create_show(name, theater_ids[*theater], date, description)
            .await?;
        summary.shows += 1;
    }

    info!(
        users = summary.users,
        theaters = summary.theaters,
        shows = summary.shows,
        "Seeded demo data"
    );
    Ok(summary)
}
