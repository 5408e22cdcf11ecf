pub mod totp;

pub mod show_locks;
pub use show_locks::ShowLocks;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;

pub mod booking_service;
pub mod booking_service_impl;
pub use booking_service::{BookingError, BookingService};
pub use booking_service_impl::SeaOrmBookingService;

pub mod fixtures;
pub use fixtures::{SeedSummary, seed_demo_data};
