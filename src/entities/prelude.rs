pub use super::bookings::Entity as Bookings;
pub use super::shows::Entity as Shows;
pub use super::theaters::Entity as Theaters;
pub use super::users::Entity as Users;
