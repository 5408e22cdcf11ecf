pub mod prelude;

pub mod bookings;
pub mod shows;
pub mod theaters;
pub mod users;
