pub mod booking;
pub mod show;
pub mod theater;
pub mod user;
