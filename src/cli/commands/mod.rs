mod catalog;
mod seed;
mod users;

pub use catalog::{cmd_list_shows, cmd_list_theaters};
pub use seed::cmd_seed;
pub use users::cmd_create_user;
