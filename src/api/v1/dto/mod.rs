pub mod comments;
pub mod films;
pub mod users;
