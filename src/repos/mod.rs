pub mod comment_repo;
pub mod error;
pub mod film_repo;
pub mod user_repo;
