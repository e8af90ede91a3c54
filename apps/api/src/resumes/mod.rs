pub mod handlers;
pub mod library;
