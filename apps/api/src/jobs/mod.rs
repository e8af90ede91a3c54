pub mod handlers;
pub mod posting;
pub mod search;
