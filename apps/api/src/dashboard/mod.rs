pub mod feed;
pub mod handlers;
pub mod stats;
