pub mod apply;
pub mod handlers;
