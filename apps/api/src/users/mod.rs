pub mod handlers;
pub mod recent_searches;
pub mod store;
