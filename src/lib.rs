pub mod config;
pub mod fleet;
pub mod models;
pub mod search;
