pub mod config;
pub mod core;
pub mod progress;
pub mod records;
pub mod schema;
pub mod tables;
