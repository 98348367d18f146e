pub mod batch;
pub mod error;
pub mod extract;
pub mod progress;
pub mod statements;
