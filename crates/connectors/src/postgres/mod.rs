pub mod adapter;
pub mod encoder;
pub mod params;
pub mod row;
pub mod utils;
