pub mod config;
pub mod field;
