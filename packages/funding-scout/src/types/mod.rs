pub mod config;
pub mod field;
pub mod record;
