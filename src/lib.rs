pub mod common;
pub mod config;
pub mod database;
pub mod errors;
pub mod services;
