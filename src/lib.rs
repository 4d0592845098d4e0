pub mod categories;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod expenses;
pub mod models;
pub mod routes;
pub mod utils;
