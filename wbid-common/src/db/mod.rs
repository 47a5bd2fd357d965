//! Database access: schema initialization, models and per-table queries

pub mod admins;
pub mod init;
pub mod models;
pub mod pending;
pub mod settings;
pub mod species;

pub use init::init_database;
pub use models::*;
