//! HTTP API handlers for wbid-web

pub mod about;
pub mod admin;
pub mod health;
pub mod identify;
pub mod session;
pub mod species;
pub mod ui;

pub use health::health_routes;
