//! # WBID Common Library
//!
//! Shared code for the wetland bird identification service including:
//! - Database initialization, models and queries (species catalog,
//!   pending observations, admins, settings)
//! - Bootstrap configuration loading
//! - Scientific name normalization
//! - Admin password hashing and session tokens

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod names;

pub use error::{Error, Result};
