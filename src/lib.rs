//! courses-api - REST API for users and the courses they own
//!
//! This is the library interface, allowing the router and stores to be
//! embedded or driven directly from tests.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::Error;
pub use store::Stores;
