//! Menu-driven client for the music database.
//!
//! The interesting part is the script interpreter: [`script`] splits a SQL
//! file into statements, [`executor`] runs them one at a time and [`render`]
//! prints query results as fixed-width tables. The remaining modules are the
//! connection, configuration and menu plumbing around it.

pub mod config;
pub mod connection;
pub mod console;
pub mod error;
pub mod executor;
pub mod menu;
pub mod music;
pub mod render;
pub mod script;

pub use error::{Error, Result};
