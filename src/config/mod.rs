//! Configuration module for the mod build
//!
//! Provides types and parsing for the optional `hoi4mod.toml` at the mod root.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
