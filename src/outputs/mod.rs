//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Renders the [`EventFeed`](crate::models::EventFeed) and writes
//!   it atomically to the configured path

pub mod json;
