//! # vigil-core
//!
//! Core records, traits, and shared constants for vigil outreach signals.
//!
//! This crate provides the data model consumed and produced by the hotspot
//! and triage engines, the typed request payloads accepted at intake, and the
//! repository traits the storage layer implements.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod timestamps;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use timestamps::parse_timestamp;
pub use traits::*;
