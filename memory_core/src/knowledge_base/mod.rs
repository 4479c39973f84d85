//! Knowledge Base module - long-term memory of remembered facts.
//!
//! The knowledge base consists of:
//! - **Facts**: Short remembered statements with a timestamp and optional category
//! - **Log**: The append-only line-delimited JSON file facts are persisted in
//! - **Store**: The in-memory index over the log, with duplicate detection and pruning
//! - **Detector**: Trigger phrases that mark ordinary chat input as worth remembering

mod category;
mod detector;
mod error;
mod fact;
mod log;
mod store;

pub use category::*;
pub use detector::*;
pub use error::*;
pub use fact::*;
pub use log::*;
pub use store::*;
