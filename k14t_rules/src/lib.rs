//! # K-14T Rules
//!
//! The "loop rules" crate - configuration, the command grammar, per-session state and
//! reply shaping for the K-14T chat loop.
//! This crate holds no memory or model logic; `memory_core` and the CLI build on it.

pub mod commands;
pub mod config;
pub mod reply;
pub mod session;

pub use commands::*;
pub use config::*;
pub use reply::*;
pub use session::*;
