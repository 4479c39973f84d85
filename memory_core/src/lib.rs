//! # Memory Core
//!
//! The memory of the K-14T chat loop. This crate owns the durable log of remembered facts,
//! decides which of them are relevant to what the user just said, and assembles the prompt
//! sent to the model.
//!
//! ## Core Components
//!
//! - **knowledge_base**: The fact store - append-only JSONL log plus in-memory index
//! - **context_assembler**: Token-overlap relevance selection and prompt assembly
//!
//! ## Design Philosophy
//!
//! - **Log is the source of truth**: The in-memory cache only changes after the log write succeeds
//! - **Degraded but available**: Corrupt log lines are skipped, never fatal
//! - **Swappable policy**: Categorisation is a plug-in classifier, not baked into the store

pub mod context_assembler;
pub mod knowledge_base;

pub use context_assembler::*;
pub use knowledge_base::*;
