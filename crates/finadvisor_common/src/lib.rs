//! Finadvisor Common - Shared types, wire schemas and the advice engine
//!
//! The daemon and the control client both depend on this crate so that the
//! rule chain and the JSON payloads are defined exactly once.

pub mod engine;
pub mod schemas;
pub mod types;

pub use engine::{evaluate, evaluate_message};
pub use schemas::*;
pub use types::*;
