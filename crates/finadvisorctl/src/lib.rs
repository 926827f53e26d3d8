//! Finadvisor Control library - client and command implementations.

pub mod client;
pub mod commands;
pub mod errors;
