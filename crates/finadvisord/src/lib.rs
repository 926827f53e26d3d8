//! Finadvisor daemon library - exposes modules for testing.

pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod routes;
pub mod server;
pub mod session;

pub use server::{AdvisorServer, RunningServer};
