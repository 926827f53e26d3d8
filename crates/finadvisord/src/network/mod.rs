//! Request middleware

pub mod middleware;
