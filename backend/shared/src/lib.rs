//! Shared utilities for the upload backend services

pub use tracing;

pub mod observability;
