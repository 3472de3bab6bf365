/// snsout - shapes application events into topic notifications
///
/// This library derives a notification's destination, subject, body and typed
/// attributes from a loosely-structured event, enforces the backend's size
/// limits and hands the result to a pluggable publisher.
pub mod notification;

pub mod attributes;
pub mod boot;
pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod ingest;
pub mod truncate;

// Re-export core types for convenience
pub use core::*;
