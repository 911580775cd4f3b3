//! playwatch - tracks how long configured applications run
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod events;
pub mod integrations;
pub mod monitor;
pub mod source;
pub mod tracker;
pub mod util;
