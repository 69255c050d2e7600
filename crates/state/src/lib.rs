//! Manages skillbridge configuration and history.
//!
//! This crate provides utilities for:
//! - Resolving data, config and history locations from the environment.
//! - Loading and saving the configured source locations.
//! - Keeping a short history of recently used target paths.

pub mod config;
pub mod env;
pub mod history;
pub mod persistence;

pub use config::AppConfig;
pub use env::{config_file, data_root, history_file, home_dir};
pub use history::{HistoryItem, HistoryKind, HistoryStore, TaggedHistoryItem, HISTORY_LIMIT};
