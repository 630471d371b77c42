//! Shared types, error model, and configuration for conftrack.
//!
//! This crate is the foundation depended on by all other conftrack crates.
//! It provides:
//! - [`ConftrackError`] — the unified error type
//! - Domain types ([`Conference`], [`StoredConference`])
//! - Configuration ([`AppConfig`], config loading)
//! - Date-phrase resolution ([`resolve_date_phrase`])

pub mod config;
pub mod dateparse;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DisplayConfig, SourceConfig, StorageConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use dateparse::resolve_date_phrase;
pub use error::{ConftrackError, Result};
pub use types::{
    Conference, DATETIME_FORMAT, StoredConference, decode_datetime, encode_datetime,
};
