//! Configuration module
//!
//! Page size, search debounce and the editor tag profile, stored as TOML.

pub mod config;

pub use config::Config;
