//! # Common Components
//!
//! Shared utilities used by the library and the `stegmeta` binary.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration loading
//! - [`logging`]: logger initialization

pub mod config;
pub mod logging;
