//! Client Configuration Module
//!
//! Provides the service address, pacing delay and dashboard settings, loaded
//! from TOML with built-in defaults for everything.
//!
//! ## Loading Order
//!
//! 1. `FAILSTREAM_CONFIG` environment variable (path to TOML file)
//! 2. `failstream.toml` in the current working directory
//! 3. Built-in defaults ([`defaults`])
//!
//! Command-line flags override whatever was loaded.
//!
//! ```toml
//! [service]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 5
//!
//! [stream]
//! pacing_ms = 1000
//!
//! [dashboard]
//! bind_addr = "127.0.0.1:8080"
//! ```

mod client_config;
pub mod defaults;

pub use client_config::*;
