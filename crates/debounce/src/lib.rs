//! Trailing-edge debounce for Hush
//!
//! This crate provides:
//! - The per-subscription debounce coordinator (generation-stamped timers,
//!   one reentrant lock, serial timer slot)
//! - The `debounce` operator for any `Source`
//! - Subscription handles with idempotent disposal
//! - TOML-backed configuration

pub mod config;
pub mod operator;
mod sink;

// Re-exports
pub use config::{ConfigError, DebounceConfig};
pub use operator::{Debounce, DebounceExt, Subscription};
