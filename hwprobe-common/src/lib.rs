//! # hwprobe Common
//!
//! Shared utilities for the hwprobe components.
//!
//! ## Logging
//!
//! Tracing initialization for applications embedding the inventory engine:
//!
//! ```rust
//! use hwprobe_common::init_logging;
//!
//! init_logging("info").unwrap();
//! ```

pub mod logging;

// Re-export logging functions
pub use logging::{init_logging, init_logging_json};
