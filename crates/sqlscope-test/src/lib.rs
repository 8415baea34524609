//! # sqlscope-test
//!
//! Integration tests for SqlScope.
//!
//! This crate contains:
//! - Parse scenarios through the public `sqlscope_sql` API
//! - End-to-end tests of the HTTP service over a live socket

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;

pub use utils::{post_sql, request, send_raw, start_server, RawResponse, TestServer};
