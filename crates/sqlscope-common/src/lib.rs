//! # sqlscope-common
//!
//! Values shared by the SqlScope crates.
//!
//! The parser core has no configuration of its own; everything here is
//! consumed by the file-mode CLI and the HTTP service so the two adapters
//! agree on defaults.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;

pub use constants::*;
