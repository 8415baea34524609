//! # sqlscope-server
//!
//! HTTP front end for the SqlScope parser.
//!
//! This crate provides:
//!
//! - **Configuration**: [`ServerConfig`], loaded from TOML and overridden by
//!   command-line flags in the `sqlscoped` binary.
//!
//! - **Parse Service**: [`ParseService`] routes `POST {"sql": "..."}` to the
//!   parser and answers CORS preflight requests.
//!
//! - **HTTP Server**: [`HttpServer`], a one-request-per-connection HTTP/1.1
//!   listener on tokio.
//!
//! # Quick Start
//!
//! ```no_run
//! use sqlscope_server::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), sqlscope_server::ServerError> {
//! let config = ServerConfig::builder().host("127.0.0.1").port(8001).build();
//! let server = HttpServer::bind(config).await?;
//! server.serve().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Server configuration.
pub mod config;

/// Server error types.
pub mod error;

/// HTTP framing and listener.
pub mod http;

/// Request routing.
pub mod service;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{ServerError, ServerResult};
pub use http::{HttpRequest, HttpResponse, HttpServer};
pub use service::ParseService;
