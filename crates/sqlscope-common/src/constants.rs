//! System-wide constants for SqlScope.

// =============================================================================
// Service Mode
// =============================================================================

/// Default address the HTTP service binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the HTTP service.
pub const DEFAULT_PORT: u16 = 8001;

/// Path that accepts `POST {"sql": "..."}` requests.
pub const PARSE_SQL_PATH: &str = "/parse-sql";

/// Largest request body the service will read (1 MB).
///
/// A single SQL statement is expected; anything bigger is rejected with 413.
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// Largest request head (request line plus headers) in bytes.
pub const MAX_REQUEST_HEAD_SIZE: usize = 16 * 1024;

/// How long a client may take to send a complete request, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

/// Value sent in `Access-Control-Allow-Origin` unless configured otherwise.
pub const DEFAULT_ALLOW_ORIGIN: &str = "*";

// =============================================================================
// File Mode
// =============================================================================

/// SQL source read by the CLI when no input path is given.
pub const DEFAULT_INPUT_FILE: &str = "input.sql";

/// JSON file written by the CLI when no output path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "ast.json";
