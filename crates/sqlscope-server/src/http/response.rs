//! HTTP/1.1 responses.

use bytes::{BufMut, Bytes, BytesMut};

/// Reason phrase for the status codes the service sends.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// An HTTP response. `Content-Length` and `Connection: close` are added when
/// it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpResponse {
    /// Creates a response with no headers and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Creates an `application/json` response.
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        let mut response = Self::new(status).with_header("Content-Type", "application/json");
        response.body = body.into();
        response
    }

    /// Creates a JSON error response `{"error": message}`.
    pub fn error(status: u16, message: impl AsRef<str>) -> Self {
        let body = serde_json::json!({ "error": message.as_ref() }).to_string();
        Self::json(status, body)
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds the CORS headers for `origin`.
    pub fn with_cors(self, origin: &str) -> Self {
        self.with_header("Access-Control-Allow-Origin", origin)
            .with_header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .with_header("Access-Control-Allow-Headers", "Content-Type")
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the first header with the given name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Encodes the status line, headers and body.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(256 + self.body.len());

        buf.put_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status)).as_bytes(),
        );
        for (name, value) in &self.headers {
            buf.put_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        buf.put_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        buf.put_slice(b"Connection: close\r\n\r\n");
        buf.put_slice(&self.body);

        buf.freeze()
    }
}
