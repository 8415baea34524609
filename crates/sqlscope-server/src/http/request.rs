//! HTTP/1.x request framing.
//!
//! Only what the parse service needs: a request line, headers, and a body
//! delimited by `Content-Length`. Chunked bodies are not decoded.

use bytes::{Bytes, BytesMut};
use sqlscope_common::MAX_REQUEST_HEAD_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ServerError, ServerResult};

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// A parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method, e.g. `POST`.
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Bytes,
}

impl HttpRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the first header with the given name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared body length; zero when the header is absent.
    pub fn content_length(&self) -> ServerResult<usize> {
        match self.header("Content-Length") {
            Some(value) => value.trim().parse().map_err(|_| {
                ServerError::MalformedRequest(format!("invalid Content-Length: {}", value))
            }),
            None => Ok(0),
        }
    }
}

/// Length of the request head including the blank line, if `buf` holds a
/// complete head.
pub fn head_len(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
        .map(|pos| pos + HEAD_TERMINATOR.len())
}

/// Parses a complete request head. The body is left empty.
pub fn parse_head(head: &[u8]) -> ServerResult<HttpRequest> {
    let text = std::str::from_utf8(head)
        .map_err(|_| ServerError::MalformedRequest("request head is not UTF-8".to_string()))?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ServerError::MalformedRequest(format!(
            "invalid request line: {:?}",
            request_line
        )));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ServerError::MalformedRequest(format!(
            "unsupported version: {}",
            version
        )));
    }

    let path = target.split_once('?').map_or(target, |(path, _)| path);
    let mut request = HttpRequest::new(method, path);

    for line in lines.take_while(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ServerError::MalformedRequest(format!("invalid header: {:?}", line)))?;
        request.headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(request)
}

/// Reads one request from `stream`.
///
/// Fails with [`ServerError::BodyTooLarge`] as soon as the head declares a
/// body longer than `max_body`, before any of it is read. Bytes past the
/// declared body are discarded.
pub async fn read_request<S>(stream: &mut S, max_body: usize) -> ServerResult<HttpRequest>
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(4096);

    let len = loop {
        if let Some(len) = head_len(&buf) {
            break len;
        }
        if buf.len() > MAX_REQUEST_HEAD_SIZE {
            return Err(ServerError::HeadTooLarge {
                limit: MAX_REQUEST_HEAD_SIZE,
            });
        }
        if stream.read_buf(&mut buf).await? == 0 {
            return Err(ServerError::ConnectionClosed);
        }
    };
    if len > MAX_REQUEST_HEAD_SIZE {
        return Err(ServerError::HeadTooLarge {
            limit: MAX_REQUEST_HEAD_SIZE,
        });
    }

    let head = buf.split_to(len);
    let mut request = parse_head(&head)?;

    let length = request.content_length()?;
    if length > max_body {
        return Err(ServerError::BodyTooLarge {
            length,
            limit: max_body,
        });
    }

    while buf.len() < length {
        if stream.read_buf(&mut buf).await? == 0 {
            return Err(ServerError::ConnectionClosed);
        }
    }
    buf.truncate(length);
    request.body = buf.freeze();

    Ok(request)
}
