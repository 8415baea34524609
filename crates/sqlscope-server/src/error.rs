//! Server error types.

use thiserror::Error;

/// Errors raised while reading a request or serving a connection.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error on the socket.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request line and headers exceeded the head limit.
    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge {
        /// The configured limit.
        limit: usize,
    },

    /// The declared body length exceeded the body limit.
    #[error("request body of {length} bytes exceeds {limit} bytes")]
    BodyTooLarge {
        /// Declared `Content-Length`.
        length: usize,
        /// The configured limit.
        limit: usize,
    },

    /// The request could not be framed as HTTP/1.x.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The client did not send a complete request in time.
    #[error("request not received within {millis} ms")]
    ReadTimeout {
        /// The configured deadline.
        millis: u64,
    },

    /// The peer closed the connection before a full request arrived.
    #[error("connection closed before request was complete")]
    ConnectionClosed,
}

impl ServerError {
    /// Status code to answer with, or `None` when no response can be sent.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServerError::HeadTooLarge { .. } | ServerError::MalformedRequest(_) => Some(400),
            ServerError::ReadTimeout { .. } => Some(408),
            ServerError::BodyTooLarge { .. } => Some(413),
            ServerError::Io(_) | ServerError::ConnectionClosed => None,
        }
    }
}

/// Server result type.
pub type ServerResult<T> = Result<T, ServerError>;
