use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use sqlscope_server::{HttpServer, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A parse service running on an ephemeral local port.
pub struct TestServer {
    /// Address the server accepted connections on.
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

/// Starts a server for `config` on `127.0.0.1:0`. Host and port in `config`
/// are replaced.
pub async fn start_server(config: ServerConfig) -> Result<TestServer> {
    let mut config = config;
    config.host = "127.0.0.1".to_string();
    config.port = 0;

    let server = HttpServer::bind(config).await?;
    let addr = server.local_addr()?;
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = server
            .serve_with_shutdown(async {
                let _ = rx.await;
            })
            .await;
    });

    Ok(TestServer {
        addr,
        shutdown: Some(tx),
        handle,
    })
}

impl TestServer {
    /// Sends raw request bytes to this server.
    pub async fn send_raw(&self, request: &[u8]) -> Result<RawResponse> {
        send_raw(self.addr, request).await
    }

    /// Sends a request with the given method, path and body.
    pub async fn request(&self, method: &str, path: &str, body: &str) -> Result<RawResponse> {
        request(self.addr, method, path, body).await
    }

    /// Posts `{"sql": sql}` to `path`.
    pub async fn post_sql(&self, path: &str, sql: &str) -> Result<RawResponse> {
        post_sql(self.addr, path, sql).await
    }

    /// Stops accepting connections and waits for the listener task.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.handle).await?;
        Ok(())
    }
}

/// Sends raw request bytes and reads the response until the server closes
/// the connection.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Result<RawResponse> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    RawResponse::parse(&buf)
}

/// Sends a request with the given method, path and body.
pub async fn request(addr: SocketAddr, method: &str, path: &str, body: &str) -> Result<RawResponse> {
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\n\r\n{body}",
        body.len()
    );
    send_raw(addr, request.as_bytes()).await
}

/// Posts `{"sql": sql}` to `path`.
pub async fn post_sql(addr: SocketAddr, path: &str, sql: &str) -> Result<RawResponse> {
    let body = serde_json::json!({ "sql": sql }).to_string();
    request(addr, "POST", path, &body).await
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A response as seen on the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code.
    pub status: u16,
    /// Headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Body text.
    pub body: String,
}

impl RawResponse {
    /// Splits a full HTTP/1.1 response.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(raw).context("response is not UTF-8")?;
        let (head, body) = text
            .split_once("\r\n\r\n")
            .ok_or_else(|| anyhow!("incomplete response: {:?}", text))?;

        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default();
        let status = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| anyhow!("bad status line: {:?}", status_line))?;

        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();

        Ok(Self {
            status,
            headers,
            body: body.to_string(),
        })
    }

    /// Returns the first header with the given name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
