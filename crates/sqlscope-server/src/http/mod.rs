//! Minimal HTTP/1.1 server for the parse service.
//!
//! One request per connection: the server reads a request, writes the
//! response with `Connection: close`, and shuts the socket down. Each
//! connection runs on its own tokio task.

pub mod request;
pub mod response;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::service::ParseService;

pub use request::{read_request, HttpRequest};
pub use response::HttpResponse;

/// HTTP server bound to a listening socket.
pub struct HttpServer {
    listener: TcpListener,
    service: Arc<ParseService>,
}

impl HttpServer {
    /// Binds to the configured address.
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let service = Arc::new(ParseService::new(Arc::new(config)));
        Ok(Self { listener, service })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the task is dropped.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` completes. Connections already
    /// accepted run to completion on their own tasks.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!("Listening on http://{}{}", addr, self.service.config().parse_path);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!("Accepted connection from {}", peer);
                            let service = Arc::clone(&self.service);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(&service, stream).await {
                                    warn!("Connection error from {}: {}", peer, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Listener on {} shutting down", addr);
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Serves a single request on `stream`. The whole request must arrive within
/// the configured read timeout.
async fn handle_connection(service: &ParseService, mut stream: TcpStream) -> ServerResult<()> {
    let config = service.config();
    let deadline = config.read_timeout();

    let read = tokio::time::timeout(deadline, read_request(&mut stream, config.max_body_bytes));
    let request = match read.await {
        Ok(result) => result,
        Err(_) => Err(ServerError::ReadTimeout {
            millis: config.read_timeout_ms,
        }),
    };

    let response = match request {
        Ok(request) => service.handle(&request),
        Err(e) => match service.reject(&e) {
            Some(response) => {
                warn!("Rejecting request: {}", e);
                response
            }
            None => return Err(e),
        },
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
