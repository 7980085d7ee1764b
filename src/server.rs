//! HTTP server lifecycle: bind, serve, graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server is already running")]
    AlreadyStarted,

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("in-flight requests did not finish within {0:?}, server aborted")]
    ShutdownTimeout(Duration),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] JoinError),
}

struct Running {
    addr: SocketAddr,
    shutdown: CancellationToken,
    /// Cancelled by the serve task when it exits for any reason.
    done: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
}

/// Owns one running `axum::serve` task.
///
/// Start and shutdown go through the same lock, so concurrent shutdown calls
/// run one after another and the later ones see a stopped server.
#[derive(Default)]
pub struct Server {
    running: Mutex<Option<Running>>,
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `address` and starts serving `router` in the background.
    ///
    /// Returns the bound address, which differs from `address` when port 0
    /// was requested.
    pub async fn start(&self, router: Router, address: &str) -> Result<SocketAddr, ServerError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(ServerError::AlreadyStarted);
        }

        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.to_string(),
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })?;

        let shutdown = CancellationToken::new();
        let done = CancellationToken::new();
        let task = tokio::spawn({
            let shutdown = shutdown.clone();
            let done = done.clone();
            async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(shutdown.cancelled_owned())
                    .await;
                done.cancel();
                result
            }
        });

        tracing::info!(address = %addr, "Server listening");
        *running = Some(Running {
            addr,
            shutdown,
            done,
            task,
        });
        Ok(addr)
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.addr)
    }

    /// Stops accepting connections and waits up to `grace` for in-flight
    /// requests. The serve task is aborted when the grace period runs out.
    ///
    /// Calling this on a server that is not running is a no-op.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), ServerError> {
        let mut running = self.running.lock().await;
        let Some(Running {
            addr,
            shutdown,
            mut task,
            ..
        }) = running.take()
        else {
            return Ok(());
        };

        tracing::info!(address = %addr, grace = ?grace, "Shutting down server");
        shutdown.cancel();

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(Ok(()))) => {
                tracing::info!("Server shutdown complete");
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ServerError::Serve(e)),
            Ok(Err(e)) => Err(ServerError::Join(e)),
            Err(_) => {
                task.abort();
                tracing::error!(grace = ?grace, "Forced server shutdown");
                Err(ServerError::ShutdownTimeout(grace))
            }
        }
    }

    /// Serves until SIGINT/SIGTERM arrives or the serve task exits, then
    /// shuts down with `grace`.
    pub async fn run_until_signal(&self, grace: Duration) -> Result<(), ServerError> {
        let done = match self.running.lock().await.as_ref() {
            Some(running) => running.done.clone(),
            None => return Ok(()),
        };

        tokio::select! {
            _ = shutdown_signal() => {}
            _ = done.cancelled() => {
                tracing::warn!("Server stopped without a shutdown signal");
            }
        }
        self.shutdown(grace).await
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn router() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    "late"
                }),
            )
    }

    async fn get_path(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn serves_requests_and_shuts_down() {
        let server = Server::new();
        let addr = server.start(router(), "127.0.0.1:0").await.unwrap();
        assert_eq!(server.local_addr().await, Some(addr));

        let response = get_path(addr, "/ping").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("pong"));

        server.shutdown(Duration::from_secs(5)).await.unwrap();
        assert!(server.local_addr().await.is_none());
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn shutdown_without_start_is_noop() {
        let server = Server::new();
        server.shutdown(Duration::from_millis(10)).await.unwrap();
        server.run_until_signal(Duration::from_millis(10)).await.unwrap();
    }

    #[tokio::test]
    async fn repeated_shutdown_is_noop() {
        let server = Server::new();
        server.start(router(), "127.0.0.1:0").await.unwrap();
        server.shutdown(Duration::from_secs(5)).await.unwrap();
        server.shutdown(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let server = Server::new();
        server.start(router(), "127.0.0.1:0").await.unwrap();
        let err = server.start(router(), "127.0.0.1:0").await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyStarted));
        server.shutdown(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = taken.local_addr().unwrap().to_string();
        let err = Server::new().start(router(), &address).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
    }

    #[tokio::test]
    async fn slow_request_past_grace_period_times_out() {
        let server = Server::new();
        let addr = server.start(router(), "127.0.0.1:0").await.unwrap();

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .await
                .unwrap();
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf).await;
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let err = server.shutdown(Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ServerError::ShutdownTimeout(_)));
        client.abort();
    }
}
