//! HTTP/1 server hosting a [`WebjarsService`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::{Request, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn, Instrument};
use webjars_config::WebjarsConfig;

use crate::error::{ServerError, ServerResult};
use crate::service::{empty_response, HttpResponse, WebjarsService};
use crate::shutdown::ShutdownSignal;

/// Standalone asset server. Requests no route claims get an empty 404.
///
/// # Example
///
/// ```rust,ignore
/// use webjars_config::ConfigLoader;
/// use webjars_server::{Server, WebjarsService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ConfigLoader::new().with_file("webjars.toml")?.load()?;
///     let service = WebjarsService::from_config(&config)?;
///     Server::from_config(&config, service)?.run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
    service: Arc<WebjarsService>,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a server for `service` on `addr`.
    pub fn new(addr: SocketAddr, service: WebjarsService) -> Self {
        Self {
            addr,
            service: Arc::new(service),
            shutdown_timeout: Duration::from_secs(30),
        }
    }

    /// Creates a server using the `[server]` section.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidAddress` if `http_addr` does not parse.
    pub fn from_config(config: &WebjarsConfig, service: WebjarsService) -> ServerResult<Self> {
        let addr = config
            .server
            .http_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ServerError::invalid_address(&config.server.http_addr, e.to_string())
            })?;

        Ok(Self::new(addr, service)
            .with_shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs)))
    }

    /// Sets how long shutdown waits for open connections.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// The configured listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs until SIGTERM or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn run(self) -> ServerResult<()> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and runs until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::bind(self.addr.to_string(), e))?;
        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Accepts connections on `listener` until `shutdown` triggers, then
    /// waits up to the shutdown timeout for open connections to finish.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) {
        match listener.local_addr() {
            Ok(addr) => info!(%addr, "webjars server listening"),
            Err(_) => info!("webjars server listening"),
        }

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let service = Arc::clone(&self.service);
                        let shutdown = shutdown.clone();
                        connections.spawn(
                            serve_connection(stream, service, shutdown)
                                .instrument(tracing::debug_span!("connection", %peer)),
                        );
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    info!("shutdown signal received, stopping server");
                    break;
                }
            }

            while connections.try_join_next().is_some() {}
        }

        let open = connections.len();
        let drained = tokio::time::timeout(self.shutdown_timeout, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        match drained {
            Ok(()) => info!("server stopped"),
            Err(_) => warn!(open, "shutdown timeout reached, aborting open connections"),
        }
    }
}

async fn serve_connection(stream: TcpStream, service: Arc<WebjarsService>, shutdown: ShutdownSignal) {
    let io = TokioIo::new(stream);
    let handler = service_fn(move |request: Request<Incoming>| {
        let service = Arc::clone(&service);
        async move { Ok::<_, Infallible>(respond(service, request).await) }
    });

    let connection = http1::Builder::new().serve_connection(io, handler);
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.recv() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(e) = result {
        debug!(error = %e, "connection error");
    }
}

async fn respond(service: Arc<WebjarsService>, request: Request<Incoming>) -> HttpResponse {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // archive reads block
    let handled = tokio::task::spawn_blocking(move || service.handle(&request)).await;

    let response = match handled {
        Ok(Some(response)) => response,
        Ok(None) => empty_response(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(%method, path, error = %e, "request handler failed");
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    debug!(%method, path, status = response.status().as_u16(), "request completed");
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_rejects_bad_address() {
        let mut config = WebjarsConfig::default();
        config.server.http_addr = "not-an-address".to_string();
        let service = WebjarsService::from_config(&WebjarsConfig::default()).unwrap();
        let err = Server::from_config(&config, service).unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }

    #[test]
    fn test_from_config_uses_server_section() {
        let mut config = WebjarsConfig::default();
        config.server.http_addr = "127.0.0.1:8181".to_string();
        let service = WebjarsService::from_config(&config).unwrap();
        let server = Server::from_config(&config, service).unwrap();
        assert_eq!(server.addr(), "127.0.0.1:8181".parse::<SocketAddr>().unwrap());
        assert_eq!(server.shutdown_timeout, Duration::from_secs(30));
    }
}
