//! HTTP server
//!
//! Binds one listener and serves the composed router until the shutdown
//! signal resolves.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, MiddlewareConfig};
use crate::{Result, ServerError};

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8090";

pub struct HttpServer {
    addr: SocketAddr,
    router: Router,
}

impl HttpServer {
    pub fn builder() -> HttpServerBuilder {
        HttpServerBuilder::new()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the process is stopped
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `signal` resolves, then drain open connections
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let local = listener.local_addr()?;
        info!("HTTP server listening on http://{}", local);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Builder for [`HttpServer`]
pub struct HttpServerBuilder {
    bind: String,
    router: Option<Router>,
    middleware_config: MiddlewareConfig,
}

impl HttpServerBuilder {
    pub fn new() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            router: None,
            middleware_config: MiddlewareConfig::default(),
        }
    }

    /// Set bind address (`host:port`)
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind = addr.into();
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn middleware(mut self, config: MiddlewareConfig) -> Self {
        self.middleware_config = config;
        self
    }

    /// Enable/disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.middleware_config.cors_enabled = enabled;
        self
    }

    pub fn build(self) -> Result<HttpServer> {
        let addr: SocketAddr = self
            .bind
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.bind.clone()))?;

        let router = apply_middleware(self.router.unwrap_or_default(), self.middleware_config);
        Ok(HttpServer { addr, router })
    }
}

impl Default for HttpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_parses_bind_address() {
        let server = HttpServer::builder().bind("0.0.0.0:9000").build().unwrap();
        assert_eq!(server.addr().port(), 9000);
    }

    #[test]
    fn test_builder_rejects_bad_address() {
        let err = HttpServer::builder().bind("localhost").build().err().unwrap();
        assert!(matches!(err, ServerError::InvalidAddress(ref addr) if addr == "localhost"));
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let server = HttpServer::builder().bind("127.0.0.1:0").build().unwrap();
        server.serve_with_shutdown(async {}).await.unwrap();
    }
}
