use crate::app::App;
use crate::error::{Error, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::Server as HyperServer;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Resolve `host:port` to the first socket address it names. Accepts host
/// names as well as IP literals.
pub async fn resolve_address(addr: &str) -> Result<SocketAddr> {
    tokio::net::lookup_host(addr)
        .await
        .map_err(|e| Error::config(format!("Invalid address '{}': {}", addr, e)))?
        .next()
        .ok_or_else(|| Error::config(format!("Address '{}' did not resolve", addr)))
}

pub struct Server {
    app: Arc<App>,
}

impl Server {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    pub async fn serve(self, addr: &str) -> Result<()> {
        let addr = resolve_address(addr).await?;

        let shutdown_timeout = Duration::from_secs(self.app.config().server.shutdown_timeout);

        log::info!("userboard listening on http://{}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let mut sigterm = match signal(SignalKind::terminate()) {
                    Ok(sig) => sig,
                    Err(e) => {
                        log::error!("Failed to install SIGTERM handler: {}", e);
                        return;
                    }
                };

                let mut sigint = match signal(SignalKind::interrupt()) {
                    Ok(sig) => sig,
                    Err(e) => {
                        log::error!("Failed to install SIGINT handler: {}", e);
                        return;
                    }
                };

                tokio::select! {
                    _ = sigterm.recv() => {
                        log::info!("Received SIGTERM signal - initiating graceful shutdown");
                    }
                    _ = sigint.recv() => {
                        log::info!("Received SIGINT signal (Ctrl+C) - initiating graceful shutdown");
                    }
                }
            }

            #[cfg(not(unix))]
            {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        log::info!("Received Ctrl+C signal - initiating graceful shutdown");
                    }
                    Err(e) => {
                        log::error!("Failed to listen for Ctrl+C signal: {}", e);
                        return;
                    }
                }
            }

            let _ = shutdown_tx.send(());
        });

        let app = Arc::clone(&self.app);
        let make_svc = make_service_fn(move |_conn| {
            let app = Arc::clone(&app);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let app = Arc::clone(&app);
                    async move { Ok::<_, Infallible>(app.handle_hyper(req).await) }
                }))
            }
        });

        let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
        let server = HyperServer::try_bind(&addr)?
            .serve(make_svc)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
                let _ = drain_tx.send(());
            });

        // In-flight requests get `shutdown_timeout` to drain once the signal fires
        let drain_deadline = async move {
            if drain_rx.await.is_ok() {
                tokio::time::sleep(shutdown_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            res = server => {
                if let Err(e) = res {
                    log::error!("Server error: {}", e);
                    return Err(Error::Http(e));
                }
            }
            _ = drain_deadline => {
                log::warn!(
                    "Connections still open after {}s, forcing shutdown",
                    shutdown_timeout.as_secs()
                );
            }
        }

        log::info!("Server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        let addr = resolve_address("127.0.0.1:5000").await.unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 5000)));
    }

    #[tokio::test]
    async fn test_resolve_host_name() {
        let addr = resolve_address("localhost:5000").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 5000);
    }

    #[tokio::test]
    async fn test_resolve_rejects_missing_port() {
        let err = resolve_address("localhost").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
