use crate::api;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Resolves the listen address, with `port` taking precedence over the configured one.
pub fn listen_addr(config: &AppConfig, port: Option<u16>) -> Result<SocketAddr> {
    let mut addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;
    if let Some(port) = port {
        addr.set_port(port);
    }
    Ok(addr)
}

pub async fn serve(config: &AppConfig, port: Option<u16>) -> Result<()> {
    let state = crate::build_state(config)?;
    let addr = listen_addr(config, port)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}{}", addr, api::sitemap::BASE_PATH);

    axum::serve(listener, api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        let config = AppConfig::default();
        assert_eq!(
            listen_addr(&config, None).unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(listen_addr(&config, Some(9999)).unwrap().port(), 9999);

        let mut config = AppConfig::default();
        config.server.bind = "localhost".to_string();
        assert!(
            listen_addr(&config, None)
                .unwrap_err()
                .to_string()
                .contains("Invalid bind address")
        );
    }
}
