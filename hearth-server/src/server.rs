use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{http::StatusCode, routing::get, Router};

use crate::config::ServerConfig;

/// Wrap a service router with the layers every hearth server shares.
pub fn with_common_layers(app: Router) -> Router {
    app.route("/health", get(health))
        .layer(
            tower_http::compression::CompressionLayer::new()
                .quality(tower_http::CompressionLevel::Fastest),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

// Just reply that everything is okay
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Serve the app until the process is stopped. Plain HTTP, or HTTPS when TLS is configured.
pub async fn serve(app: Router, config: &ServerConfig) -> Result<()> {
    if let Some(tls) = &config.tls {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("A rustls crypto provider was already installed");
        }
        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Loading TLS certificate")?;

        let addr: SocketAddr = config
            .address
            .parse()
            .with_context(|| format!("Parsing listen address {}", config.address))?;
        tracing::info!("Listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .context("Starting TLS server")?;
    } else {
        let listener = tokio::net::TcpListener::bind(&config.address)
            .await
            .with_context(|| format!("Binding {}", config.address))?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app).await?;
    }
    Ok(())
}
