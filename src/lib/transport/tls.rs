use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;

use super::shutdown_signal;

pub async fn configure_tls(
    cert_path: PathBuf,
    key_path: PathBuf,
) -> Result<RustlsConfig, anyhow::Error> {
    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

/// Serves `router` over HTTPS until a shutdown signal, then gives in-flight
/// requests ten seconds to finish.
pub async fn serve_tls(
    addr: SocketAddr,
    config: RustlsConfig,
    router: Router,
) -> Result<(), anyhow::Error> {
    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(Duration::from_secs(10)));
        }
    });

    tracing::info!(addr = %addr, "notes API listening (https)");
    axum_server::bind_rustls(addr, config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_certificate_files_are_reported() {
        let result = configure_tls(
            PathBuf::from("does-not-exist/cert.pem"),
            PathBuf::from("does-not-exist/key.pem"),
        )
        .await;
        assert!(result.is_err());
    }
}
