use crate::proxy::engine::ProxyEngine;
use crate::repository::store::{ArtifactStore, MemoryStore};
use crate::state::SharedState;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);
const HEALTH_ATTEMPTS: usize = 5;
const HEALTH_INTERVAL: Duration = Duration::from_secs(5);

/// Starts the control plane and both proxy listeners
#[derive(Args, Debug)]
pub struct Command;

impl Command {
    pub async fn run(&self, config: crate::config::Config) {
        tracing::info!("preparing proxy");
        let state = Arc::new(SharedState::default());
        let store: Arc<dyn ArtifactStore + Send + Sync> = Arc::new(MemoryStore::default());
        let upstream = Arc::new(
            config
                .upstream
                .build()
                .expect("unable to build upstream relay"),
        );
        let engine = Arc::new(ProxyEngine::new(state.clone(), store, upstream));

        let control_address = config.control.address();
        let control_handle = Handle::new();
        let control = {
            let app = crate::control::router(state.clone());
            let handle = control_handle.clone();
            tracing::info!("starting control plane on {control_address:?}");
            tokio::spawn(async move {
                axum_server::bind(control_address)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await
            })
        };

        wait_until_healthy(control_address).await;

        let app = crate::proxy::router(engine);

        let proxy_address = config.proxy.address();
        let proxy_handle = Handle::new();
        let proxy = {
            let app = app.clone();
            let handle = proxy_handle.clone();
            tracing::info!("starting proxy on {proxy_address:?}");
            tokio::spawn(async move {
                axum_server::bind(proxy_address)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await
            })
        };

        let tls_address = config.proxy.tls_address();
        let rustls =
            RustlsConfig::from_pem_file(&config.proxy.certificate, &config.proxy.private_key)
                .await
                .expect("unable to load the tls certificate");
        let tls_handle = Handle::new();
        let tls = {
            let handle = tls_handle.clone();
            tracing::info!("starting tls proxy on {tls_address:?}");
            tokio::spawn(async move {
                axum_server::bind_rustls(tls_address, rustls)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await
            })
        };

        tokio::signal::ctrl_c()
            .await
            .expect("unable to listen for the interrupt signal");
        // the first interrupt wins; shutdown cannot be aborted
        tracing::info!("received keyboard interrupt, shutting down");
        control_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        proxy_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        tls_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));

        for task in [control, proxy, tls] {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => tracing::error!("server stopped with an error: {error}"),
                Err(error) => tracing::error!("server task failed: {error}"),
            }
        }
        tracing::info!("goodbye");
    }
}

/// The control plane publishes /health before anything else may start;
/// a control plane that never comes up makes the whole process useless.
async fn wait_until_healthy(address: SocketAddr) {
    let url = format!("http://{address}/health");
    for attempt in 1..=HEALTH_ATTEMPTS {
        match reqwest::get(&url).await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("control plane is healthy");
                return;
            }
            Ok(response) => {
                tracing::warn!("health attempt {attempt}: status {}", response.status())
            }
            Err(error) => tracing::warn!("health attempt {attempt}: {error}"),
        }
        if attempt < HEALTH_ATTEMPTS {
            tokio::time::sleep(HEALTH_INTERVAL).await;
        }
    }
    tracing::error!("control plane never became healthy");
    std::process::exit(1);
}
