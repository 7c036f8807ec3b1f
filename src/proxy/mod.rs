use axum::extract::{Host, OriginalUri, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) mod engine;
pub(crate) mod relay;

use engine::ProxyEngine;

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: IpAddr,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    #[serde(default = "Config::default_tls_port")]
    pub tls_port: u16,
    #[serde(default = "Config::default_certificate")]
    pub certificate: PathBuf,
    #[serde(default = "Config::default_private_key")]
    pub private_key: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            tls_port: Self::default_tls_port(),
            certificate: Self::default_certificate(),
            private_key: Self::default_private_key(),
        }
    }
}

impl Config {
    fn default_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
    }

    fn default_port() -> u16 {
        80
    }

    fn default_tls_port() -> u16 {
        443
    }

    fn default_certificate() -> PathBuf {
        PathBuf::from("server.pem")
    }

    fn default_private_key() -> PathBuf {
        PathBuf::from("server.key")
    }
}

impl Config {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    pub fn tls_address(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.tls_port))
    }
}

/// Every path and method lands in the same handler: the proxy does not
/// own any routes, the inbound Host header decides where things go.
pub(crate) fn router(engine: Arc<ProxyEngine>) -> Router {
    Router::new().fallback(handle).with_state(engine)
}

async fn handle(
    State(engine): State<Arc<ProxyEngine>>,
    method: Method,
    Host(host): Host,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    engine.handle(method, host, target, headers, body).await
}

#[cfg(test)]
mod tests {
    use super::{engine::ProxyEngine, relay::MockUpstreamService, router};
    use crate::repository::store::MemoryStore;
    use crate::state::{Mode, SharedState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn any_path_should_reach_the_engine() {
        let state = Arc::new(SharedState::default());
        state.set_mode(Mode::Record).await;
        let origin = Arc::new(MockUpstreamService::new());
        origin.set("http://origin.example/deep/path?q=1", 200, "payload");
        let engine = Arc::new(ProxyEngine::new(
            state,
            Arc::new(MemoryStore::default()),
            origin,
        ));

        let request = Request::builder()
            .uri("/deep/path?q=1")
            .header("host", "origin.example")
            .body(Body::empty())
            .unwrap();
        let response = router(engine).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"payload");
    }
}
