use crate::state::{Mode, SharedState};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: IpAddr,
    #[serde(default = "Config::default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl Config {
    fn default_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    fn default_port() -> u16 {
        5678
    }
}

impl Config {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

/// The endpoints a build driver uses to steer the proxy. Everything
/// travels in headers, bodies stay empty.
pub(crate) fn router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/tag", get(set_tag))
        .route("/mode", get(set_mode))
        .route("/login", get(login))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

async fn set_tag(State(state): State<Arc<SharedState>>, headers: HeaderMap) -> Response {
    let Some(tag) = headers.get("tag") else {
        return (StatusCode::BAD_REQUEST, "No 'Tag' header was passed").into_response();
    };
    let Ok(tag) = tag.to_str() else {
        return (StatusCode::BAD_REQUEST, "The 'Tag' header is not valid text").into_response();
    };
    // the empty string passes through and names a tag like any other
    tracing::info!("switching to tag {tag:?}");
    state.set_tag(tag.to_string()).await;
    StatusCode::OK.into_response()
}

async fn set_mode(State(state): State<Arc<SharedState>>, headers: HeaderMap) -> Response {
    let Some(mode) = headers.get("mode") else {
        return (StatusCode::BAD_REQUEST, "No 'Mode' header was passed").into_response();
    };
    let mode = match mode.to_str().map(|value| value.parse::<u8>()) {
        Ok(Ok(mode)) => mode,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "Failed to change mode: not an unsigned 8-bit integer",
            )
                .into_response()
        }
    };
    let mode = match Mode::try_from(mode) {
        Ok(mode) => mode,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Failed to change mode: {error}"),
            )
                .into_response()
        }
    };
    tracing::info!("switching to mode {mode:?}");
    state.set_mode(mode).await;
    StatusCode::OK.into_response()
}

async fn login(State(state): State<Arc<SharedState>>, headers: HeaderMap) -> Response {
    let Some(id) = headers.get("id") else {
        return (StatusCode::BAD_REQUEST, "No 'Id' header was passed").into_response();
    };
    let id = match id.to_str().map(|value| value.parse::<u64>()) {
        Ok(Ok(id)) => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "Invalid ID: not an unsigned 64-bit integer",
            )
                .into_response()
        }
    };
    tracing::info!("switching to user {id}");
    state.set_user(id).await;
    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use super::router;
    use crate::state::{Mode, SharedState, DEFAULT_TAG};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn send(
        state: &Arc<SharedState>,
        path: &str,
        header: Option<(&str, &str)>,
    ) -> StatusCode {
        let mut request = Request::builder().uri(path);
        if let Some((name, value)) = header {
            request = request.header(name, value);
        }
        let request = request.body(Body::empty()).unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        response.status()
    }

    #[tokio::test]
    async fn health_should_answer() {
        let state = Arc::new(SharedState::default());
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"healthy");
    }

    #[tokio::test]
    async fn mode_should_accept_the_three_variants_and_nothing_else() {
        let state = Arc::new(SharedState::default());
        for (value, expected, mode) in [
            ("1", StatusCode::OK, Mode::Playback),
            ("0", StatusCode::OK, Mode::Record),
            ("2", StatusCode::OK, Mode::Standby),
            ("244", StatusCode::BAD_REQUEST, Mode::Standby),
            ("69", StatusCode::BAD_REQUEST, Mode::Standby),
            ("-1", StatusCode::BAD_REQUEST, Mode::Standby),
            ("1000", StatusCode::BAD_REQUEST, Mode::Standby),
            ("woof", StatusCode::BAD_REQUEST, Mode::Standby),
        ] {
            let status = send(&state, "/mode", Some(("Mode", value))).await;
            assert_eq!(status, expected, "mode {value}");
            assert_eq!(state.snapshot().await.mode, mode, "mode {value}");
            // park back in standby before the next round
            send(&state, "/mode", Some(("Mode", "2"))).await;
        }
    }

    #[tokio::test]
    async fn mode_should_require_its_header() {
        let state = Arc::new(SharedState::default());
        let status = send(&state, "/mode", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.snapshot().await.mode, Mode::Standby);
    }

    #[tokio::test]
    async fn tag_should_accept_anything_including_empty() {
        let state = Arc::new(SharedState::default());
        for value in ["release-7", "nightly 2024 02", ""] {
            let status = send(&state, "/tag", Some(("Tag", value))).await;
            assert_eq!(status, StatusCode::OK, "tag {value:?}");
            assert_eq!(state.snapshot().await.tag, value, "tag {value:?}");
        }
    }

    #[tokio::test]
    async fn tag_should_require_its_header() {
        let state = Arc::new(SharedState::default());
        let status = send(&state, "/tag", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.snapshot().await.tag, DEFAULT_TAG);
    }

    #[tokio::test]
    async fn login_should_parse_unsigned_decimal_ids() {
        let state = Arc::new(SharedState::default());
        for (value, expected, user) in [
            ("420", StatusCode::OK, 420),
            ("4200", StatusCode::OK, 4200),
            ("0", StatusCode::OK, 0),
            ("-1", StatusCode::BAD_REQUEST, 0),
            ("", StatusCode::BAD_REQUEST, 0),
            ("caterpillar", StatusCode::BAD_REQUEST, 0),
        ] {
            let status = send(&state, "/login", Some(("Id", value))).await;
            assert_eq!(status, expected, "id {value:?}");
            assert_eq!(state.snapshot().await.user, user, "id {value:?}");
            send(&state, "/login", Some(("Id", "0"))).await;
        }
    }
}
