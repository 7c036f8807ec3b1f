use crate::proxy::relay::{UpstreamResponse, UpstreamService};
use crate::repository::store::{Artifact, ArtifactStore, StoreError};
use crate::state::{Mode, SharedState, Snapshot};
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::sync::Arc;

/// Decides what a proxied request becomes: a recorded upstream fetch, a
/// replay from the store, or a plain passthrough. The build-serial
/// globals are read exactly once per request, so a control-plane write
/// cannot tear a request halfway through.
pub(crate) struct ProxyEngine {
    state: Arc<SharedState>,
    store: Arc<dyn ArtifactStore + Send + Sync>,
    upstream: Arc<dyn UpstreamService + Send + Sync>,
}

impl ProxyEngine {
    pub fn new(
        state: Arc<SharedState>,
        store: Arc<dyn ArtifactStore + Send + Sync>,
        upstream: Arc<dyn UpstreamService + Send + Sync>,
    ) -> Self {
        Self {
            state,
            store,
            upstream,
        }
    }

    pub async fn handle(
        &self,
        method: Method,
        host: String,
        target: String,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let snapshot = self.state.snapshot().await;
        let full_url = format!("{host}{target}");
        tracing::info!("received a {method} request to {full_url}");

        match snapshot.mode {
            Mode::Record => {
                self.record(&snapshot, &full_url, method, &host, &target, headers, body)
                    .await
            }
            Mode::Playback => self.playback(&snapshot, &full_url).await,
            Mode::Standby => self.standby(method, &host, &target, headers, body).await,
        }
    }

    /// Fetch upstream, hand the response to the client as-is, and bind
    /// the body under (user, tag, url). The client response is already
    /// decided when the cache runs, so a failing cache write can only be
    /// logged, never reported.
    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        snapshot: &Snapshot,
        full_url: &str,
        method: Method,
        host: &str,
        target: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let response = match self.upstream.relay(method, host, target, headers, body).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!("failed to relay request to upstream: {error}");
                return proxy_error();
            }
        };

        let artifact = Artifact::new(response.body.to_vec());
        match self
            .store
            .get_artifact(full_url, &snapshot.tag, snapshot.user)
            .await
        {
            Ok(existing) if existing.as_ref() == &artifact => {
                if let Err(error) = self
                    .store
                    .tag_artifact(existing, &snapshot.tag, full_url, snapshot.user)
                    .await
                {
                    tracing::error!("failed to alias recorded artifact: {error}");
                }
            }
            Ok(_) | Err(StoreError::NotFound(_)) => {
                if let Err(error) = self
                    .store
                    .add_artifact(artifact, full_url, &snapshot.tag, snapshot.user)
                    .await
                {
                    tracing::error!("failed to record artifact: {error}");
                }
            }
            Err(error) => {
                tracing::error!("failed to look up recorded artifact: {error}");
            }
        }

        mirror(response)
    }

    /// Serve the recorded body and nothing else: one Content-Length
    /// header, no replay of the original response headers.
    async fn playback(&self, snapshot: &Snapshot, full_url: &str) -> Response {
        match self
            .store
            .get_artifact(full_url, &snapshot.tag, snapshot.user)
            .await
        {
            Ok(artifact) => {
                let mut response = Response::new(Body::from(artifact.data().to_vec()));
                response
                    .headers_mut()
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(artifact.len()));
                response
            }
            Err(error) => {
                // a playback miss means the build fetched something that
                // was never recorded, which is fatal for reproducibility
                tracing::error!("failed to retrieve artifact for {full_url}: {error}");
                (StatusCode::INTERNAL_SERVER_ERROR, "retrieve failed").into_response()
            }
        }
    }

    async fn standby(
        &self,
        method: Method,
        host: &str,
        target: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        match self.upstream.relay(method, host, target, headers, body).await {
            Ok(response) => mirror(response),
            Err(error) => {
                tracing::error!("failed to relay request to upstream: {error}");
                proxy_error()
            }
        }
    }
}

fn proxy_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error creating proxy request",
    )
        .into_response()
}

/// Rebuild the upstream response for the client: status, headers and
/// body copied one to one.
fn mirror(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = upstream.headers;
    response
}

#[cfg(test)]
mod tests {
    use super::ProxyEngine;
    use crate::proxy::relay::MockUpstreamService;
    use crate::repository::store::MemoryStore;
    use crate::state::{Mode, SharedState};
    use axum::http::{HeaderMap, Method, StatusCode};
    use axum::response::Response;
    use bytes::Bytes;
    use std::sync::Arc;

    struct Harness {
        engine: ProxyEngine,
        state: Arc<SharedState>,
        origin: Arc<MockUpstreamService>,
    }

    fn harness() -> Harness {
        let state = Arc::new(SharedState::default());
        let origin = Arc::new(MockUpstreamService::new());
        let engine = ProxyEngine::new(
            state.clone(),
            Arc::new(MemoryStore::default()),
            origin.clone(),
        );
        Harness {
            engine,
            state,
            origin,
        }
    }

    impl Harness {
        async fn get(&self, host: &str, target: &str) -> Response {
            self.engine
                .handle(
                    Method::GET,
                    host.to_string(),
                    target.to_string(),
                    HeaderMap::new(),
                    Bytes::new(),
                )
                .await
        }
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn playback_should_return_what_record_saw() {
        let harness = harness();
        harness.state.set_mode(Mode::Record).await;
        harness.state.set_tag("t1".into()).await;
        harness.origin.set("http://origin.example/a", 200, "v1");

        let response = harness.get("origin.example", "/a").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, "v1");

        // upstream moves on, the recording must not
        harness.origin.set("http://origin.example/a", 200, "v2");
        harness.state.set_mode(Mode::Playback).await;

        let response = harness.get("origin.example", "/a").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-length").unwrap(),
            &"2".parse::<axum::http::HeaderValue>().unwrap()
        );
        assert_eq!(body_of(response).await, "v1");
    }

    #[tokio::test]
    async fn playback_should_fail_on_a_url_never_recorded() {
        let harness = harness();
        harness.state.set_mode(Mode::Playback).await;
        harness.state.set_tag("t1".into()).await;

        let response = harness.get("origin.example", "/c").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, "retrieve failed");
    }

    #[tokio::test]
    async fn playback_should_fail_for_an_unknown_user() {
        let harness = harness();
        harness.state.set_mode(Mode::Playback).await;
        harness.state.set_user(9).await;

        let response = harness.get("origin.example", "/a").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn standby_should_mirror_upstream() {
        let harness = harness();
        harness.origin.set("http://origin.example/a", 200, "v2");
        harness
            .origin
            .set_header("http://origin.example/a", "content-type", "text/plain");
        harness.origin.set("http://origin.example/DNE", 404, "gone");

        let response = harness.get("origin.example", "/a").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain"
        );
        assert_eq!(body_of(response).await, "v2");

        let response = harness.get("origin.example", "/DNE").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, "gone");
    }

    #[tokio::test]
    async fn record_should_mirror_upstream_headers() {
        let harness = harness();
        harness.state.set_mode(Mode::Record).await;
        harness.origin.set("http://origin.example/a", 200, "v1");
        harness
            .origin
            .set_header("http://origin.example/a", "content-type", "application/gzip");

        let response = harness.get("origin.example", "/a").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/gzip"
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_should_become_a_500() {
        let harness = harness();
        for mode in [Mode::Record, Mode::Standby] {
            harness.state.set_mode(mode).await;
            let response = harness.get("origin.example", "/nowhere").await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_of(response).await, "Error creating proxy request");
        }
    }

    #[tokio::test]
    async fn rerecording_a_changed_body_should_replace_the_binding() {
        let harness = harness();
        harness.state.set_mode(Mode::Record).await;
        harness.state.set_tag("t1".into()).await;
        harness.origin.set("http://origin.example/a", 200, "v1");
        harness.get("origin.example", "/a").await;

        harness.origin.set("http://origin.example/a", 200, "v2");
        harness.get("origin.example", "/a").await;

        harness.state.set_mode(Mode::Playback).await;
        let response = harness.get("origin.example", "/a").await;
        assert_eq!(body_of(response).await, "v2");
    }

    #[tokio::test]
    async fn rerecording_the_same_body_should_keep_serving_it() {
        let harness = harness();
        harness.state.set_mode(Mode::Record).await;
        harness.state.set_tag("t1".into()).await;
        harness.origin.set("http://origin.example/a", 200, "v1");
        harness.get("origin.example", "/a").await;
        harness.get("origin.example", "/a").await;

        harness.state.set_mode(Mode::Playback).await;
        let response = harness.get("origin.example", "/a").await;
        assert_eq!(body_of(response).await, "v1");
    }

    #[tokio::test]
    async fn recordings_should_be_scoped_to_their_tag() {
        let harness = harness();
        harness.state.set_mode(Mode::Record).await;
        harness.state.set_tag("t1".into()).await;
        harness.origin.set("http://origin.example/a", 200, "v1");
        harness.get("origin.example", "/a").await;

        harness.state.set_mode(Mode::Playback).await;
        harness.state.set_tag("t2".into()).await;
        let response = harness.get("origin.example", "/a").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
