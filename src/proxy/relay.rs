use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    /// Where outbound lookups go. Never the host resolver: that one
    /// points back at our own DNS server and would loop forever.
    #[serde(default = "Config::default_resolver")]
    pub resolver: SocketAddr,
    #[serde(default = "Config::default_timeout")]
    pub timeout: u64,
    /// Cap on a whole upstream exchange, so a hung origin cannot pin a
    /// proxy task forever.
    #[serde(default = "Config::default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver: Self::default_resolver(),
            timeout: Self::default_timeout(),
            request_timeout: Self::default_request_timeout(),
        }
    }
}

impl Config {
    fn default_resolver() -> SocketAddr {
        SocketAddr::from(([8, 8, 8, 8], 53))
    }

    fn default_timeout() -> u64 {
        5
    }

    fn default_request_timeout() -> u64 {
        60
    }
}

impl Config {
    pub fn build(self) -> Result<RemoteUpstreamService> {
        RemoteUpstreamService::new(self)
    }
}

/// What came back from the origin server, body already drained.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[async_trait::async_trait]
pub trait UpstreamService {
    /// Mirror the inbound request to `http://{host}{target}` and collect
    /// the whole response.
    async fn relay(
        &self,
        method: Method,
        host: &str,
        target: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse>;
}

/// Resolver handed to reqwest so every outbound connection is looked up
/// through the configured public server instead of the host stack.
struct PinnedResolver {
    inner: TokioAsyncResolver,
}

impl PinnedResolver {
    fn new(address: SocketAddr, timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(address, Protocol::Udp));
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Resolve for PinnedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.inner.clone();
        Box::pin(async move {
            let lookup = resolver.lookup_ip(name.as_str()).await?;
            let addrs: Addrs = Box::new(lookup.into_iter().map(|addr| SocketAddr::new(addr, 0)));
            Ok(addrs)
        })
    }
}

pub struct RemoteUpstreamService {
    client: reqwest::Client,
}

impl RemoteUpstreamService {
    fn new(config: Config) -> Result<Self> {
        let resolver = PinnedResolver::new(config.resolver, Duration::from_secs(config.timeout));
        let client = reqwest::Client::builder()
            .dns_resolver(Arc::new(resolver))
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl UpstreamService for RemoteUpstreamService {
    #[tracing::instrument(skip(self, headers, body))]
    async fn relay(
        &self,
        method: Method,
        host: &str,
        target: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse> {
        let url = format!("http://{host}{target}");
        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error))?;
        tracing::debug!("upstream answered {status} with {} bytes", body.len());

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) struct MockUpstreamService {
    responses: std::sync::Mutex<std::collections::HashMap<String, UpstreamResponse>>,
}

#[cfg(test)]
impl MockUpstreamService {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    /// Install or overwrite what the fake origin serves for a URL.
    pub fn set(&self, url: &str, status: u16, body: &str) {
        let response = UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::copy_from_slice(body.as_bytes()),
        };
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn set_header(&self, url: &str, name: &'static str, value: &str) {
        let mut responses = self.responses.lock().unwrap();
        let response = responses.get_mut(url).unwrap();
        response.headers.insert(name, value.parse().unwrap());
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl UpstreamService for MockUpstreamService {
    async fn relay(
        &self,
        _method: Method,
        host: &str,
        target: &str,
        _headers: HeaderMap,
        _body: Bytes,
    ) -> Result<UpstreamResponse> {
        let url = format!("http://{host}{target}");
        self.responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("no origin behind {url}"),
                )
            })
    }
}
