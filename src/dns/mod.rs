use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub(crate) mod handler;

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: IpAddr,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    /// The one address every lookup resolves to: wherever the proxy
    /// listens.
    #[serde(default = "Config::default_answer")]
    pub answer: Ipv4Addr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            answer: Self::default_answer(),
        }
    }
}

impl Config {
    fn default_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    fn default_port() -> u16 {
        53
    }

    fn default_answer() -> Ipv4Addr {
        Ipv4Addr::new(127, 0, 0, 1)
    }
}

impl Config {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}
