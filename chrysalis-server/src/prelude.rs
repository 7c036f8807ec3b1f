use std::net::SocketAddr;

/// One UDP datagram and where it came from or goes to.
pub struct Datagram {
    pub address: SocketAddr,
    pub buffer: [u8; 512],
    pub size: usize,
}
