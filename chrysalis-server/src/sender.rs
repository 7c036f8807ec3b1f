use crate::prelude::Datagram;
use std::sync::Arc;
use tokio::net::UdpSocket;

#[derive(Debug)]
pub struct Sender {
    socket: Arc<UdpSocket>,
}

impl Sender {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        Self { socket }
    }

    pub async fn send(&self, datagram: &Datagram) -> std::io::Result<()> {
        let Datagram {
            address,
            buffer,
            size,
        } = datagram;
        tracing::debug!("sending datagram to {:?}", address);
        self.socket.send_to(&buffer[0..*size], address).await?;
        Ok(())
    }
}
