use crate::prelude::Datagram;
use async_stream::stream;
use futures_core::stream::Stream;
use std::sync::Arc;
use tokio::net::UdpSocket;

#[derive(Debug)]
pub struct Receiver {
    socket: Arc<UdpSocket>,
}

impl Receiver {
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        Self { socket }
    }

    async fn receive(&self) -> std::io::Result<Datagram> {
        let mut buffer = [0u8; 512];
        let (size, address) = self.socket.recv_from(&mut buffer).await?;
        Ok(Datagram {
            address,
            buffer,
            size,
        })
    }

    pub fn into_stream(self) -> impl Stream<Item = Datagram> {
        stream! {
            while let Ok(datagram) = self.receive().await {
                tracing::debug!("received datagram from {:?}", datagram.address);
                yield datagram;
            }
        }
    }
}
