use futures::stream::StreamExt;
use prelude::Datagram;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

pub mod prelude;
pub mod receiver;
pub mod sender;

/// Turns one inbound datagram into at most one reply.
///
/// Returning `None` drops the datagram: the server logs nothing on its
/// own, the handler is expected to have said why.
#[async_trait::async_trait]
pub trait Handler {
    async fn handle(&self, datagram: Datagram) -> Option<Datagram>;
}

pub struct UdpServer<H> {
    address: SocketAddr,
    handler: H,
}

impl<H: Handler> UdpServer<H> {
    pub fn new(address: SocketAddr, handler: H) -> Self {
        Self { address, handler }
    }

    pub async fn run(&self) -> std::io::Result<()> {
        let socket = UdpSocket::bind(self.address).await?;
        tracing::info!("listening on {}", self.address);
        let socket = Arc::new(socket);

        let receiver = receiver::Receiver::new(socket.clone());
        let sender = sender::Sender::new(socket);

        let handler = &self.handler;
        let stream = receiver
            .into_stream()
            .map(|item| handler.handle(item))
            .buffer_unordered(64);

        tokio::pin!(stream);

        while let Some(item) = stream.next().await {
            let Some(item) = item else {
                continue;
            };
            if let Err(error) = sender.send(&item).await {
                tracing::error!("couldn't send datagram to {:?}: {error:?}", item.address);
            }
        }

        Ok(())
    }
}
