use crate::dns::handler::DnsHandler;
use chrysalis_server::UdpServer;
use clap::Args;

/// Starts the DNS server that steers every lookup at the proxy
#[derive(Args, Debug)]
pub struct Command;

impl Command {
    pub async fn run(&self, config: crate::config::Config) {
        tracing::info!("preparing dns server");
        let handler = DnsHandler::new(config.dns.answer);

        let address = config.dns.address();
        tracing::info!("starting dns server on {address:?}");
        UdpServer::new(address, handler)
            .run()
            .await
            .expect("unable to run udp server")
    }
}
