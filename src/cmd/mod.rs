pub mod client;
pub mod dns;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Recording and replaying caching proxy for deterministic builds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        default_value = "/etc/chrysalis/chrysalis.toml",
        env = "CONFIG_PATH"
    )]
    config_path: PathBuf,
    #[command(subcommand)]
    inner: Commands,
}

impl Args {
    pub async fn run(self) {
        match self.inner {
            Commands::Serve(inner) => {
                inner
                    .run(crate::config::Config::load(&self.config_path))
                    .await
            }
            Commands::Dns(inner) => {
                inner
                    .run(crate::config::Config::load(&self.config_path))
                    .await
            }
            Commands::Tag(inner) => inner.run().await,
            Commands::Mode(inner) => inner.run().await,
            Commands::Login(inner) => inner.run().await,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the control plane and both proxy listeners
    Serve(serve::Command),
    /// Start the stub DNS server
    Dns(dns::Command),
    /// Point the proxy at another build tag
    Tag(client::TagCommand),
    /// Switch the proxy between record, playback and standby
    Mode(client::ModeCommand),
    /// Tell the proxy which user the coming builds belong to
    Login(client::LoginCommand),
}
