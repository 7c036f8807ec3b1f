use clap::Args;
use reqwest::StatusCode;

const DEFAULT_ENDPOINT: &str = "127.0.0.1:5678";

/// One header-only GET against the control plane; anything but a 200
/// comes back as a printable failure.
async fn send(endpoint: &str, path: &str, header: &str, value: &str) -> Result<(), String> {
    let url = format!("http://{endpoint}{path}");
    let response = reqwest::Client::new()
        .get(&url)
        .header(header, value)
        .send()
        .await
        .map_err(|error| format!("failed to perform http request: {error}"))?;
    if response.status() != StatusCode::OK {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("got response code {status} with body:\n{body}"));
    }
    Ok(())
}

fn fail(message: String) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

/// Point the proxy at another build tag
#[derive(Args, Debug)]
pub struct TagCommand {
    /// Tag that identifies the current build
    name: String,
    /// Address of the control plane
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "CHRYSALIS_ENDPOINT")]
    endpoint: String,
}

impl TagCommand {
    pub async fn run(self) {
        if let Err(error) = send(&self.endpoint, "/tag", "Tag", &self.name).await {
            fail(format!("Failed to set the tag: {error}"));
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeName {
    Record,
    Playback,
    Standby,
}

impl ModeName {
    /// The wire value the control plane expects in the Mode header.
    fn as_header(self) -> &'static str {
        match self {
            Self::Record => "0",
            Self::Playback => "1",
            Self::Standby => "2",
        }
    }
}

/// Switch the proxy between record, playback and standby
#[derive(Args, Debug)]
pub struct ModeCommand {
    #[arg(value_enum)]
    mode: ModeName,
    /// Address of the control plane
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "CHRYSALIS_ENDPOINT")]
    endpoint: String,
}

impl ModeCommand {
    pub async fn run(self) {
        if let Err(error) = send(&self.endpoint, "/mode", "Mode", self.mode.as_header()).await {
            fail(format!("Failed to set mode: {error}"));
        }
    }
}

/// Tell the proxy which user the coming builds belong to
#[derive(Args, Debug)]
pub struct LoginCommand {
    /// Numeric user id
    id: u64,
    /// Address of the control plane
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "CHRYSALIS_ENDPOINT")]
    endpoint: String,
}

impl LoginCommand {
    pub async fn run(self) {
        if let Err(error) = send(&self.endpoint, "/login", "Id", &self.id.to_string()).await {
            fail(format!("Failed to login: {error}"));
        }
    }
}
