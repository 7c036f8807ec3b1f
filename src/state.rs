use std::fmt::Display;
use tokio::sync::RwLock;

/// Tag every recording lands under until somebody picks a real one.
pub const DEFAULT_TAG: &str = "shoop da woop";

/// What the proxy does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fetch upstream and remember the response
    Record,
    /// Serve only what was recorded, never touch the network
    Playback,
    /// Pass through untouched
    Standby,
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidMode(pub u8);

impl Display for InvalidMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not a valid mode", self.0)
    }
}

impl std::error::Error for InvalidMode {}

impl TryFrom<u8> for Mode {
    type Error = InvalidMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Record),
            1 => Ok(Self::Playback),
            2 => Ok(Self::Standby),
            other => Err(InvalidMode(other)),
        }
    }
}

/// One coherent view of the build-serial globals, taken at request
/// entry. Control-plane writes landing later do not move a request that
/// already holds its snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub mode: Mode,
    pub tag: String,
    pub user: u64,
}

/// The process-wide mutable trio: mode, active tag, active user.
#[derive(Debug)]
pub struct SharedState {
    inner: RwLock<Snapshot>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                mode: Mode::Standby,
                tag: DEFAULT_TAG.to_string(),
                user: 0,
            }),
        }
    }
}

impl SharedState {
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.clone()
    }

    pub async fn set_mode(&self, mode: Mode) {
        self.inner.write().await.mode = mode;
    }

    pub async fn set_tag(&self, tag: String) {
        self.inner.write().await.tag = tag;
    }

    pub async fn set_user(&self, user: u64) {
        self.inner.write().await.user = user;
    }
}
