use md5::{Digest, Md5};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;

/// An immutable recorded response body, addressed by its content.
#[derive(Debug, Clone)]
pub struct Artifact {
    hash: String,
    data: Vec<u8>,
}

impl Artifact {
    pub fn new(data: Vec<u8>) -> Self {
        let hash = hex::encode(Md5::digest(&data));
        Self { hash, data }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PartialEq for Artifact {
    /// Equal hashes are not trusted on their own: the bytes must agree
    /// too.
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.data == other.data
    }
}

impl Eq for Artifact {}

#[derive(Debug, PartialEq, Eq)]
pub enum StoreError {
    NoSuchUser(u64),
    NotFound(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchUser(id) => write!(f, "no user with id {id}"),
            Self::NotFound(url) => write!(f, "no artifact recorded for {url}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A named snapshot: full URL to the artifact recorded under it. Tags
/// alias artifacts by reference, they never copy them.
#[derive(Debug, Default)]
struct Tag {
    artifacts: HashMap<String, Arc<Artifact>>,
}

#[derive(Debug)]
pub struct User {
    pub id: u64,
    tags: HashMap<String, Tag>,
}

impl User {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            tags: HashMap::new(),
        }
    }
}

/// The capabilities the proxy engine needs from a store.
#[async_trait::async_trait]
pub trait ArtifactStore {
    async fn add_user(&self, user: User);

    async fn get_artifact(
        &self,
        url: &str,
        tag: &str,
        user_id: u64,
    ) -> Result<Arc<Artifact>, StoreError>;

    async fn add_artifact(
        &self,
        artifact: Artifact,
        url: &str,
        tag: &str,
        user_id: u64,
    ) -> Result<(), StoreError>;

    async fn tag_artifact(
        &self,
        artifact: Arc<Artifact>,
        tag: &str,
        url: &str,
        user_id: u64,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    /// Every artifact ever stored, in arrival order, one per content
    /// hash.
    artifacts: Vec<Arc<Artifact>>,
    /// User id is the index into the registry.
    users: Vec<User>,
}

impl Inner {
    fn tag(&mut self, user_id: u64, tag: &str) -> Result<&mut Tag, StoreError> {
        let user = self
            .users
            .get_mut(user_id as usize)
            .ok_or(StoreError::NoSuchUser(user_id))?;
        Ok(user.tags.entry(tag.to_string()).or_default())
    }
}

/// In-memory store. A single lock guards both the ordered artifact list
/// and the user registry so the duplicate scan and the append cannot
/// interleave across writers.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    /// Starts with the lone user 0.
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                artifacts: Vec::new(),
                users: vec![User::new(0)],
            }),
        }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for MemoryStore {
    async fn add_user(&self, user: User) {
        tracing::debug!("registering user {}", user.id);
        self.inner.lock().await.users.push(user);
    }

    #[tracing::instrument(skip(self))]
    async fn get_artifact(
        &self,
        url: &str,
        tag: &str,
        user_id: u64,
    ) -> Result<Arc<Artifact>, StoreError> {
        let mut inner = self.inner.lock().await;
        let tag = inner.tag(user_id, tag)?;
        tag.artifacts
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(url.to_string()))
    }

    #[tracing::instrument(skip(self, artifact))]
    async fn add_artifact(
        &self,
        artifact: Artifact,
        url: &str,
        tag: &str,
        user_id: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let Inner { artifacts, users } = &mut *inner;
        let user = users
            .get_mut(user_id as usize)
            .ok_or(StoreError::NoSuchUser(user_id))?;
        let tag = user.tags.entry(tag.to_string()).or_default();

        let stored = if let Some(existing) = tag
            .artifacts
            .values()
            .find(|existing| existing.as_ref() == &artifact)
        {
            existing.clone()
        } else if let Some(existing) = artifacts
            .iter()
            .find(|existing| existing.hash() == artifact.hash())
        {
            existing.clone()
        } else {
            let artifact = Arc::new(artifact);
            artifacts.push(artifact.clone());
            artifact
        };
        tag.artifacts.insert(url.to_string(), stored);

        Ok(())
    }

    #[tracing::instrument(skip(self, artifact))]
    async fn tag_artifact(
        &self,
        artifact: Arc<Artifact>,
        tag: &str,
        url: &str,
        user_id: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let tag = inner.tag(user_id, tag)?;
        tag.artifacts.insert(url.to_string(), artifact);

        Ok(())
    }
}
