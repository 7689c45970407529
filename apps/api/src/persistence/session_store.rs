//! Session-scoped key/value slots used while a resume is being edited.
//!
//! Redis in production; an in-process map when Redis is unavailable and in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    /// Reads and deletes in one step. A second `take` of the same key sees nothing.
    async fn take(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError>;
}

/// The three slots kept per `(owner, resume)`.
#[derive(Debug, Clone)]
pub struct SessionKeys {
    pub import_staging: String,
    pub session_backup: String,
    pub import_adopted: String,
}

impl SessionKeys {
    pub fn new(owner: Uuid, resume_id: Uuid) -> Self {
        let prefix = format!("cvforge:{owner}:{resume_id}");
        Self {
            import_staging: format!("{prefix}:import_staging"),
            session_backup: format!("{prefix}:session_backup"),
            import_adopted: format!("{prefix}:import_adopted"),
        }
    }
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    /// Opens the client and checks that a connection can be made.
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(Self { client, ttl_secs })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, SessionStoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("GETDEL")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?)
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Process-local store. Entries never expire.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.entries.lock().await.remove(key))
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
