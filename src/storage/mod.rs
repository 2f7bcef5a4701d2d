pub mod keys;
mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// String key/value persistence with optional expiry.
///
/// Expired entries read back as `None`.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// When an entry written at `now` with `ttl_seconds` expires.
///
/// TTLs past the representable date range never expire.
pub(crate) fn expires_at(now: DateTime<Utc>, ttl_seconds: Option<u64>) -> Option<DateTime<Utc>> {
    let ttl = i64::try_from(ttl_seconds?).ok()?;
    now.checked_add_signed(Duration::try_seconds(ttl)?)
}

pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse stored value for {key}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
    ttl_seconds: Option<u64>,
) -> Result<()> {
    let raw = serde_json::to_string(value).context("Failed to serialize value")?;
    store.set(key, raw, ttl_seconds).await
}
