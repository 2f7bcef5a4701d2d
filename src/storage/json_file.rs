use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{expires_at, KeyValueStore};
use crate::clock::Clock;

const NAMESPACE: Uuid = Uuid::from_u128(0x6a0f_5c2e_91d4_4b7a_8e33_2f1c_d07b_94e1);

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    expires_at: Option<DateTime<Utc>>,
    value: String,
}

/// File-backed store, one JSON envelope per key.
///
/// Directory structure:
/// ```text
/// data/
///   cache/
///     {key}.json
/// ```
///
/// Keys that are not safe as a single path segment are hashed to a UUIDv5.
pub struct JsonFileStore {
    base_path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonFileStore {
    pub fn new(base_path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            clock,
        }
    }

    fn cache_dir(&self) -> PathBuf {
        self.base_path.join("cache")
    }

    fn entry_file(&self, key: &str) -> PathBuf {
        self.cache_dir().join(format!("{}.json", file_stem(key)))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }
        Ok(())
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read file"),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir(path).await?;
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .context("Failed to write file")?;
        fs::rename(&tmp, path)
            .await
            .context("Failed to move file into place")?;
        Ok(())
    }
}

fn is_path_safe(value: &str) -> bool {
    if value.is_empty() || value == "." || value == ".." {
        return false;
    }
    !value.chars().any(|c| c == '/' || c == '\\' || c == '\0')
}

fn file_stem(key: &str) -> String {
    if is_path_safe(key) {
        key.to_string()
    } else {
        Uuid::new_v5(&NAMESPACE, key.as_bytes()).to_string()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_file(key);
        let Some(envelope) = self.read_json::<Envelope>(&path).await? else {
            return Ok(None);
        };
        if envelope.expires_at.is_some_and(|at| at <= self.clock.now()) {
            debug!(key, "cache entry expired");
            return Ok(None);
        }
        Ok(Some(envelope.value))
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()> {
        let expires_at = expires_at(self.clock.now(), ttl_seconds);
        let path = self.entry_file(key);
        self.write_json(&path, &Envelope { expires_at, value }).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_file(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove file"),
        }
    }
}
