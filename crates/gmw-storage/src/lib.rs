//! HTTP fetch wrapper and snapshot persistence for Guitar Market Watch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use gmw_core::{Snapshot, StoreKey};
use thiserror::Error;
use tokio::fs;
use tracing::{info, info_span, warn};

pub const CRATE_NAME: &str = "gmw-storage";

/// Browser-like user-agent; several of the monitored sites serve reduced
/// markup to obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

/// Thin GET wrapper: fixed timeout, custom user-agent, no retry. A failed
/// source is the caller's problem to recover from.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .context("building reqwest client")?;
        Ok(Self { client })
    }

    pub async fn fetch_page(&self, store: StoreKey, url: &str) -> Result<String, FetchError> {
        let span = info_span!("http_fetch", store = store.as_str(), url);
        let _guard = span.enter();

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: final_url,
            });
        }
        Ok(resp.text().await?)
    }
}

/// Persists the full snapshot across runs as a pretty-printed JSON document.
///
/// Read once at run start, written once at run end; the write replaces the
/// previous document wholesale.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous run's snapshot. An absent file means first run; an
    /// unreadable or unparseable file is logged and treated the same way.
    pub async fn load(&self) -> Snapshot {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no previous snapshot; first run");
                return Snapshot::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "snapshot unreadable; treating as empty");
                return Snapshot::new();
            }
        };
        match serde_json::from_str(&text) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "snapshot unparseable; treating as empty");
                Snapshot::new()
            }
        }
    }

    /// Writes the snapshot atomically: serialize, write a temp sibling, then
    /// rename over the previous document.
    pub async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot).context("serializing snapshot")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, &bytes)
            .await
            .with_context(|| format!("writing {}", temp_path.display()))?;
        if let Err(err) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err).with_context(|| {
                format!(
                    "renaming {} -> {}",
                    temp_path.display(),
                    self.path.display()
                )
            });
        }

        let total: usize = snapshot.values().map(Vec::len).sum();
        info!(path = %self.path.display(), records = total, "snapshot persisted");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gmw_core::ProductRecord;
    use tempfile::tempdir;

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            StoreKey::Ikebe,
            vec![ProductRecord::new(
                StoreKey::Ikebe,
                "Gibson J-45 Vintage",
                "¥120,000".to_string(),
                "https://www.ikebe-gakki.com/item/1".to_string(),
                Utc::now(),
            )],
        );
        snapshot.insert(StoreKey::Qsic, Vec::new());
        snapshot
    }

    #[tokio::test]
    async fn absent_file_loads_as_empty() {
        let dir = tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("missing.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{not json").expect("write");
        let store = SnapshotStore::new(path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let dir = tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));
        let snapshot = sample_snapshot();

        store.save(&snapshot).await.expect("save");
        let loaded = store.load().await;

        assert_eq!(loaded, snapshot);
        assert!(!dir.path().join(".snapshot.json.tmp").exists());
    }

    #[tokio::test]
    async fn save_replaces_previous_document_wholesale() {
        let dir = tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        store.save(&sample_snapshot()).await.expect("first save");
        let empty = Snapshot::new();
        store.save(&empty).await.expect("second save");

        assert!(store.load().await.is_empty());
    }
}
