//! Disk-backed cache store
//!
//! Persists each generation as one JSON document under a root directory,
//! so cached responses survive worker restarts. Writes go through a temp
//! file and rename, and a store-wide async mutex serializes mutations;
//! reads are lock-free.

use crate::error::{CacheError, CacheResult};
use crate::store::{CacheStore, RequestKey, ResponseSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// On-disk document for a single generation
#[derive(Debug, Serialize, Deserialize)]
struct GenerationFile {
    /// The real generation name; the file stem is a sanitized form
    name: String,
    /// When the generation was first opened, used for lookup order
    created_at: DateTime<Utc>,
    /// Key → snapshot entries
    entries: HashMap<String, ResponseSnapshot>,
}

impl GenerationFile {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: Utc::now(),
            entries: HashMap::new(),
        }
    }
}

/// File-per-generation persistent cache store
pub struct DiskStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Root directory this store persists under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a generation name to a filesystem-safe file stem
    fn sanitize(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", Self::sanitize(name)))
    }

    async fn load(&self, name: &str) -> CacheResult<Option<GenerationFile>> {
        let path = self.path_for(name);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::store_io(
                    format!("reading generation file {}", path.display()),
                    e,
                ))
            }
        };

        let file: GenerationFile = serde_json::from_slice(&content)?;
        if file.name != name {
            // Two distinct names sanitized to the same file stem
            return Err(CacheError::Internal(format!(
                "generation file {} holds '{}', expected '{}'",
                path.display(),
                file.name,
                name
            )));
        }
        Ok(Some(file))
    }

    async fn save(&self, file: &GenerationFile) -> CacheResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            CacheError::store_io(
                format!("creating cache directory {}", self.root.display()),
                e,
            )
        })?;

        let path = self.path_for(&file.name);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_vec(file)?;

        fs::write(&tmp, &content).await.map_err(|e| {
            CacheError::store_io(format!("writing generation file {}", tmp.display()), e)
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| {
            CacheError::store_io(format!("committing generation file {}", path.display()), e)
        })?;
        Ok(())
    }

    async fn load_all(&self) -> CacheResult<Vec<GenerationFile>> {
        let mut read_dir = match fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CacheError::store_io(
                    format!("listing cache directory {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
            CacheError::store_io(
                format!("listing cache directory {}", self.root.display()),
                e,
            )
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read(&path).await.map_err(|e| {
                CacheError::store_io(format!("reading generation file {}", path.display()), e)
            })?;
            match serde_json::from_slice::<GenerationFile>(&content) {
                Ok(file) => files.push(file),
                Err(e) => {
                    // A torn or foreign file must not take the store down
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable generation file"
                    );
                }
            }
        }

        files.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(files)
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn open(&self, name: &str) -> CacheResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.load(name).await?.is_none() {
            debug!(generation = name, "Creating cache generation on disk");
            self.save(&GenerationFile::new(name)).await?;
        }
        Ok(())
    }

    async fn put(
        &self,
        generation: &str,
        key: &RequestKey,
        snapshot: ResponseSnapshot,
    ) -> CacheResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self
            .load(generation)
            .await?
            .unwrap_or_else(|| GenerationFile::new(generation));
        file.entries.insert(key.as_str().to_string(), snapshot);
        self.save(&file).await
    }

    async fn match_in(
        &self,
        generation: &str,
        key: &RequestKey,
    ) -> CacheResult<Option<ResponseSnapshot>> {
        Ok(self
            .load(generation)
            .await?
            .and_then(|f| f.entries.get(key.as_str()).cloned()))
    }

    async fn match_any(&self, key: &RequestKey) -> CacheResult<Option<ResponseSnapshot>> {
        for file in self.load_all().await? {
            if let Some(snapshot) = file.entries.get(key.as_str()) {
                return Ok(Some(snapshot.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(generation = name, "Deleted cache generation from disk");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::store_io(
                format!("deleting generation file {}", path.display()),
                e,
            )),
        }
    }

    async fn list_names(&self) -> CacheResult<Vec<String>> {
        Ok(self.load_all().await?.into_iter().map(|f| f.name).collect())
    }
}
