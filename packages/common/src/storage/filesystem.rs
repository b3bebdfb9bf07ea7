use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::category::AttachmentCategory;
use super::error::StorageError;
use super::naming::{is_flat_file_name, sanitize_tag};
use super::traits::{AttachmentSet, AttachmentStore, DeletionFailure, DeletionReport, Upload};

/// Filesystem-backed attachment store.
///
/// Layout: `{public_dir}/uploads/{category folder}/{file}`. Writes go through
/// `{public_dir}/.tmp` and are renamed into place, so a reader never sees a
/// partially written file.
///
/// Index allocation and the write that consumes the index happen under a
/// per-(prefix, category) lock, so concurrent uploads for the same asset get
/// distinct indices.
pub struct FilesystemAttachmentStore {
    public_dir: PathBuf,
    max_size: u64,
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
}

impl FilesystemAttachmentStore {
    /// Create a new store rooted at `public_dir`.
    pub async fn new(public_dir: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(public_dir.join("uploads")).await?;
        fs::create_dir_all(public_dir.join(".tmp")).await?;
        Ok(Self {
            public_dir,
            max_size,
            locks: DashMap::new(),
        })
    }

    /// Directory served under `/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }

    fn folder_path(&self, category: AttachmentCategory) -> PathBuf {
        self.uploads_dir().join(category.folder())
    }

    fn temp_path(&self) -> PathBuf {
        self.public_dir
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn lock(&self, prefix: &str, category: AttachmentCategory) -> KeyGuard<'_> {
        let key = (prefix.to_string(), category);
        let lock = self.locks.entry(key.clone()).or_default().clone();
        KeyGuard {
            guard: Some(lock.lock_owned().await),
            locks: &self.locks,
            key,
        }
    }

    /// Sorted names in the category folder that belong to `prefix`.
    async fn matching(
        &self,
        prefix: &str,
        category: AttachmentCategory,
    ) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = list_file_names(&self.folder_path(category))
            .await?
            .into_iter()
            .filter(|name| category.matches(prefix, name))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn scan_next_index(
        &self,
        prefix: &str,
        category: AttachmentCategory,
    ) -> Result<u32, StorageError> {
        let max = list_file_names(&self.folder_path(category))
            .await?
            .iter()
            .filter_map(|name| category.index_of(prefix, name))
            .max();
        Ok(max.map_or(1, |n| n.saturating_add(1)))
    }

    async fn write_atomic(&self, target: &Path, data: &[u8]) -> Result<(), StorageError> {
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

/// Names of regular files in `dir`. An absent directory has none.
async fn list_file_names(dir: &Path) -> Result<Vec<String>, StorageError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}

fn check_prefix(prefix: &str) -> Result<(), StorageError> {
    if prefix.is_empty() || sanitize_tag(prefix) != prefix {
        return Err(StorageError::InvalidName(format!(
            "'{prefix}' is not a sanitized asset prefix"
        )));
    }
    Ok(())
}

type LockKey = (String, AttachmentCategory);

/// Holds a per-key lock and drops the map entry once nobody else wants it.
struct KeyGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<LockKey, Arc<Mutex<()>>>,
    key: LockKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Release before counting, the guard holds a reference too.
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[async_trait]
impl AttachmentStore for FilesystemAttachmentStore {
    async fn save(
        &self,
        prefix: &str,
        category: AttachmentCategory,
        upload: &Upload,
    ) -> Result<String, StorageError> {
        check_prefix(prefix)?;

        let size = upload.data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let _guard = self.lock(prefix, category).await;

        let dir = self.folder_path(category);
        fs::create_dir_all(&dir).await?;

        let index = if category.is_indexed() {
            self.scan_next_index(prefix, category).await?
        } else {
            0
        };
        let name = category.stored_name(prefix, index, &upload.file_name);
        self.write_atomic(&dir.join(&name), &upload.data).await?;

        if !category.is_indexed() {
            for stale in self.matching(prefix, category).await? {
                if stale == name {
                    continue;
                }
                if let Err(e) = fs::remove_file(dir.join(&stale)).await {
                    warn!(file = %stale, error = %e, "Failed to remove replaced attachment");
                }
            }
        }

        debug!(file = %name, size, "Stored attachment");
        Ok(category.url(&name))
    }

    async fn next_index(
        &self,
        prefix: &str,
        category: AttachmentCategory,
    ) -> Result<u32, StorageError> {
        check_prefix(prefix)?;
        self.scan_next_index(prefix, category).await
    }

    async fn lookup(&self, prefix: &str) -> Result<AttachmentSet, StorageError> {
        check_prefix(prefix)?;

        let mut set = AttachmentSet::default();
        for &category in AttachmentCategory::ALL {
            let names = self.matching(prefix, category).await?;
            if category.is_indexed() {
                for name in names {
                    set.insert(category, category.url(&name));
                }
            } else if let Some(first) = names.first() {
                set.insert(category, category.url(first));
            }
        }
        Ok(set)
    }

    async fn delete_category(
        &self,
        prefix: &str,
        category: AttachmentCategory,
    ) -> DeletionReport {
        let mut report = DeletionReport::default();
        if let Err(e) = check_prefix(prefix) {
            report.failed_files.push(DeletionFailure {
                url: category.url(prefix),
                reason: e.to_string(),
            });
            return report;
        }

        let _guard = self.lock(prefix, category).await;

        let names = match self.matching(prefix, category).await {
            Ok(names) => names,
            Err(e) => {
                warn!(folder = category.folder(), error = %e, "Failed to scan attachment folder");
                report.failed_files.push(DeletionFailure {
                    url: category.url(prefix),
                    reason: e.to_string(),
                });
                return report;
            }
        };

        let dir = self.folder_path(category);
        for name in names {
            let url = category.url(&name);
            match fs::remove_file(dir.join(&name)).await {
                Ok(()) => report.deleted_files.push(url),
                Err(e) => {
                    warn!(%url, error = %e, "Failed to delete attachment");
                    report.failed_files.push(DeletionFailure {
                        url,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    async fn delete_urls(
        &self,
        prefix: &str,
        category: AttachmentCategory,
        urls: &[String],
    ) -> DeletionReport {
        let mut report = DeletionReport::default();
        let _guard = self.lock(prefix, category).await;

        let dir = self.folder_path(category);
        let folder_marker = format!("/{}/", category.folder());
        for url in urls {
            let (parent, name) = match url.rsplit_once('/') {
                Some((parent, name)) => (Some(parent), name),
                None => (None, url.as_str()),
            };
            let in_folder = parent.is_none_or(|p| format!("{p}/").ends_with(&folder_marker));
            if !in_folder || !is_flat_file_name(name) || !category.matches(prefix, name) {
                warn!(%url, "Refusing to delete file outside the asset's attachments");
                report.failed_files.push(DeletionFailure {
                    url: url.clone(),
                    reason: "not an attachment of this asset".into(),
                });
                continue;
            }

            match fs::remove_file(dir.join(name)).await {
                Ok(()) => report.deleted_files.push(url.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(%url, "Attachment to delete does not exist");
                    report.failed_files.push(DeletionFailure {
                        url: url.clone(),
                        reason: "file not found".into(),
                    });
                }
                Err(e) => {
                    warn!(%url, error = %e, "Failed to delete attachment");
                    report.failed_files.push(DeletionFailure {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    async fn relocate(&self, old_prefix: &str, new_prefix: &str) -> Result<usize, StorageError> {
        check_prefix(old_prefix)?;
        check_prefix(new_prefix)?;
        if old_prefix == new_prefix {
            return Ok(0);
        }

        let mut moved = 0;
        for &category in AttachmentCategory::ALL {
            let _guard = self.lock(new_prefix, category).await;

            let dir = self.folder_path(category);
            for name in self.matching(old_prefix, category).await? {
                let renamed = format!("{new_prefix}{}", &name[old_prefix.len()..]);
                let target = dir.join(&renamed);
                if fs::try_exists(&target).await? {
                    warn!(from = %name, to = %renamed, "Relocation target exists, leaving file in place");
                    continue;
                }
                fs::rename(dir.join(&name), &target).await?;
                moved += 1;
            }
        }

        if moved > 0 {
            info!(old_prefix, new_prefix, moved, "Relocated attachments");
        }
        Ok(moved)
    }
}
