use async_trait::async_trait;
use serde::Serialize;

use super::category::AttachmentCategory;
use super::error::StorageError;

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name the client gave the file; only its extension (and stem, for extras) is kept.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// All attachment URLs of one asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSet {
    /// Sorted lexicographically.
    pub pictures: Vec<String>,
    pub pedimento: Option<String>,
    pub factura: Option<String>,
    pub archivo_alta: Option<String>,
    pub archivo_baja: Option<String>,
    /// Sorted lexicographically.
    pub extra_files: Vec<String>,
}

impl AttachmentSet {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Record a stored URL under its category.
    pub fn insert(&mut self, category: AttachmentCategory, url: String) {
        match category {
            AttachmentCategory::Picture => self.pictures.push(url),
            AttachmentCategory::Pedimento => self.pedimento = Some(url),
            AttachmentCategory::Factura => self.factura = Some(url),
            AttachmentCategory::ArchivoAlta => self.archivo_alta = Some(url),
            AttachmentCategory::ArchivoBaja => self.archivo_baja = Some(url),
            AttachmentCategory::Extra => self.extra_files.push(url),
        }
    }
}

/// A file that could not be removed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DeletionFailure {
    pub url: String,
    pub reason: String,
}

/// Per-file outcome of a deletion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub deleted_files: Vec<String>,
    pub failed_files: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.failed_files.is_empty()
    }

    pub fn merge(&mut self, other: DeletionReport) {
        self.deleted_files.extend(other.deleted_files);
        self.failed_files.extend(other.failed_files);
    }
}

/// Attachment storage keyed by asset prefix.
///
/// `prefix` is always the output of [`sanitize_tag`](super::sanitize_tag).
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store one file and return its public URL.
    ///
    /// Indexed categories get the next free index. Single-valued categories
    /// replace whatever the asset had before.
    async fn save(
        &self,
        prefix: &str,
        category: AttachmentCategory,
        upload: &Upload,
    ) -> Result<String, StorageError>;

    /// Store several files in order and return the resulting set.
    async fn save_all(
        &self,
        prefix: &str,
        uploads: &[(AttachmentCategory, Upload)],
    ) -> Result<AttachmentSet, StorageError> {
        let mut saved = AttachmentSet::default();
        for (category, upload) in uploads {
            let url = self.save(prefix, *category, upload).await?;
            saved.insert(*category, url);
        }
        Ok(saved)
    }

    /// Next free index of an indexed category (1 when there is none).
    async fn next_index(
        &self,
        prefix: &str,
        category: AttachmentCategory,
    ) -> Result<u32, StorageError>;

    /// Every attachment of the asset. Missing folders count as empty.
    async fn lookup(&self, prefix: &str) -> Result<AttachmentSet, StorageError>;

    /// Remove every file of a single-valued category.
    async fn delete_category(&self, prefix: &str, category: AttachmentCategory)
    -> DeletionReport;

    /// Remove the files behind the given URLs of an indexed category.
    ///
    /// URLs that do not point at a file of this asset and category are
    /// reported as failures and left alone.
    async fn delete_urls(
        &self,
        prefix: &str,
        category: AttachmentCategory,
        urls: &[String],
    ) -> DeletionReport;

    /// Move every attachment from one prefix to another. Returns how many
    /// files moved.
    async fn relocate(&self, old_prefix: &str, new_prefix: &str) -> Result<usize, StorageError>;
}
