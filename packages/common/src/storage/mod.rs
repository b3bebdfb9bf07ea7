//! Per-asset attachment storage.
//!
//! Attachments are plain files under `{public_dir}/uploads/{folder}/`. The owning
//! asset and the category are encoded in the file name through a sanitized prefix
//! derived from the asset tag, so the name itself is the link between a row and
//! its files.

mod category;
mod error;
mod naming;
mod traits;

pub mod filesystem;

pub use category::{AttachmentCategory, prefixes_collide, shadowed_prefixes};
pub use error::StorageError;
pub use naming::{file_extension, is_flat_file_name, sanitize_stem, sanitize_tag};
pub use traits::{AttachmentSet, AttachmentStore, DeletionFailure, DeletionReport, Upload};
