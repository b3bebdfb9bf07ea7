use serde::{Deserialize, Serialize};

use super::naming::{file_extension, sanitize_stem};

/// Logical kind of an asset attachment.
///
/// Each category maps to a fixed folder under `uploads/` and a file name
/// pattern built from the asset prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentCategory {
    /// `{prefix}_{n}.{ext}`, many per asset.
    Picture,
    /// `{prefix}_pedimento.{ext}`
    Pedimento,
    /// `{prefix}_factura.{ext}`
    Factura,
    /// `{prefix}_archivo_alta.{ext}`
    ArchivoAlta,
    /// `{prefix}_archivo_baja.{ext}`
    ArchivoBaja,
    /// `{prefix}_extra_{n}_{stem}.{ext}`, many per asset.
    Extra,
}

impl AttachmentCategory {
    pub const ALL: &'static [AttachmentCategory] = &[
        Self::Picture,
        Self::Pedimento,
        Self::Factura,
        Self::ArchivoAlta,
        Self::ArchivoBaja,
        Self::Extra,
    ];

    /// Folder relative to `uploads/`.
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Picture => "pictures",
            Self::Pedimento => "pedimentos",
            Self::Factura => "facturas",
            Self::ArchivoAlta => "archivos_alta",
            Self::ArchivoBaja => "archivos_baja",
            Self::Extra => "extras",
        }
    }

    /// Whether an asset may hold more than one file of this category.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Picture | Self::Extra)
    }

    /// Name suffix of single-valued categories.
    fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Pedimento => Some("pedimento"),
            Self::Factura => Some("factura"),
            Self::ArchivoAlta => Some("archivo_alta"),
            Self::ArchivoBaja => Some("archivo_baja"),
            Self::Picture | Self::Extra => None,
        }
    }

    /// Resolve a multipart field name to a category.
    ///
    /// `formatoBaja` is accepted as an alias of `archivoBaja`.
    pub fn from_form_field(name: &str) -> Option<Self> {
        match name {
            "assetPictures" => Some(Self::Picture),
            "pedimento" => Some(Self::Pedimento),
            "factura" => Some(Self::Factura),
            "archivoAlta" => Some(Self::ArchivoAlta),
            "archivoBaja" | "formatoBaja" => Some(Self::ArchivoBaja),
            "extraFiles" => Some(Self::Extra),
            _ => None,
        }
    }

    /// Public URL of a stored file.
    pub fn url(&self, file_name: &str) -> String {
        format!("/uploads/{}/{}", self.folder(), file_name)
    }

    /// Build the on-disk name for a new file.
    ///
    /// `index` is only used by indexed categories.
    pub fn stored_name(&self, prefix: &str, index: u32, original_name: &str) -> String {
        let ext = file_extension(original_name)
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        match self {
            Self::Picture => format!("{prefix}_{index}{ext}"),
            Self::Extra => {
                let stem = sanitize_stem(original_name);
                format!("{prefix}_extra_{index}_{stem}{ext}")
            }
            single => {
                let suffix = single.suffix().unwrap_or_default();
                format!("{prefix}_{suffix}{ext}")
            }
        }
    }

    /// Index of an indexed-category file owned by `prefix`.
    pub fn index_of(&self, prefix: &str, file_name: &str) -> Option<u32> {
        if file_name.starts_with('.') {
            return None;
        }
        let rest = file_name.strip_prefix(prefix)?;
        match self {
            Self::Picture => {
                let rest = rest.strip_prefix('_')?;
                let digits = rest.split_once('.').map_or(rest, |(stem, _)| stem);
                parse_index(digits)
            }
            Self::Extra => {
                let rest = rest.strip_prefix("_extra_")?;
                let (digits, _) = rest.split_once('_')?;
                parse_index(digits)
            }
            _ => None,
        }
    }

    /// Whether `file_name` is an attachment of this category owned by `prefix`.
    pub fn matches(&self, prefix: &str, file_name: &str) -> bool {
        if self.is_indexed() {
            return self.index_of(prefix, file_name).is_some();
        }
        if file_name.starts_with('.') {
            return false;
        }
        let Some(suffix) = self.suffix() else {
            return false;
        };
        file_name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.strip_prefix(suffix))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }
}

/// Whether attachments of two prefixes could be mistaken for each other.
///
/// Extra files embed the original stem after the index, so the extras of
/// `A_extra_1` (`A_extra_1_extra_1_doc.pdf`) also parse as extras of `A`.
/// Equal prefixes always collide.
pub fn prefixes_collide(a: &str, b: &str) -> bool {
    a == b || extra_shadows(a, b) || extra_shadows(b, a)
}

/// Shorter prefixes whose extras pattern would claim files of `prefix`.
pub fn shadowed_prefixes(prefix: &str) -> Vec<String> {
    prefix
        .match_indices("_extra_")
        .map(|(i, _)| &prefix[..i])
        .filter(|short| extra_shadows(short, prefix))
        .map(str::to_string)
        .collect()
}

/// `long` is `{short}_extra_{digits}`, optionally followed by `_...`.
fn extra_shadows(short: &str, long: &str) -> bool {
    AttachmentCategory::Extra
        .index_of(short, &format!("{long}_"))
        .is_some()
}

fn parse_index(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
