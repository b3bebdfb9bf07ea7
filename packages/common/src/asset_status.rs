#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an inventory asset.
///
/// `Activo` is the initial state. `Baja` (decommissioned) is terminal: once an
/// asset reaches it, no further edits or attachment changes are accepted.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    /// In service.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "activo"))]
    Activo,
    /// Decommissioned.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "baja"))]
    Baja,
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("asset is already in status '{0}' and cannot change")]
    Terminal(AssetStatus),
    #[error("illegal status transition {from} -> {to}")]
    Illegal { from: AssetStatus, to: AssetStatus },
}

impl AssetStatus {
    pub const ALL: &'static [AssetStatus] = &[Self::Activo, Self::Baja];

    /// Returns true if no transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Baja)
    }

    /// Statuses reachable from `self` in one step.
    pub fn allowed_transitions(&self) -> &'static [AssetStatus] {
        match self {
            Self::Activo => &[Self::Baja],
            Self::Baja => &[],
        }
    }

    /// Validate a transition and return the new status.
    pub fn transition(self, to: AssetStatus) -> Result<AssetStatus, TransitionError> {
        if self.allowed_transitions().contains(&to) {
            Ok(to)
        } else if self.is_terminal() {
            Err(TransitionError::Terminal(self))
        } else {
            Err(TransitionError::Illegal { from: self, to })
        }
    }

    /// Fails for statuses that freeze the asset record and its attachments.
    pub fn ensure_mutable(&self) -> Result<(), TransitionError> {
        if self.is_terminal() {
            Err(TransitionError::Terminal(*self))
        } else {
            Ok(())
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activo => "activo",
            Self::Baja => "baja",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        Self::Activo
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            AssetStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for AssetStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(Self::Activo),
            "baja" => Ok(Self::Baja),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
