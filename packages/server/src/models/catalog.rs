use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the reference tables assets point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogKind {
    Tipos,
    Plantas,
    Ubicaciones,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tipos => "tipos",
            Self::Plantas => "plantas",
            Self::Ubicaciones => "ubicaciones",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tipos" => Ok(Self::Tipos),
            "plantas" => Ok(Self::Plantas),
            "ubicaciones" => Ok(Self::Ubicaciones),
            _ => Err(AppError::NotFound(format!(
                "Tipo de configuración '{s}' no encontrado"
            ))),
        }
    }
}

/// A row of any catalog.
#[derive(Serialize, Debug, Clone, PartialEq, utoipa::ToSchema)]
pub struct CatalogItem {
    pub id: i32,
    #[schema(example = "Planta Norte")]
    pub nombre: String,
    pub descripcion: Option<String>,
    pub activo: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCatalogRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCatalogRequest {
    pub id: Option<i32>,
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
}
