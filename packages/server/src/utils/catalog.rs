use std::collections::HashMap;

use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::{planta, tipo, ubicacion};
use crate::error::AppError;
use crate::models::activo::CatalogNames;
use crate::models::catalog::{CatalogItem, CatalogKind};

/// Run `$body` with `$table` bound to the entity module of `$kind`.
///
/// The three catalogs share one shape, so every query is written once.
macro_rules! with_catalog {
    ($kind:expr, $table:ident => $body:expr) => {
        match $kind {
            CatalogKind::Tipos => {
                use tipo as $table;
                $body
            }
            CatalogKind::Plantas => {
                use planta as $table;
                $body
            }
            CatalogKind::Ubicaciones => {
                use ubicacion as $table;
                $body
            }
        }
    };
}

macro_rules! to_item {
    ($model:expr) => {{
        let m = $model;
        CatalogItem {
            id: m.id,
            nombre: m.nombre,
            descripcion: m.descripcion,
            activo: m.activo,
        }
    }};
}

impl CatalogKind {
    /// Active rows ordered by name.
    pub async fn list_active<C: ConnectionTrait>(self, db: &C) -> Result<Vec<CatalogItem>, DbErr> {
        with_catalog!(self, table => {
            let rows = table::Entity::find()
                .filter(table::Column::Activo.eq(true))
                .order_by_asc(table::Column::Nombre)
                .all(db)
                .await?;
            Ok(rows.into_iter().map(|m| to_item!(m)).collect())
        })
    }

    pub async fn find<C: ConnectionTrait>(
        self,
        db: &C,
        id: i32,
    ) -> Result<Option<CatalogItem>, DbErr> {
        with_catalog!(self, table => {
            let row = table::Entity::find_by_id(id).one(db).await?;
            Ok(row.map(|m| to_item!(m)))
        })
    }

    pub async fn create<C: ConnectionTrait>(
        self,
        db: &C,
        nombre: String,
        descripcion: Option<String>,
    ) -> Result<CatalogItem, DbErr> {
        with_catalog!(self, table => {
            let model = table::ActiveModel {
                nombre: Set(nombre),
                descripcion: Set(descripcion),
                activo: Set(true),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(to_item!(model))
        })
    }

    /// Rename or re-describe a row. Returns `None` when it does not exist.
    pub async fn update<C: ConnectionTrait>(
        self,
        db: &C,
        id: i32,
        nombre: String,
        descripcion: Option<String>,
    ) -> Result<Option<CatalogItem>, DbErr> {
        with_catalog!(self, table => {
            let Some(existing) = table::Entity::find_by_id(id).one(db).await? else {
                return Ok(None);
            };
            let mut active: table::ActiveModel = existing.into();
            active.nombre = Set(nombre);
            active.descripcion = Set(descripcion);
            let model = active.update(db).await?;
            Ok(Some(to_item!(model)))
        })
    }

    /// Soft-delete a row. Returns `false` when it does not exist.
    pub async fn deactivate<C: ConnectionTrait>(self, db: &C, id: i32) -> Result<bool, DbErr> {
        with_catalog!(self, table => {
            let result = table::Entity::update_many()
                .col_expr(table::Column::Activo, Expr::value(false))
                .filter(table::Column::Id.eq(id))
                .exec(db)
                .await?;
            Ok(result.rows_affected > 0)
        })
    }

    /// `id -> nombre` for every row, active or not.
    pub async fn names<C: ConnectionTrait>(self, db: &C) -> Result<HashMap<i32, String>, DbErr> {
        with_catalog!(self, table => {
            let rows = table::Entity::find().all(db).await?;
            Ok(rows.into_iter().map(|m| (m.id, m.nombre)).collect())
        })
    }
}

/// Names of all catalog rows, for decorating asset responses.
pub async fn load_catalog_names<C: ConnectionTrait>(db: &C) -> Result<CatalogNames, DbErr> {
    Ok(CatalogNames {
        tipos: CatalogKind::Tipos.names(db).await?,
        ubicaciones: CatalogKind::Ubicaciones.names(db).await?,
        plantas: CatalogKind::Plantas.names(db).await?,
    })
}

/// Fail with a validation error unless `id` is an active row of `kind`.
pub async fn ensure_active_reference<C: ConnectionTrait>(
    db: &C,
    kind: CatalogKind,
    id: i32,
) -> Result<(), AppError> {
    match kind.find(db, id).await? {
        Some(item) if item.activo => Ok(()),
        _ => Err(AppError::Validation(format!(
            "El registro {id} de {kind} no existe o está inactivo"
        ))),
    }
}
