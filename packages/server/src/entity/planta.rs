use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "planta")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nombre: String,
    pub descripcion: Option<String>,
    /// Soft-delete flag; rows are never removed.
    pub activo: bool,

    #[sea_orm(has_many)]
    pub activos: HasMany<super::activo::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
