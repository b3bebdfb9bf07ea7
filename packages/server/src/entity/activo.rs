use common::AssetStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub numero_activo: String,
    #[sea_orm(unique)]
    pub numero_etiqueta: String,
    /// Sanitized `numero_etiqueta`; every attachment file name starts with it.
    #[sea_orm(unique)]
    pub prefijo_archivos: String,

    pub tipo_id: i32,
    #[sea_orm(belongs_to, from = "tipo_id", to = "id")]
    pub tipo: HasOne<super::tipo::Entity>,

    pub marca: String,
    pub modelo: String,
    pub serie: Option<String>,

    pub ubicacion_id: i32,
    #[sea_orm(belongs_to, from = "ubicacion_id", to = "id")]
    pub ubicacion: HasOne<super::ubicacion::Entity>,

    pub planta_id: i32,
    #[sea_orm(belongs_to, from = "planta_id", to = "id")]
    pub planta: HasOne<super::planta::Entity>,

    pub nacional_extranjero: String,
    pub numero_pedimento: Option<String>,
    pub numero_capex: Option<String>,
    pub orden_interna: Option<String>,
    pub status_cip_fa: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub observaciones: Option<String>,

    pub fecha_alta: Option<Date>,
    pub user_alta: Option<String>,

    pub status: AssetStatus,
    pub fecha_baja: Option<Date>,
    pub user_baja: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comentario_baja: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
