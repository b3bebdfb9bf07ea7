use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use common::AssetStatus;
use common::storage::{AttachmentSet, sanitize_tag};
use serde::{Deserialize, Serialize};

use crate::entity::activo;
use crate::error::AppError;
use crate::extractors::form::AssetForm;

use super::shared::non_blank;

const REQUIRED_FIELDS_MESSAGE: &str = "Todos los campos requeridos deben ser completados";

/// An asset as returned by the API, with the names of its catalog entries.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivoResponse {
    pub id: i32,
    #[schema(example = "ACT-2024-001")]
    pub numero_activo: String,
    #[schema(example = "A-100")]
    pub numero_etiqueta: String,
    /// Prefix shared by every attachment file name of this asset.
    #[schema(example = "A-100")]
    pub prefijo_archivos: String,
    pub tipo_id: i32,
    pub tipo_nombre: Option<String>,
    pub marca: String,
    pub modelo: String,
    pub serie: Option<String>,
    pub ubicacion_id: i32,
    pub ubicacion_nombre: Option<String>,
    pub planta_id: i32,
    pub planta_nombre: Option<String>,
    #[schema(example = "Nacional")]
    pub nacional_extranjero: String,
    pub numero_pedimento: Option<String>,
    pub numero_capex: Option<String>,
    pub orden_interna: Option<String>,
    pub status_cip_fa: Option<String>,
    pub observaciones: Option<String>,
    pub fecha_alta: Option<NaiveDate>,
    pub user_alta: Option<String>,
    pub status: AssetStatus,
    pub fecha_baja: Option<NaiveDate>,
    pub user_baja: Option<String>,
    pub comentario_baja: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A newly created asset together with the files stored for it.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivoWithFiles {
    #[serde(flatten)]
    pub activo: ActivoResponse,
    pub files: AttachmentSet,
}

/// `id -> nombre` maps of the three catalogs, used to decorate responses.
#[derive(Debug, Default)]
pub struct CatalogNames {
    pub tipos: HashMap<i32, String>,
    pub ubicaciones: HashMap<i32, String>,
    pub plantas: HashMap<i32, String>,
}

impl ActivoResponse {
    pub fn from_model(model: activo::Model, names: &CatalogNames) -> Self {
        Self {
            tipo_nombre: names.tipos.get(&model.tipo_id).cloned(),
            ubicacion_nombre: names.ubicaciones.get(&model.ubicacion_id).cloned(),
            planta_nombre: names.plantas.get(&model.planta_id).cloned(),
            id: model.id,
            numero_activo: model.numero_activo,
            numero_etiqueta: model.numero_etiqueta,
            prefijo_archivos: model.prefijo_archivos,
            tipo_id: model.tipo_id,
            marca: model.marca,
            modelo: model.modelo,
            serie: model.serie,
            ubicacion_id: model.ubicacion_id,
            planta_id: model.planta_id,
            nacional_extranjero: model.nacional_extranjero,
            numero_pedimento: model.numero_pedimento,
            numero_capex: model.numero_capex,
            orden_interna: model.orden_interna,
            status_cip_fa: model.status_cip_fa,
            observaciones: model.observaciones,
            fecha_alta: model.fecha_alta,
            user_alta: model.user_alta,
            status: model.status,
            fecha_baja: model.fecha_baja,
            user_baja: model.user_baja,
            comentario_baja: model.comentario_baja,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivoListQuery {
    /// Case-insensitive match on tag, asset number, brand, model or serial.
    pub search: Option<String>,
    /// `activo` or `baja`.
    pub status: Option<String>,
}

/// Request body for replacing the editable fields of an asset.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivoRequest {
    pub numero_activo: Option<String>,
    pub numero_etiqueta: Option<String>,
    #[serde(rename = "tipo_id")]
    pub tipo_id: Option<i32>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub serie: Option<String>,
    #[serde(rename = "ubicacion_id")]
    pub ubicacion_id: Option<i32>,
    #[serde(rename = "planta_id")]
    pub planta_id: Option<i32>,
    pub nacional_extranjero: Option<String>,
    pub numero_pedimento: Option<String>,
    /// `YYYY-MM-DD`.
    pub fecha_alta: Option<NaiveDate>,
    pub user_alta: Option<String>,
    pub numero_capex: Option<String>,
    pub orden_interna: Option<String>,
    pub observaciones: Option<String>,
    pub status_cip_fa: Option<String>,
}

/// Validated editable fields of an asset, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivoFields {
    pub numero_activo: String,
    pub numero_etiqueta: String,
    pub tipo_id: i32,
    pub marca: String,
    pub modelo: String,
    pub serie: Option<String>,
    pub ubicacion_id: i32,
    pub planta_id: i32,
    pub nacional_extranjero: String,
    pub numero_pedimento: Option<String>,
    pub fecha_alta: Option<NaiveDate>,
    pub user_alta: Option<String>,
    pub numero_capex: Option<String>,
    pub orden_interna: Option<String>,
    pub observaciones: Option<String>,
    pub status_cip_fa: Option<String>,
}

impl ActivoFields {
    /// Attachment prefix derived from the tag.
    pub fn prefix(&self) -> String {
        sanitize_tag(&self.numero_etiqueta)
    }

    /// Read the fields of the multipart create form.
    ///
    /// Catalog references arrive as `tipo`, `ubicacion` and `planta`.
    pub fn from_form(form: &AssetForm) -> Result<Self, AppError> {
        let required = |name: &str| {
            form.text_owned(name)
                .ok_or_else(|| AppError::Validation(REQUIRED_FIELDS_MESSAGE.into()))
        };

        let numero_activo = required("numeroActivo")?;
        let numero_etiqueta = required("numeroEtiqueta")?;
        let tipo = required("tipo")?;
        let marca = required("marca")?;
        let modelo = required("modelo")?;
        let ubicacion = required("ubicacion")?;
        let planta = required("planta")?;
        let nacional_extranjero = required("nacionalExtranjero")?;

        Ok(Self {
            numero_activo,
            numero_etiqueta,
            tipo_id: parse_id("tipo", &tipo)?,
            marca,
            modelo,
            serie: form.text_owned("serie"),
            ubicacion_id: parse_id("ubicacion", &ubicacion)?,
            planta_id: parse_id("planta", &planta)?,
            nacional_extranjero,
            numero_pedimento: form.text_owned("numeroPedimento"),
            fecha_alta: form.text("fechaAlta").map(parse_date).transpose()?,
            user_alta: form.text_owned("userAlta"),
            numero_capex: form.text_owned("numeroCapex"),
            orden_interna: form.text_owned("ordenInterna"),
            observaciones: form.text_owned("observaciones"),
            status_cip_fa: form.text_owned("statusCipFa"),
        })
    }
}

impl TryFrom<UpdateActivoRequest> for ActivoFields {
    type Error = AppError;

    fn try_from(req: UpdateActivoRequest) -> Result<Self, Self::Error> {
        let missing = || AppError::Validation(REQUIRED_FIELDS_MESSAGE.into());
        Ok(Self {
            numero_activo: non_blank(req.numero_activo).ok_or_else(missing)?,
            numero_etiqueta: non_blank(req.numero_etiqueta).ok_or_else(missing)?,
            tipo_id: req.tipo_id.ok_or_else(missing)?,
            marca: non_blank(req.marca).ok_or_else(missing)?,
            modelo: non_blank(req.modelo).ok_or_else(missing)?,
            serie: non_blank(req.serie),
            ubicacion_id: req.ubicacion_id.ok_or_else(missing)?,
            planta_id: req.planta_id.ok_or_else(missing)?,
            nacional_extranjero: non_blank(req.nacional_extranjero).ok_or_else(missing)?,
            numero_pedimento: non_blank(req.numero_pedimento),
            fecha_alta: req.fecha_alta,
            user_alta: non_blank(req.user_alta),
            numero_capex: non_blank(req.numero_capex),
            orden_interna: non_blank(req.orden_interna),
            observaciones: non_blank(req.observaciones),
            status_cip_fa: non_blank(req.status_cip_fa),
        })
    }
}

fn parse_id(field: &str, value: &str) -> Result<i32, AppError> {
    value.parse().map_err(|_| {
        AppError::Validation(format!(
            "El campo '{field}' debe ser un identificador numérico"
        ))
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("fechaAlta debe tener el formato YYYY-MM-DD".into()))
}
