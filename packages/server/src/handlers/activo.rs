use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::AssetStatus;
use common::asset_status::ParseStatusError;
use common::storage::{AttachmentCategory, prefixes_collide, shadowed_prefixes};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{error, info, instrument};

use crate::entity::activo;
use crate::error::{AppError, ErrorBody, duplicate_tag_on_conflict};
use crate::extractors::form::AssetForm;
use crate::extractors::json::{AppJson, OptionalJson};
use crate::models::activo::*;
use crate::models::attachment::BajaRequest;
use crate::models::catalog::CatalogKind;
use crate::models::shared::{ApiResponse, escape_like};
use crate::state::AppState;
use crate::utils::catalog::{ensure_active_reference, load_catalog_names};

use super::baja::retire;

#[utoipa::path(
    get,
    path = "/",
    tag = "Activos",
    operation_id = "listActivos",
    summary = "List assets",
    description = "Returns every asset, newest first, with the names of its tipo, ubicación and planta. \
        `search` matches tag, asset number, brand, model or serial (case-insensitive); `status` filters \
        by `activo` or `baja`.",
    params(ActivoListQuery),
    responses(
        (status = 200, description = "Assets", body = ApiResponse<Vec<ActivoResponse>>),
        (status = 400, description = "Unknown status (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_activos(
    State(state): State<AppState>,
    Query(query): Query<ActivoListQuery>,
) -> Result<Json<ApiResponse<Vec<ActivoResponse>>>, AppError> {
    let mut select = activo::Entity::find();

    if let Some(status) = query.status.as_deref().map(str::trim)
        && !status.is_empty()
    {
        let status: AssetStatus = status
            .parse()
            .map_err(|e: ParseStatusError| AppError::Validation(e.to_string()))?;
        select = select.filter(activo::Column::Status.eq(status));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            let mut any = Condition::any();
            for column in [
                activo::Column::NumeroEtiqueta,
                activo::Column::NumeroActivo,
                activo::Column::Marca,
                activo::Column::Modelo,
                activo::Column::Serie,
            ] {
                any = any.add(
                    Expr::expr(Func::lower(Expr::col(column)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                );
            }
            select = select.filter(any);
        }
    }

    let rows = select
        .order_by_desc(activo::Column::Id)
        .all(&state.db)
        .await?;
    let names = load_catalog_names(&state.db).await?;

    let data = rows
        .into_iter()
        .map(|m| ActivoResponse::from_model(m, &names))
        .collect();
    Ok(Json(ApiResponse::ok(data)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Activos",
    operation_id = "getActivo",
    summary = "Get an asset by ID",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = ApiResponse<ActivoResponse>),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_activo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActivoResponse>>, AppError> {
    let model = find_activo(&state.db, id).await?;
    let names = load_catalog_names(&state.db).await?;
    Ok(Json(ApiResponse::ok(ActivoResponse::from_model(model, &names))))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Activos",
    operation_id = "createActivo",
    summary = "Register a new asset",
    description = "Creates an asset from a multipart form and stores any attached files \
        (`assetPictures`, `pedimento`, `factura`, `archivoAlta`, `extraFiles`). Required fields: \
        `numeroActivo`, `numeroEtiqueta`, `tipo`, `marca`, `modelo`, `ubicacion`, `planta`, \
        `nacionalExtranjero`. The referenced catalog rows must exist and be active.",
    request_body(content_type = "multipart/form-data", description = "Asset fields and files"),
    responses(
        (status = 201, description = "Asset created", body = ApiResponse<ActivoWithFiles>),
        (status = 400, description = "Validation error or duplicate tag (VALIDATION_ERROR, DUPLICATE_TAG)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_activo(
    State(state): State<AppState>,
    mut form: AssetForm,
) -> Result<impl IntoResponse, AppError> {
    let fields = ActivoFields::from_form(&form)?;
    reject_baja_document(&mut form)?;
    ensure_references(&state.db, &fields).await?;

    let prefix = fields.prefix();
    ensure_tag_available(&state.db, &fields.numero_etiqueta, &prefix, None).await?;

    let now = Utc::now();
    let mut new_activo = activo::ActiveModel {
        status: Set(AssetStatus::Activo),
        fecha_baja: Set(None),
        user_baja: Set(None),
        comentario_baja: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_fields(&mut new_activo, fields);

    let model = new_activo
        .insert(&state.db)
        .await
        .map_err(duplicate_tag_on_conflict)?;
    info!(id = model.id, prefix = %prefix, "Created asset");

    let files = state.attachments.save_all(&prefix, &form.files).await?;
    let names = load_catalog_names(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            ActivoWithFiles {
                activo: ActivoResponse::from_model(model, &names),
                files,
            },
            "Activo creado correctamente",
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Activos",
    operation_id = "updateActivo",
    summary = "Replace the editable fields of an asset",
    description = "Full replacement of the asset's editable fields; status is not editable here. \
        Changing `numeroEtiqueta` moves the asset's attachments to the new prefix. \
        Assets in `baja` cannot be edited.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateActivoRequest,
    responses(
        (status = 200, description = "Asset updated", body = ApiResponse<ActivoResponse>),
        (status = 400, description = "Validation error or duplicate tag (VALIDATION_ERROR, DUPLICATE_TAG)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset is retired (ASSET_RETIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_activo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateActivoRequest>,
) -> Result<Json<ApiResponse<ActivoResponse>>, AppError> {
    let existing = find_activo(&state.db, id).await?;
    existing.status.ensure_mutable()?;

    let fields = ActivoFields::try_from(payload)?;
    ensure_references(&state.db, &fields).await?;
    let new_prefix = fields.prefix();
    ensure_tag_available(&state.db, &fields.numero_etiqueta, &new_prefix, Some(id)).await?;

    let old_prefix = existing.prefijo_archivos;
    let mut changes = activo::ActiveModel {
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    apply_fields(&mut changes, fields);

    // A retirement may land between the read above and this write.
    let result = activo::Entity::update_many()
        .set(changes)
        .filter(activo::Column::Id.eq(id))
        .filter(activo::Column::Status.eq(AssetStatus::Activo))
        .exec(&state.db)
        .await
        .map_err(duplicate_tag_on_conflict)?;
    if result.rows_affected == 0 {
        return Err(AppError::AssetRetired);
    }
    let model = find_activo(&state.db, id).await?;

    if old_prefix != new_prefix {
        match state.attachments.relocate(&old_prefix, &new_prefix).await {
            Ok(moved) => info!(id, %old_prefix, %new_prefix, moved, "Tag changed, attachments moved"),
            Err(e) => error!(id, %old_prefix, %new_prefix, error = %e, "Failed to move attachments"),
        }
    }

    let names = load_catalog_names(&state.db).await?;
    Ok(Json(ApiResponse::with_message(
        ActivoResponse::from_model(model, &names),
        "Activo actualizado correctamente",
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Activos",
    operation_id = "deleteActivo",
    summary = "Retire an asset",
    description = "Soft-deletes the asset by moving it to status `baja`. Rows are never removed. \
        The optional JSON body may carry `userBaja` (default `unknown`) and `comentarioBaja`.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body(content = BajaRequest, description = "Optional retirement details"),
    responses(
        (status = 200, description = "Asset retired", body = ApiResponse<ActivoResponse>),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset already retired (ASSET_RETIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, body), fields(id))]
pub async fn delete_activo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    OptionalJson(body): OptionalJson<BajaRequest>,
) -> Result<Json<ApiResponse<ActivoResponse>>, AppError> {
    let model = retire(&state, id, body.user_baja, body.comentario_baja, None).await?;
    let names = load_catalog_names(&state.db).await?;
    Ok(Json(ApiResponse::with_message(
        ActivoResponse::from_model(model, &names),
        "Activo dado de baja correctamente",
    )))
}

/// Look up an asset by ID, returning 404 if not found.
pub(crate) async fn find_activo<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<activo::Model, AppError> {
    activo::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activo no encontrado".into()))
}

/// The retirement document is only accepted by the baja endpoint.
pub(crate) fn reject_baja_document(form: &mut AssetForm) -> Result<(), AppError> {
    if form.take_files(AttachmentCategory::ArchivoBaja).is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(
            "El formato de baja solo se adjunta al dar de baja el activo".into(),
        ))
    }
}

async fn ensure_references<C: ConnectionTrait>(
    db: &C,
    fields: &ActivoFields,
) -> Result<(), AppError> {
    ensure_active_reference(db, CatalogKind::Tipos, fields.tipo_id).await?;
    ensure_active_reference(db, CatalogKind::Ubicaciones, fields.ubicacion_id).await?;
    ensure_active_reference(db, CatalogKind::Plantas, fields.planta_id).await?;
    Ok(())
}

/// Fail with `DUPLICATE_TAG` when another asset uses the tag, its prefix, or a
/// prefix whose attachment names overlap with it.
async fn ensure_tag_available<C: ConnectionTrait>(
    db: &C,
    tag: &str,
    prefix: &str,
    exclude_id: Option<i32>,
) -> Result<(), AppError> {
    let longer = format!("{}\\_extra\\_%", escape_like(prefix));
    let mut candidates = Condition::any()
        .add(activo::Column::NumeroEtiqueta.eq(tag))
        .add(activo::Column::PrefijoArchivos.eq(prefix))
        .add(Expr::col(activo::Column::PrefijoArchivos).like(LikeExpr::new(longer).escape('\\')));
    let shorter = shadowed_prefixes(prefix);
    if !shorter.is_empty() {
        candidates = candidates.add(activo::Column::PrefijoArchivos.is_in(shorter));
    }

    let mut select = activo::Entity::find().filter(candidates);
    if let Some(id) = exclude_id {
        select = select.filter(activo::Column::Id.ne(id));
    }

    let taken = select.all(db).await?.into_iter().any(|other| {
        other.numero_etiqueta == tag || prefixes_collide(&other.prefijo_archivos, prefix)
    });
    if taken {
        return Err(AppError::DuplicateTag);
    }
    Ok(())
}

fn apply_fields(active: &mut activo::ActiveModel, fields: ActivoFields) {
    active.prefijo_archivos = Set(fields.prefix());
    active.numero_activo = Set(fields.numero_activo);
    active.numero_etiqueta = Set(fields.numero_etiqueta);
    active.tipo_id = Set(fields.tipo_id);
    active.marca = Set(fields.marca);
    active.modelo = Set(fields.modelo);
    active.serie = Set(fields.serie);
    active.ubicacion_id = Set(fields.ubicacion_id);
    active.planta_id = Set(fields.planta_id);
    active.nacional_extranjero = Set(fields.nacional_extranjero);
    active.numero_pedimento = Set(fields.numero_pedimento);
    active.fecha_alta = Set(fields.fecha_alta);
    active.user_alta = Set(fields.user_alta);
    active.numero_capex = Set(fields.numero_capex);
    active.orden_interna = Set(fields.orden_interna);
    active.observaciones = Set(fields.observaciones);
    active.status_cip_fa = Set(fields.status_cip_fa);
}
