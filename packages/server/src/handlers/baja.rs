use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use common::AssetStatus;
use common::storage::{AttachmentCategory, Upload};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::activo;
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::AssetForm;
use crate::models::activo::{ActivoResponse, ActivoWithFiles};
use crate::models::shared::ApiResponse;
use crate::state::AppState;
use crate::utils::catalog::load_catalog_names;
use crate::utils::filename::ensure_pdf;

use super::activo::find_activo;

const DEFAULT_USER_BAJA: &str = "unknown";

#[utoipa::path(
    post,
    path = "/{id}/baja",
    tag = "Activos",
    operation_id = "bajaActivo",
    summary = "Retire an asset with its signed form",
    description = "Moves the asset to status `baja` and stores the retirement document. \
        Multipart fields: `formatoBaja` (or `archivoBaja`, PDF, required), `userBaja` \
        (default `unknown`) and `comentarioBaja`. Once retired the asset and its \
        attachments are read-only.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body(content_type = "multipart/form-data", description = "Retirement document and details"),
    responses(
        (status = 200, description = "Asset retired", body = ApiResponse<ActivoWithFiles>),
        (status = 400, description = "Missing or non-PDF document (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset already retired (ASSET_RETIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn baja_activo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: AssetForm,
) -> Result<Json<ApiResponse<ActivoWithFiles>>, AppError> {
    let document = form
        .take_files(AttachmentCategory::ArchivoBaja)
        .pop()
        .ok_or_else(|| AppError::Validation("El formato de baja (PDF) es requerido".into()))?;
    ensure_pdf(&document.file_name)?;

    let model = retire(
        &state,
        id,
        form.text_owned("userBaja"),
        form.text_owned("comentarioBaja"),
        Some(&document),
    )
    .await?;

    let files = state.attachments.lookup(&model.prefijo_archivos).await?;
    let names = load_catalog_names(&state.db).await?;
    Ok(Json(ApiResponse::with_message(
        ActivoWithFiles {
            activo: ActivoResponse::from_model(model, &names),
            files,
        },
        "Activo dado de baja correctamente",
    )))
}

/// Move an asset from `activo` to `baja`, storing `document` when given.
///
/// The status change is claimed first, inside a transaction, and only applies
/// while the asset is still `activo`. Of two concurrent requests exactly one
/// gets to write the document; a failed write rolls the status back.
pub(crate) async fn retire(
    state: &AppState,
    id: i32,
    user_baja: Option<String>,
    comentario_baja: Option<String>,
    document: Option<&Upload>,
) -> Result<activo::Model, AppError> {
    let existing = find_activo(&state.db, id).await?;
    let status = existing.status.transition(AssetStatus::Baja)?;

    let user_baja = user_baja
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_BAJA.to_string());
    let changes = activo::ActiveModel {
        status: Set(status),
        fecha_baja: Set(Some(Utc::now().date_naive())),
        user_baja: Set(Some(user_baja)),
        comentario_baja: Set(comentario_baja
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    let txn = state.db.begin().await?;
    let result = activo::Entity::update_many()
        .set(changes)
        .filter(activo::Column::Id.eq(id))
        .filter(activo::Column::Status.eq(existing.status))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::AssetRetired);
    }
    let model = find_activo(&txn, id).await?;

    if let Some(document) = document {
        state
            .attachments
            .save(
                &model.prefijo_archivos,
                AttachmentCategory::ArchivoBaja,
                document,
            )
            .await?;
    }
    txn.commit().await?;

    info!(id, prefix = %model.prefijo_archivos, "Asset retired");
    Ok(model)
}
