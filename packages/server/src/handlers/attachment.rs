use axum::Json;
use axum::extract::{Path, State};
use common::storage::{AttachmentCategory, AttachmentSet, DeletionReport};
use tracing::{info, instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::extractors::form::AssetForm;
use crate::extractors::json::AppJson;
use crate::models::attachment::DeleteFilesRequest;
use crate::models::shared::ApiResponse;
use crate::state::AppState;

use super::activo::{find_activo, reject_baja_document};

#[utoipa::path(
    get,
    path = "/{id}/files",
    tag = "Attachments",
    operation_id = "getActivoFiles",
    summary = "List the attachments of an asset",
    description = "Scans the upload folders for files carrying the asset's prefix. \
        Lists are sorted; single-valued documents are `null` when absent.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Attachment URLs", body = ApiResponse<AttachmentSet>),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_files(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AttachmentSet>>, AppError> {
    let activo = find_activo(&state.db, id).await?;
    let files = state.attachments.lookup(&activo.prefijo_archivos).await?;
    Ok(Json(ApiResponse::ok(files)))
}

#[utoipa::path(
    delete,
    path = "/{id}/files",
    tag = "Attachments",
    operation_id = "deleteActivoFiles",
    summary = "Delete attachments of an asset",
    description = "Removes the listed pictures and extra files and, for each flag set, the \
        single-valued document. Files that do not belong to the asset or do not exist are \
        reported in `failedFiles`; the call still succeeds so partial progress is visible.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = DeleteFilesRequest,
    responses(
        (status = 200, description = "Per-file outcome", body = ApiResponse<DeletionReport>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset is retired (ASSET_RETIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn delete_files(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<DeleteFilesRequest>,
) -> Result<Json<ApiResponse<DeletionReport>>, AppError> {
    let activo = find_activo(&state.db, id).await?;
    activo.status.ensure_mutable()?;

    let prefix = activo.prefijo_archivos.as_str();
    let store = &state.attachments;
    let mut report = DeletionReport::default();

    for (requested, category) in [
        (payload.pedimento, AttachmentCategory::Pedimento),
        (payload.factura, AttachmentCategory::Factura),
        (payload.archivo_alta, AttachmentCategory::ArchivoAlta),
        (payload.archivo_baja, AttachmentCategory::ArchivoBaja),
    ] {
        if requested {
            report.merge(store.delete_category(prefix, category).await);
        }
    }
    if !payload.pictures.is_empty() {
        report.merge(
            store
                .delete_urls(prefix, AttachmentCategory::Picture, &payload.pictures)
                .await,
        );
    }
    if !payload.extra_files.is_empty() {
        report.merge(
            store
                .delete_urls(prefix, AttachmentCategory::Extra, &payload.extra_files)
                .await,
        );
    }

    let message = if report.is_complete() {
        "Archivos eliminados correctamente"
    } else {
        warn!(
            id,
            failed = report.failed_files.len(),
            "Some attachments could not be deleted"
        );
        "Algunos archivos no pudieron eliminarse"
    };
    info!(id, deleted = report.deleted_files.len(), "Deleted attachments");

    Ok(Json(ApiResponse::with_message(report, message)))
}

#[utoipa::path(
    post,
    path = "/{id}/upload",
    tag = "Attachments",
    operation_id = "uploadActivoFiles",
    summary = "Upload attachments to an asset",
    description = "Stores every file of the multipart body under the asset's prefix. \
        Pictures and extra files get the next free index; `pedimento`, `factura` and \
        `archivoAlta` replace the previous document. Returns the URLs just stored.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body(content_type = "multipart/form-data", description = "Files keyed by category field name"),
    responses(
        (status = 200, description = "Stored files", body = ApiResponse<AttachmentSet>),
        (status = 400, description = "No files or file too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Asset is retired (ASSET_RETIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn upload_files(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: AssetForm,
) -> Result<Json<ApiResponse<AttachmentSet>>, AppError> {
    let activo = find_activo(&state.db, id).await?;
    activo.status.ensure_mutable()?;

    reject_baja_document(&mut form)?;
    if form.files.is_empty() {
        return Err(AppError::Validation("No se recibieron archivos".into()));
    }

    let saved = state
        .attachments
        .save_all(&activo.prefijo_archivos, &form.files)
        .await?;
    info!(id, count = form.files.len(), "Uploaded attachments");

    Ok(Json(ApiResponse::with_message(
        saved,
        "Archivos subidos correctamente",
    )))
}
