use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::catalog::*;
use crate::models::shared::{ApiResponse, non_blank};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{kind}",
    tag = "Configuration",
    operation_id = "listCatalog",
    summary = "List active catalog entries",
    description = "Returns the active rows of `tipos`, `plantas` or `ubicaciones`, ordered by name.",
    params(("kind" = String, Path, description = "`tipos`, `plantas` or `ubicaciones`")),
    responses(
        (status = 200, description = "Catalog rows", body = ApiResponse<Vec<CatalogItem>>),
        (status = 404, description = "Unknown catalog (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_catalog(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<Vec<CatalogItem>>>, AppError> {
    let kind: CatalogKind = kind.parse()?;
    let items = kind.list_active(&state.db).await?;
    Ok(Json(ApiResponse::ok(items)))
}

#[utoipa::path(
    post,
    path = "/{kind}",
    tag = "Configuration",
    operation_id = "createCatalogEntry",
    summary = "Add a catalog entry",
    params(("kind" = String, Path, description = "`tipos`, `plantas` or `ubicaciones`")),
    request_body = CreateCatalogRequest,
    responses(
        (status = 201, description = "Entry created", body = ApiResponse<CatalogItem>),
        (status = 400, description = "Missing name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown catalog (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_catalog_entry(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    AppJson(payload): AppJson<CreateCatalogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let kind: CatalogKind = kind.parse()?;
    let nombre = non_blank(payload.nombre)
        .ok_or_else(|| AppError::Validation("El nombre es requerido".into()))?;

    let item = kind
        .create(&state.db, nombre, non_blank(payload.descripcion))
        .await?;
    info!(%kind, id = item.id, "Created catalog entry");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(item, "Registro creado correctamente")),
    ))
}

#[utoipa::path(
    put,
    path = "/{kind}",
    tag = "Configuration",
    operation_id = "updateCatalogEntry",
    summary = "Rename a catalog entry",
    params(("kind" = String, Path, description = "`tipos`, `plantas` or `ubicaciones`")),
    request_body = UpdateCatalogRequest,
    responses(
        (status = 200, description = "Entry updated", body = ApiResponse<CatalogItem>),
        (status = 400, description = "Missing id or name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown catalog or entry (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_catalog_entry(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    AppJson(payload): AppJson<UpdateCatalogRequest>,
) -> Result<Json<ApiResponse<CatalogItem>>, AppError> {
    let kind: CatalogKind = kind.parse()?;
    let (Some(id), Some(nombre)) = (payload.id, non_blank(payload.nombre)) else {
        return Err(AppError::Validation("ID y nombre son requeridos".into()));
    };

    let item = kind
        .update(&state.db, id, nombre, non_blank(payload.descripcion))
        .await?
        .ok_or_else(|| AppError::NotFound("Registro no encontrado".into()))?;

    Ok(Json(ApiResponse::with_message(
        item,
        "Registro actualizado correctamente",
    )))
}

#[utoipa::path(
    delete,
    path = "/{kind}/{id}",
    tag = "Configuration",
    operation_id = "deactivateCatalogEntry",
    summary = "Deactivate a catalog entry",
    description = "Sets `activo = false`. Rows are kept so existing assets still resolve their names.",
    params(
        ("kind" = String, Path, description = "`tipos`, `plantas` or `ubicaciones`"),
        ("id" = i32, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry deactivated", body = ApiResponse<CatalogItem>),
        (status = 404, description = "Unknown catalog or entry (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn deactivate_catalog_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<CatalogItem>>, AppError> {
    let kind: CatalogKind = kind.parse()?;
    if !kind.deactivate(&state.db, id).await? {
        return Err(AppError::NotFound("Registro no encontrado".into()));
    }
    let item = kind
        .find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Registro no encontrado".into()))?;
    info!(%kind, id, "Deactivated catalog entry");

    Ok(Json(ApiResponse::with_message(
        item,
        "Registro eliminado correctamente",
    )))
}
