use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::TransitionError;
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `DUPLICATE_TAG`,
    /// `NOT_FOUND`, `ASSET_RETIRED`, `INVALID_CREDENTIALS`, `AUTH_REJECTED`,
    /// `UPSTREAM_TIMEOUT`, `UPSTREAM_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Todos los campos requeridos deben ser completados")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// `numeroEtiqueta` (or the attachment prefix derived from it) is taken.
    DuplicateTag,
    NotFound(String),
    /// The asset is in `baja` and can no longer change.
    AssetRetired,
    InvalidCredentials,
    /// The directory service refused the credentials.
    AuthRejected {
        status: StatusCode,
        message: String,
    },
    UpstreamTimeout,
    UpstreamError {
        status: StatusCode,
        message: String,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::DuplicateTag => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_TAG",
                "El número de etiqueta ya existe".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::AssetRetired => (
                StatusCode::CONFLICT,
                "ASSET_RETIRED",
                "El activo está dado de baja y no puede modificarse".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Usuario o contraseña incorrectos".into(),
            ),
            AppError::AuthRejected { status, message } => (status, "AUTH_REJECTED", message),
            AppError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                "Request timeout: Authentication server did not respond in time".into(),
            ),
            AppError::UpstreamError { status, message } => {
                tracing::warn!(%status, "Directory service error: {}", message);
                (status, "UPSTREAM_ERROR", message)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                )
            }
        };

        (
            status,
            ErrorBody {
                success: false,
                code,
                message,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(msg) => AppError::Validation(msg),
            StorageError::SizeLimitExceeded { limit, .. } => AppError::Validation(format!(
                "El archivo excede el tamaño máximo de {limit} bytes"
            )),
            StorageError::Io(e) => AppError::Internal(format!("storage IO error: {e}")),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        tracing::warn!("Rejected status change: {err}");
        AppError::AssetRetired
    }
}

/// Map unique-constraint violations on the asset table to [`AppError::DuplicateTag`].
pub fn duplicate_tag_on_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateTag,
        _ => err.into(),
    }
}
