use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use sea_orm::*;
use tracing::{error, info, instrument, warn};

use crate::directory::empleado;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::auth::*;
use crate::models::shared::{ApiResponse, non_blank};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with employee alias and id",
    description = "Checks `usuario` against the employee alias and `contraseña` against the \
        numeric employee id.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<EmpleadoInfo>),
        (status = 400, description = "Missing or malformed credentials (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unknown employee (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<EmpleadoInfo>>, AppError> {
    let (Some(usuario), Some(contrasena)) =
        (non_blank(payload.usuario), non_blank(payload.contrasena))
    else {
        return Err(AppError::Validation(
            "Usuario y contraseña son requeridos".into(),
        ));
    };
    let emp_id: i32 = contrasena
        .parse()
        .map_err(|_| AppError::Validation("Contraseña inválida".into()))?;

    let empleado = empleado::Entity::find()
        .filter(empleado::Column::EmpAlias.eq(usuario.as_str()))
        .filter(empleado::Column::EmpId.eq(emp_id))
        .one(&state.empleados_db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    info!(emp_id = empleado.emp_id, "Employee logged in");
    Ok(Json(ApiResponse::with_message(
        EmpleadoInfo {
            emp_id: EmpId::Number(empleado.emp_id),
            emp_alias: empleado.emp_alias,
        },
        "Inicio de sesión exitoso",
    )))
}

#[utoipa::path(
    post,
    path = "/authenticate",
    tag = "Auth",
    operation_id = "authenticate",
    summary = "Authenticate against the directory service",
    description = "Forwards the credentials to the configured directory service and, on success, \
        resolves the employee record by alias. When no record exists (or the lookup fails) the \
        user name stands in for both employee id and alias.",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthenticateResponse),
        (status = 400, description = "Missing credentials (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Rejected by the directory (AUTH_REJECTED)", body = ErrorBody),
        (status = 500, description = "Directory unreachable or malformed reply (UPSTREAM_ERROR)", body = ErrorBody),
        (status = 504, description = "Directory timed out (UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn authenticate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AuthenticateRequest>,
) -> Result<Json<AuthenticateResponse>, AppError> {
    let (Some(username), Some(password)) = (
        non_blank(payload.username),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    };

    let reply = call_directory(&state, &username, &password).await?;
    let username = non_blank(reply.username.clone()).unwrap_or(username);

    let lookup = empleado::Entity::find()
        .filter(empleado::Column::EmpAlias.eq(username.as_str()))
        .one(&state.empleados_db)
        .await;
    let fallback = || EmpleadoInfo {
        emp_id: EmpId::Alias(username.clone()),
        emp_alias: username.clone(),
    };
    let (data, message) = match lookup {
        Ok(Some(empleado)) => (
            EmpleadoInfo {
                emp_id: EmpId::Number(empleado.emp_id),
                emp_alias: empleado.emp_alias,
            },
            reply.message,
        ),
        Ok(None) => {
            warn!(%username, "Authenticated user has no employee record");
            (
                fallback(),
                Some(format!(
                    "User authenticated (employee record not found for {username})"
                )),
            )
        }
        Err(e) => {
            error!(%username, error = %e, "Employee lookup failed");
            (
                fallback(),
                Some("Authentication successful (database lookup unavailable)".into()),
            )
        }
    };

    info!(%username, "Directory authentication succeeded");
    Ok(Json(AuthenticateResponse {
        authenticated: true,
        success: true,
        data,
        username,
        is_admin: reply.is_admin.unwrap_or(false),
        message,
        user_info: reply.user_info,
        groups: reply.groups,
    }))
}

/// POST the credentials to the directory service and accept only a positive reply.
async fn call_directory(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<DirectoryReply, AppError> {
    let auth = &state.config.auth;
    let response = state
        .http
        .post(&auth.directory_url)
        .timeout(Duration::from_secs(auth.timeout_secs))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AppError::UpstreamTimeout
            } else {
                AppError::UpstreamError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("Error connecting to authentication server: {e}"),
                }
            }
        })?;

    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if !is_json {
        return Err(AppError::UpstreamError {
            status: error_status_or(status, StatusCode::INTERNAL_SERVER_ERROR),
            message: format!("Invalid response from authentication server: {status}"),
        });
    }

    let reply: DirectoryReply = response.json().await.map_err(|e| {
        if e.is_timeout() {
            AppError::UpstreamTimeout
        } else {
            AppError::UpstreamError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Invalid response format from authentication server".into(),
            }
        }
    })?;

    if !status.is_success() || !reply.authenticated {
        return Err(AppError::AuthRejected {
            status: error_status_or(status, StatusCode::UNAUTHORIZED),
            message: reply
                .message
                .unwrap_or_else(|| "Authentication failed".into()),
        });
    }
    Ok(reply)
}

/// The upstream status when it signals an error, `fallback` otherwise.
fn error_status_or(status: StatusCode, fallback: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() {
        status
    } else {
        fallback
    }
}
