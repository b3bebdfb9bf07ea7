use serde::{Deserialize, Serialize};

/// Request body for the local employee login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Employee alias.
    #[schema(example = "jperez")]
    pub usuario: Option<String>,
    /// Employee id, as text.
    #[serde(rename = "contraseña")]
    #[schema(example = "1042")]
    pub contrasena: Option<String>,
}

/// Request body forwarded to the directory service.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct AuthenticateRequest {
    #[schema(example = "jperez")]
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Employee id; falls back to the alias when the directory user has no
/// employee record.
#[derive(Serialize, Debug, Clone, PartialEq, utoipa::ToSchema)]
#[serde(untagged)]
pub enum EmpId {
    Number(i32),
    Alias(String),
}

#[derive(Serialize, Debug, Clone, PartialEq, utoipa::ToSchema)]
pub struct EmpleadoInfo {
    pub emp_id: EmpId,
    pub emp_alias: String,
}

/// Reply of the directory service. Unknown fields are ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectoryReply {
    pub authenticated: bool,
    pub message: Option<String>,
    pub username: Option<String>,
    pub is_admin: Option<bool>,
    pub user_info: Option<serde_json::Value>,
    pub groups: Option<serde_json::Value>,
}

/// Successful directory authentication.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    pub authenticated: bool,
    pub success: bool,
    pub data: EmpleadoInfo,
    pub username: String,
    pub is_admin: bool,
    pub message: Option<String>,
    #[schema(value_type = Object)]
    pub user_info: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub groups: Option<serde_json::Value>,
}
