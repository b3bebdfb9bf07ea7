use std::sync::Arc;

use common::storage::AttachmentStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Connection holding the employee table; may be the same pool as `db`.
    pub empleados_db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub http: reqwest::Client,
}
