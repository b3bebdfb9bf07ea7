use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemAttachmentStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventario_server::config::AppConfig;
use inventario_server::database;
use inventario_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventario_server=debug,common=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to the inventory database")?;
    let empleados_db = match &config.database.empleados_url {
        Some(url) => database::connect(url)
            .await
            .context("Failed to connect to the employee database")?,
        None => db.clone(),
    };

    let attachments = FilesystemAttachmentStore::new(
        config.storage.public_dir.clone(),
        config.storage.max_file_size,
    )
    .await
    .context("Failed to prepare the upload directory")?;
    info!(
        path = %attachments.uploads_dir().display(),
        "Serving attachments"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        empleados_db,
        config: Arc::new(config),
        attachments: Arc::new(attachments),
        http: reqwest::Client::new(),
    };
    let app = inventario_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
