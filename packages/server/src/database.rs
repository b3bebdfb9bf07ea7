use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Open a connection pool without touching the schema.
pub async fn connect(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(50)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Open the inventory database and bring its tables in line with the entities.
pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = connect(db_url).await?;
    db.get_schema_registry("inventario_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
