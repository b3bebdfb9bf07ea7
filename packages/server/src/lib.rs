pub mod config;
pub mod database;
pub mod directory;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventario de Activos API",
        version = "1.0.0",
        description = "Asset inventory with per-asset file attachments"
    ),
    tags(
        (name = "Activos", description = "Asset CRUD and retirement (baja)"),
        (name = "Attachments", description = "Pictures and documents stored per asset"),
        (name = "Configuration", description = "Tipos, plantas and ubicaciones catalogs"),
        (name = "Auth", description = "Employee login and directory authentication"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let uploads = ServeDir::new(state.config.storage.public_dir.join("uploads"));
    let body_limit = DefaultBodyLimit::max(state.config.storage.max_request_size);
    let cors = cors_layer(&state.config.server.cors);

    router
        .layer(body_limit)
        .with_state(state)
        .nest_service("/uploads", uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
