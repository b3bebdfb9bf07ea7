use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{activo, attachment, auth, baja, catalog};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/activos", activo_routes())
        .nest("/configuration", catalog_routes())
        .nest("/auth", auth_routes())
}

fn activo_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(activo::list_activos, activo::create_activo))
        .routes(routes!(
            activo::get_activo,
            activo::update_activo,
            activo::delete_activo
        ))
        .routes(routes!(attachment::get_files, attachment::delete_files))
        .routes(routes!(attachment::upload_files))
        .routes(routes!(baja::baja_activo))
}

fn catalog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            catalog::list_catalog,
            catalog::create_catalog_entry,
            catalog::update_catalog_entry
        ))
        .routes(routes!(catalog::deactivate_catalog_entry))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::login))
        .routes(routes!(auth::authenticate))
}
