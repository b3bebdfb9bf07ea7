use serde::Deserialize;

/// Request body for deleting attachments of an asset.
///
/// Lists hold public URLs as returned by the files endpoint; flags remove the
/// single-valued documents.
#[derive(Deserialize, Default, Debug, PartialEq, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteFilesRequest {
    #[schema(example = json!(["/uploads/pictures/A-100_1.jpg"]))]
    pub pictures: Vec<String>,
    pub pedimento: bool,
    pub factura: bool,
    pub archivo_alta: bool,
    pub archivo_baja: bool,
    pub extra_files: Vec<String>,
}

/// Optional body of the retire-by-DELETE call.
#[derive(Deserialize, Default, Debug, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BajaRequest {
    /// Defaults to `unknown`.
    pub user_baja: Option<String>,
    pub comentario_baja: Option<String>,
}
