//! Spreadsheet import and export of the whole catalog

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use bytes::Bytes;
use http::{header, StatusCode};
use libcat_dal::catalog::SqliteCatalog;
use libcat_transfer::{Exporter, Importer, EXPORT_FILE_NAME, XLSX_MIME};
#[cfg_attr(not(feature = "openapi"), allow(unused_imports))]
use libcat_transfer::ImportReport;
use libcat_types::claim::Role;
use tracing::{debug, info};

use crate::{
    auth::token::RequiredRolesLayer,
    error::{ApiError, ApiResult},
    state::AppState,
};

const FILE_FIELD: &str = "file";

#[cfg(feature = "openapi")]
#[derive(serde::Deserialize, utoipa::ToSchema)]
#[allow(unused)]
struct UploadForm {
    #[schema(value_type = String, format = Binary, content_media_type = "application/octet-stream")]
    file: String,
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(post, path = "/import", tag = "Transfer", operation_id = "importCatalog",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = StatusCode::OK, description = "Import finished, row problems are listed in warnings", body = ImportReport),
    )
    )
)]
pub async fn import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut data: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().unwrap_or("unnamed").to_string();
            let bytes = field.bytes().await?;
            debug!("Received file {file_name} of {} bytes", bytes.len());
            data = Some(bytes);
            break;
        }
    }
    let data = data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Missing file field".into()))?;

    let _guard = state.lock_import().await;
    let store = SqliteCatalog::new(state.pool().clone());
    let report = Importer::new(&store).import_bytes(data.to_vec()).await?;

    Ok((StatusCode::OK, Json(report)))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(get, path = "/export", tag = "Transfer", operation_id = "exportCatalog",
    description = "Downloads the whole catalog as `Data.xlsx`. The workbook is Office Open XML (xlsx), \
not the legacy binary xls format; its single `Data` sheet keeps the import column layout.",
    responses((status = StatusCode::OK, description = "Catalog workbook",
        content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")))
)]
pub async fn export(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let store = SqliteCatalog::new(state.pool().clone());
    let data = Exporter::new(&store).export().await?;
    info!("Exported catalog, {} bytes", data.len());

    let headers = [
        (header::CONTENT_TYPE, XLSX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
        ),
    ];
    Ok((StatusCode::OK, headers, data))
}

pub fn router(limit_mb: usize) -> axum::Router<AppState> {
    axum::Router::new()
        .route("/import", post(import))
        .route("/export", get(export))
        .layer(RequiredRolesLayer::new([Role::Trusted, Role::Admin]))
        .layer(DefaultBodyLimit::max(1024 * 1024 * limit_mb))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(import, export))]
    struct ApiDocs;
    ApiDocs::openapi()
}
