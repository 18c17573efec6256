use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Router,
};
use bytes::Bytes;
use tracing::{info, instrument};

use super::services::{build_workbook, export_filename};
use crate::{app::internal, auth::extractors::AuthUser, clock, state::AppState, storage::mime_from_ext};

pub fn routes() -> Router<AppState> {
    Router::new().route("/download_excel", get(download_excel))
}

/// Every entry from every user, written to the upload dir and sent back as an attachment.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn download_excel(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<(HeaderMap, Bytes), (StatusCode, String)> {
    let entries = state.entries.list_all().await.map_err(internal)?;
    let workbook = Bytes::from(build_workbook(&entries).map_err(internal)?);
    let filename = export_filename(clock::now_ist());

    state
        .storage
        .put_object(&filename, workbook.clone())
        .await
        .map_err(internal)?;
    info!(rows = entries.len(), %filename, "export written");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(mime_from_ext(&filename)),
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| internal(e.into()))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok((headers, workbook))
}
