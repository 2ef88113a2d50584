//! HTTP handlers for file operations. All of them take a `Session`, so an
//! unauthenticated request is rejected before any of this code runs.
//! Bodies stream in both directions; nothing is buffered whole in memory.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::{
        entry::FileEntry,
        listing::{ListingParams, ListingQuery, ensure_identifier},
    },
    services::{
        AppState,
        access_guard::Session,
        catalog_service, storage_gateway,
        storage_gateway::UploadRequest,
        upload_spool::UploadSpool,
    },
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, header},
    response::Response,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    pub file_id: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// `GET /files` — list, search and sort entries under a parent folder.
pub async fn list_files(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListingParams>,
) -> GatewayResult<Json<ListResponse>> {
    let query = ListingQuery::from_params(params, &state.cfg.root_folder_id)?;
    let files = catalog_service::list(session.api(), &query).await?;
    Ok(Json(ListResponse { files }))
}

/// `POST /files/upload` — multipart upload: spool the `file` part locally,
/// stream it to the provider, grant public read.
pub async fn upload_file(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> GatewayResult<Json<MutationResponse>> {
    let mut folder_id: Option<String> = None;
    let mut pending: Option<UploadRequest> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::validation(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("folderId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| GatewayError::validation(format!("reading folderId: {e}")))?;
                ensure_identifier(&value, "folderId")?;
                folder_id = Some(value);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let body = futures::stream::unfold(field, |mut field| async move {
                    match field.chunk().await {
                        Ok(Some(chunk)) => Some((Ok(chunk), field)),
                        Ok(None) => None,
                        Err(err) => Some((Err(err), field)),
                    }
                });
                let spool =
                    UploadSpool::create(std::path::Path::new(&state.cfg.spool_dir), body).await?;

                pending = Some(UploadRequest {
                    spool,
                    file_name,
                    mime_type,
                    // Filled in below once all fields are known.
                    parent_id: String::new(),
                });
            }
            _ => {}
        }
    }

    let mut request =
        pending.ok_or_else(|| GatewayError::validation("no file part in upload body"))?;
    request.parent_id = folder_id.unwrap_or_else(|| state.cfg.root_folder_id.clone());

    let uploaded = storage_gateway::upload(session.api(), request).await?;
    Ok(Json(MutationResponse {
        success: true,
        file_id: uploaded.id,
        file_name: uploaded.name,
    }))
}

/// `POST /files/create-folder` — JSON body `{name, folderId?}`. Field
/// types are checked by hand so a wrong type is a 400, not a decode error.
pub async fn create_folder(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Value>,
) -> GatewayResult<Json<MutationResponse>> {
    let name = match body.get("name") {
        Some(Value::String(name)) => name.as_str(),
        Some(_) => return Err(GatewayError::validation("name must be a string")),
        None => return Err(GatewayError::validation("name is required")),
    };
    let parent_id = match body.get("folderId") {
        None | Some(Value::Null) => state.cfg.root_folder_id.clone(),
        Some(Value::String(id)) => id.clone(),
        Some(_) => return Err(GatewayError::validation("folderId must be a string")),
    };

    let folder = storage_gateway::create_folder(session.api(), name, &parent_id).await?;
    Ok(Json(MutationResponse {
        success: true,
        file_id: folder.id,
        file_name: folder.name,
    }))
}

/// `GET /files/download/{id}` — stream the entry's content through as an
/// attachment. A mid-stream provider failure terminates the body; the
/// connection is never left hanging.
pub async fn download_file(
    session: Session,
    Path(file_id): Path<String>,
) -> GatewayResult<Response> {
    let download = storage_gateway::download(session.api(), &file_id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.file_name.replace(['"', '\\'], "_")
    );

    let mut response = Response::new(Body::from_stream(download.stream));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    Ok(response)
}

/// `DELETE /files/{id}`.
pub async fn delete_file(
    session: Session,
    Path(file_id): Path<String>,
) -> GatewayResult<Json<DeleteResponse>> {
    storage_gateway::delete(session.api(), &file_id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "file deleted".into(),
    }))
}
