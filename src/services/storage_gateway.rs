//! Mutating file operations: create-folder, upload, download, delete.
//!
//! Create and upload both finish with a public-read permission grant. A
//! grant that fails after the object was created is a partial failure: the
//! object is not rolled back, and the error carries the created id so the
//! caller can retry the grant or delete the orphan.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::{entry::FileEntry, listing::ensure_identifier},
};
use crate::services::{
    drive_client::{ByteStream, DriveApi},
    upload_spool::UploadSpool,
};
use tokio_util::io::ReaderStream;

/// A spooled multipart body ready to be pushed to the provider.
pub struct UploadRequest {
    pub spool: UploadSpool,
    pub file_name: String,
    pub mime_type: String,
    pub parent_id: String,
}

/// An open provider media stream plus the metadata the response needs.
pub struct Download {
    pub file_name: String,
    pub size: Option<u64>,
    pub stream: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

pub async fn create_folder(
    api: &dyn DriveApi,
    name: &str,
    parent_id: &str,
) -> GatewayResult<FileEntry> {
    if name.trim().is_empty() {
        return Err(GatewayError::validation("folder name must not be empty"));
    }
    ensure_identifier(parent_id, "folderId")?;

    let entry = api.create_folder(name, parent_id).await?;
    grant_or_partial(api, entry).await
}

/// Stream the spooled body to the provider, then grant public read. The
/// spool is released unconditionally, whatever the provider did.
pub async fn upload(api: &dyn DriveApi, request: UploadRequest) -> GatewayResult<FileEntry> {
    let UploadRequest {
        spool,
        file_name,
        mime_type,
        parent_id,
    } = request;

    let result = push_spool(api, &spool, &file_name, &mime_type, &parent_id).await;
    spool.release().await;

    let entry = result?;
    grant_or_partial(api, entry).await
}

async fn push_spool(
    api: &dyn DriveApi,
    spool: &UploadSpool,
    file_name: &str,
    mime_type: &str,
    parent_id: &str,
) -> GatewayResult<FileEntry> {
    ensure_identifier(parent_id, "folderId")?;

    let file = spool.open().await?;
    let stream: ByteStream = Box::pin(ReaderStream::new(file));
    api.upload_file(file_name, mime_type, parent_id, spool.size(), stream)
        .await
}

pub async fn download(api: &dyn DriveApi, file_id: &str) -> GatewayResult<Download> {
    ensure_identifier(file_id, "fileId")?;

    let meta = api.get_file(file_id).await?;
    let stream = api.download(file_id).await?;
    tracing::debug!(file = file_id, name = %meta.name, "download stream opened");

    Ok(Download {
        size: (!meta.is_folder()).then(|| meta.size_bytes()),
        file_name: meta.name,
        stream,
    })
}

pub async fn delete(api: &dyn DriveApi, file_id: &str) -> GatewayResult<()> {
    ensure_identifier(file_id, "fileId")?;
    api.delete_file(file_id).await
}

async fn grant_or_partial(api: &dyn DriveApi, entry: FileEntry) -> GatewayResult<FileEntry> {
    match api.grant_public_read(&entry.id).await {
        Ok(()) => Ok(entry),
        Err(err) => Err(GatewayError::provider_partial(
            format!("created {} but permission grant failed: {err}", entry.id),
            entry.id,
        )),
    }
}
