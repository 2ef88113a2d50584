//! Google Drive v3 API client.
//!
//! `DriveApi` is the seam between the gateway and the remote provider:
//! handlers and services only see the trait, so tests can substitute a
//! stub and the live implementation stays request-scoped. A `DriveClient`
//! is constructed per request, binding the shared reqwest connection pool
//! to that request's credential and nothing else.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::{credential::Credential, entry::FileEntry},
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::{io, pin::Pin};

/// Drive API base URL.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Drive upload API base URL.
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Metadata fields requested on every call that returns an entry.
const ENTRY_FIELDS: &str = "id,name,mimeType,size,createdTime,webViewLink,parents";

/// Byte stream flowing between provider and HTTP response/request bodies.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// Operations the gateway needs from the storage provider.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Immediate, non-trashed children of `parent_id`.
    async fn list_children(&self, parent_id: &str) -> GatewayResult<Vec<FileEntry>>;

    /// Metadata for a single entry.
    async fn get_file(&self, file_id: &str) -> GatewayResult<FileEntry>;

    async fn create_folder(&self, name: &str, parent_id: &str) -> GatewayResult<FileEntry>;

    /// Stream `body` to the provider as a new file under `parent_id`.
    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        size: u64,
        body: ByteStream,
    ) -> GatewayResult<FileEntry>;

    /// Grant the anyone/reader permission.
    async fn grant_public_read(&self, file_id: &str) -> GatewayResult<()>;

    /// Open a media stream for an entry's content.
    async fn download(&self, file_id: &str) -> GatewayResult<ByteStream>;

    async fn delete_file(&self, file_id: &str) -> GatewayResult<()>;
}

/// Builds a provider client bound to one request's credential.
pub trait DriveConnector: Send + Sync {
    fn bind(&self, credential: Credential) -> Box<dyn DriveApi>;
}

/// Live connector sharing a single reqwest connection pool across requests.
/// The pool is immutable; the credential never outlives the request.
pub struct HttpDriveConnector {
    http: Client,
}

impl HttpDriveConnector {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpDriveConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveConnector for HttpDriveConnector {
    fn bind(&self, credential: Credential) -> Box<dyn DriveApi> {
        Box::new(DriveClient {
            http: self.http.clone(),
            credential,
        })
    }
}

/// reqwest-backed Drive client for a single request.
pub struct DriveClient {
    http: Client,
    credential: Credential,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl DriveClient {
    fn bearer(&self) -> String {
        format!("Bearer {}", self.credential.access_token)
    }

    /// Translate a provider response into the gateway taxonomy and decode
    /// the JSON payload.
    async fn decode<T: DeserializeOwned>(&self, response: Response, what: &str) -> GatewayResult<T> {
        let response = self.check_status(response, what).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("decoding {what} response: {e}")))
    }

    async fn check_status(&self, response: Response, what: &str) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => GatewayError::CredentialExpired,
            StatusCode::NOT_FOUND => GatewayError::not_found(what.to_string()),
            _ => GatewayError::provider(format!("{what}: provider returned {status}: {body}")),
        })
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn list_children(&self, parent_id: &str) -> GatewayResult<Vec<FileEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let query = format!("'{}' in parents and trashed = false", parent_id);
        let fields = format!("files({}),nextPageToken", ENTRY_FIELDS);

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", DRIVE_API_BASE))
                .header(header::AUTHORIZATION, self.bearer())
                .query(&[
                    ("q", query.as_str()),
                    ("fields", fields.as_str()),
                    ("pageSize", "1000"),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| GatewayError::provider(format!("listing folder: {e}")))?;
            let page: FileListResponse = self.decode(response, "folder listing").await?;
            entries.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(parent = parent_id, count = entries.len(), "listed children");
        Ok(entries)
    }

    async fn get_file(&self, file_id: &str) -> GatewayResult<FileEntry> {
        let response = self
            .http
            .get(format!("{}/files/{}", DRIVE_API_BASE, file_id))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[("fields", ENTRY_FIELDS), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("fetching file metadata: {e}")))?;

        self.decode(response, &format!("file {file_id}")).await
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> GatewayResult<FileEntry> {
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": crate::models::entry::FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(format!("{}/files", DRIVE_API_BASE))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[("fields", ENTRY_FIELDS), ("supportsAllDrives", "true")])
            .json(&metadata)
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("creating folder: {e}")))?;

        self.decode(response, "folder creation").await
    }

    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        parent_id: &str,
        size: u64,
        body: ByteStream,
    ) -> GatewayResult<FileEntry> {
        // Open a resumable session, then push the whole spooled body in a
        // single PUT with a known length.
        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id],
        });

        let response = self
            .http
            .post(format!(
                "{}/files?uploadType=resumable&supportsAllDrives=true",
                DRIVE_UPLOAD_BASE
            ))
            .header(header::AUTHORIZATION, self.bearer())
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", size.to_string())
            .json(&metadata)
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("starting upload: {e}")))?;
        let response = self.check_status(response, "upload session").await?;

        let upload_uri = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| GatewayError::provider("upload session returned no URI"))?
            .to_string();

        let response = self
            .http
            .put(&upload_uri)
            .header(header::AUTHORIZATION, self.bearer())
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CONTENT_LENGTH, size.to_string())
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("uploading file body: {e}")))?;

        self.decode(response, "file upload").await
    }

    async fn grant_public_read(&self, file_id: &str) -> GatewayResult<()> {
        let grant = serde_json::json!({
            "role": "reader",
            "type": "anyone",
        });

        let response = self
            .http
            .post(format!("{}/files/{}/permissions", DRIVE_API_BASE, file_id))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[("supportsAllDrives", "true")])
            .json(&grant)
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("granting permission: {e}")))?;

        self.check_status(response, "permission grant").await?;
        Ok(())
    }

    async fn download(&self, file_id: &str) -> GatewayResult<ByteStream> {
        let response = self
            .http
            .get(format!("{}/files/{}", DRIVE_API_BASE, file_id))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("opening download: {e}")))?;
        let response = self.check_status(response, &format!("file {file_id}")).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(io::Error::other));
        Ok(Box::pin(stream))
    }

    async fn delete_file(&self, file_id: &str) -> GatewayResult<()> {
        let response = self
            .http
            .delete(format!("{}/files/{}", DRIVE_API_BASE, file_id))
            .header(header::AUTHORIZATION, self.bearer())
            .query(&[("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("deleting file: {e}")))?;

        self.check_status(response, &format!("file {file_id}")).await?;
        Ok(())
    }
}
