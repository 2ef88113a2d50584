//! File and folder metadata as returned by the Drive v3 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type the provider uses to mark an entry as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A single file or folder under a parent location.
///
/// Field names follow the Drive v3 wire format (camelCase). The struct is
/// read-only to this service; all fields beyond `id`/`name`/`mimeType` are
/// optional because the provider only returns what the `fields` selector
/// asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Provider-assigned identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// MIME type; `FOLDER_MIME_TYPE` marks a folder.
    pub mime_type: String,

    /// Size in bytes as a decimal string. Folders have no size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Creation instant, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    /// Browser link into the provider's own UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,

    /// Parent folder ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl FileEntry {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Size in bytes; missing or unparseable sizes count as zero so that
    /// size ordering stays total.
    pub fn size_bytes(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }
}
