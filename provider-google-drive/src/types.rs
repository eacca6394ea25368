//! Google Drive API types
//!
//! Resources decoded from Google Drive API v3 responses, and the parameter
//! structs for each operation.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Google Drive API file resource
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Resource kind (`drive#file`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub id: String,

    pub name: String,

    pub mime_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub starred: bool,

    #[serde(default)]
    pub trashed: bool,

    /// Parent folder IDs
    #[serde(default)]
    pub parents: Vec<String>,

    /// Size in bytes, sent as a decimal string (omitted for folders and
    /// Google Docs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_checksum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

impl File {
    /// The `fields` selector requested for every file resource.
    pub const API_FIELDS: &'static str = "kind,id,name,mimeType,description,starred,trashed,parents,size,createdTime,modifiedTime,md5Checksum,webViewLink";

    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesList {
    /// Token for next page; absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,

    /// Whether the search skipped some corpora
    #[serde(default)]
    pub incomplete_search: bool,

    #[serde(default)]
    pub files: Vec<File>,
}

/// Google Drive API about resource
///
/// See: https://developers.google.com/drive/api/v3/reference/about
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub user: User,
    pub storage_quota: StorageQuota,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub photo_link: Option<String>,
    #[serde(default)]
    pub permission_id: Option<String>,
}

/// Storage limits and usage in bytes.
///
/// Drive encodes these as decimal strings; `limit` is absent for unlimited
/// storage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQuota {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub usage_in_drive: Option<String>,
    #[serde(default)]
    pub usage_in_drive_trash: Option<String>,
}

/// Query parameters for `files.list`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilesParams {
    pub corpora: Option<String>,
    pub drive_id: Option<String>,
    pub include_items_from_all_drives: Option<bool>,
    pub order_by: Option<String>,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    /// Search query (`q`), e.g. `trashed=false`
    pub query: Option<String>,
    pub spaces: Option<String>,
    pub supports_all_drives: Option<bool>,
}

impl ListFilesParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((name, value));
            }
        };

        push("corpora", self.corpora.clone());
        push("driveId", self.drive_id.clone());
        push(
            "includeItemsFromAllDrives",
            self.include_items_from_all_drives.map(|b| b.to_string()),
        );
        push("orderBy", self.order_by.clone());
        push("pageSize", self.page_size.map(|n| n.to_string()));
        push("pageToken", self.page_token.clone());
        push("q", self.query.clone());
        push("spaces", self.spaces.clone());
        push(
            "supportsAllDrives",
            self.supports_all_drives.map(|b| b.to_string()),
        );
        pairs
    }
}

/// Metadata sent as the JSON part of a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFileParams {
    pub metadata: FileMetadata,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFileDataParams {
    pub file_id: String,
    pub data: Bytes,
    /// Content type of the new data
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteFileParams {
    pub file_id: String,
    pub supports_all_drives: Option<bool>,
}

impl DeleteFileParams {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            supports_all_drives: None,
        }
    }
}
