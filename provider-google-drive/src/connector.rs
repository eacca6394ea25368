//! Google Drive API connector implementation
//!
//! Implements [`DriveApi`] for Google Drive API v3 on top of the host
//! [`HttpClient`], authorizing every request through the [`AuthManager`].

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::IdGenerator;
use bytes::Bytes;
use core_auth::AuthManager;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{GoogleDriveError, Result};
use crate::multipart;
use crate::types::{
    About, CreateFileParams, DeleteFileParams, File, FilesList, ListFilesParams,
    UpdateFileDataParams,
};

/// Google API host; Drive's metadata and upload endpoints both live here.
const API_BASE: &str = "https://www.googleapis.com";

/// Fields requested from `about.get`
const ABOUT_FIELDS: &str = "user,storageQuota";

/// Google Drive file operations.
///
/// Every call first refreshes an expired access token, then fails with
/// [`GoogleDriveError::NotAuthorized`] if no credentials are stored.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Signed-in user and storage quota.
    async fn get_about(&self) -> Result<About>;

    /// One page of files matching `params`.
    async fn list_files(&self, params: ListFilesParams) -> Result<FilesList>;

    async fn get_file(&self, file_id: &str) -> Result<File>;

    /// Raw file content.
    async fn get_file_data(&self, file_id: &str) -> Result<Bytes>;

    /// Upload a new file with metadata in a single request.
    async fn create_file(&self, params: CreateFileParams) -> Result<File>;

    /// Replace the content of an existing file.
    async fn update_file_data(&self, params: UpdateFileDataParams) -> Result<File>;

    /// Permanently delete a file, skipping the trash.
    async fn delete_file(&self, params: DeleteFileParams) -> Result<()>;
}

/// Google Drive API connector
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::{DriveApi, GoogleDriveConnector, ListFilesParams};
///
/// let connector = GoogleDriveConnector::new(auth, http_client, id_generator);
/// let page = connector
///     .list_files(ListFilesParams {
///         query: Some("trashed=false".into()),
///         ..Default::default()
///     })
///     .await?;
/// ```
#[derive(Clone)]
pub struct GoogleDriveConnector {
    auth: AuthManager,

    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Source of multipart boundaries
    id_generator: Arc<dyn IdGenerator>,
}

impl GoogleDriveConnector {
    pub fn new(
        auth: AuthManager,
        http_client: Arc<dyn HttpClient>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            auth,
            http_client,
            id_generator,
        }
    }

    /// Build `https://www.googleapis.com/<segments>?<query>`.
    ///
    /// Segments are percent-encoded, so file IDs go in as-is.
    fn endpoint(segments: &[&str], query: &[(&str, String)]) -> Result<String> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| GoogleDriveError::ParseError(format!("Invalid API base: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| GoogleDriveError::ParseError("API base cannot have a path".to_string()))?
            .clear()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url.into())
    }

    /// Refresh if needed and start a request carrying the stored token.
    async fn authorized_request(&self, method: HttpMethod, url: String) -> Result<HttpRequest> {
        self.auth.refresh_token().await?;

        let credentials = self
            .auth
            .credentials()
            .await?
            .ok_or(GoogleDriveError::NotAuthorized)?;

        Ok(HttpRequest::new(method, url)
            .authorization(credentials.token_type(), credentials.access_token()))
    }

    /// Execute a request, turning non-2xx into [`GoogleDriveError::Response`].
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(GoogleDriveError::Network)?;

        if !response.is_success() {
            warn!(status = response.status, "Google Drive API request failed");
            return Err(GoogleDriveError::Response {
                status_code: response.status,
                body: response.body,
            });
        }

        debug!(status = response.status, "API request succeeded");
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| GoogleDriveError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }

    /// Send a `multipart/related` upload and decode the resulting file.
    async fn upload(
        &self,
        method: HttpMethod,
        segments: &[&str],
        metadata_json: &[u8],
        mime_type: &str,
        data: &[u8],
    ) -> Result<File> {
        let url = Self::endpoint(
            segments,
            &[
                ("uploadType", "multipart".to_string()),
                ("fields", File::API_FIELDS.to_string()),
            ],
        )?;

        let boundary = self.id_generator.new_id().to_string();
        let body = multipart::related_body(&boundary, metadata_json, mime_type, data);

        let request = self
            .authorized_request(method, url)
            .await?
            .header("Content-Type", multipart::content_type(&boundary))
            .body(body);

        let response = self.send(request).await?;
        Self::decode(&response, "uploaded file")
    }
}

#[async_trait]
impl DriveApi for GoogleDriveConnector {
    #[instrument(skip(self))]
    async fn get_about(&self) -> Result<About> {
        let url = Self::endpoint(
            &["drive", "v3", "about"],
            &[("fields", ABOUT_FIELDS.to_string())],
        )?;

        let request = self.authorized_request(HttpMethod::Get, url).await?;
        let response = self.send(request).await?;
        Self::decode(&response, "about resource")
    }

    #[instrument(skip(self, params), fields(page_token = ?params.page_token))]
    async fn list_files(&self, params: ListFilesParams) -> Result<FilesList> {
        let mut query = vec![(
            "fields",
            format!("nextPageToken,incompleteSearch,files({})", File::API_FIELDS),
        )];
        query.extend(params.query_pairs());

        let url = Self::endpoint(&["drive", "v3", "files"], &query)?;
        let request = self.authorized_request(HttpMethod::Get, url).await?;
        let response = self.send(request).await?;

        let list: FilesList = Self::decode(&response, "files list")?;
        info!(
            count = list.files.len(),
            has_more = list.next_page_token.is_some(),
            "Listed files from Google Drive"
        );
        Ok(list)
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn get_file(&self, file_id: &str) -> Result<File> {
        let url = Self::endpoint(
            &["drive", "v3", "files", file_id],
            &[("fields", File::API_FIELDS.to_string())],
        )?;

        let request = self.authorized_request(HttpMethod::Get, url).await?;
        let response = self.send(request).await?;
        Self::decode(&response, "file metadata")
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn get_file_data(&self, file_id: &str) -> Result<Bytes> {
        let url = Self::endpoint(
            &["drive", "v3", "files", file_id],
            &[("alt", "media".to_string())],
        )?;

        let request = self.authorized_request(HttpMethod::Get, url).await?;
        let response = self.send(request).await?;

        info!("Downloaded {} bytes", response.body.len());
        Ok(response.body)
    }

    #[instrument(skip(self, params), fields(name = %params.metadata.name))]
    async fn create_file(&self, params: CreateFileParams) -> Result<File> {
        let metadata = serde_json::to_vec(&params.metadata).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to encode file metadata: {}", e))
        })?;
        let mime_type = params
            .metadata
            .mime_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let file = self
            .upload(
                HttpMethod::Post,
                &["upload", "drive", "v3", "files"],
                &metadata,
                mime_type,
                &params.data,
            )
            .await?;

        info!(file_id = %file.id, "Created file");
        Ok(file)
    }

    #[instrument(skip(self, params), fields(file_id = %params.file_id))]
    async fn update_file_data(&self, params: UpdateFileDataParams) -> Result<File> {
        let file = self
            .upload(
                HttpMethod::Patch,
                &["upload", "drive", "v3", "files", params.file_id.as_str()],
                b"{}",
                &params.mime_type,
                &params.data,
            )
            .await?;

        info!(bytes = params.data.len(), "Updated file data");
        Ok(file)
    }

    #[instrument(skip(self, params), fields(file_id = %params.file_id))]
    async fn delete_file(&self, params: DeleteFileParams) -> Result<()> {
        let query: Vec<_> = params
            .supports_all_drives
            .map(|b| ("supportsAllDrives", b.to_string()))
            .into_iter()
            .collect();

        let url = Self::endpoint(&["drive", "v3", "files", params.file_id.as_str()], &query)?;
        let request = self.authorized_request(HttpMethod::Delete, url).await?;
        self.send(request).await?;

        info!("Deleted file");
        Ok(())
    }
}

impl std::fmt::Debug for GoogleDriveConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveConnector")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
