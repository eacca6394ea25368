//! Sign-in through file operations via the facade, against in-memory bridges.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::StreamExt;
use gdrive_client::bridge_traits::error::Result as BridgeResult;
use gdrive_client::bridge_traits::{
    Clock, HttpClient, HttpMethod, HttpRequest, HttpResponse, IdGenerator, SecureStore, UrlOpener,
};
use gdrive_client::{
    AuthConfig, CoreConfig, CreateFileParams, DeleteFileParams, DriveApi, DriveClient,
    FileMetadata, GoogleDriveError, ListFilesParams,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const REDIRECT_URI: &str = "com.example.app://";

struct FakeClock(Mutex<DateTime<Utc>>);

impl FakeClock {
    fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl UrlOpener for RecordingOpener {
    async fn open_url(&self, url: &str) -> BridgeResult<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct SequentialIds(Mutex<u128>);

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> Uuid {
        let mut next = self.0.lock().unwrap();
        *next += 1;
        Uuid::from_u128(*next)
    }
}

/// Replies in order; records every request.
#[derive(Default)]
struct ScriptedHttpClient {
    replies: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn reply(&self, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let (status, body) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted request");
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body),
        })
    }
}

struct Harness {
    client: DriveClient,
    http: Arc<ScriptedHttpClient>,
    clock: Arc<FakeClock>,
    opener: Arc<RecordingOpener>,
}

fn harness() -> Harness {
    let http = Arc::new(ScriptedHttpClient::default());
    let clock = Arc::new(FakeClock(Mutex::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    )));
    let opener = Arc::new(RecordingOpener::default());

    let config = CoreConfig::builder()
        .auth(AuthConfig::new("client-123", REDIRECT_URI).unwrap())
        .http_client(http.clone())
        .secure_store(Arc::new(MemoryStore::default()))
        .url_opener(opener.clone())
        .clock(clock.clone())
        .id_generator(Arc::new(SequentialIds(Mutex::new(0))))
        .build()
        .unwrap();

    Harness {
        client: DriveClient::new(config),
        http,
        clock,
        opener,
    }
}

const TOKENS: &str =
    r#"{"access_token":"access-1","expires_in":3600,"refresh_token":"refresh-1","token_type":"Bearer"}"#;

const FILE: &str = r#"{"id":"file-1","name":"notes.txt","mimeType":"text/plain"}"#;

#[tokio::test]
async fn test_sign_in_then_use_drive() {
    let h = harness();
    let mut states = h.client.auth().is_signed_in_stream();
    assert_eq!(states.next().await, Some(false));

    h.client.auth().sign_in().await.unwrap();
    assert_eq!(h.opener.opened.lock().unwrap().len(), 1);

    h.http.reply(200, TOKENS);
    let handled = h
        .client
        .auth()
        .handle_redirect(&format!("{}?code=ABC123", REDIRECT_URI))
        .await
        .unwrap();
    assert!(handled);
    assert_eq!(states.next().await, Some(true));

    h.http
        .reply(200, &format!(r#"{{"files":[{}],"incompleteSearch":false}}"#, FILE));
    let page = h
        .client
        .drive()
        .list_files(ListFilesParams::default())
        .await
        .unwrap();
    assert_eq!(page.files[0].name, "notes.txt");

    let requests = h.http.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, HttpMethod::Get);
    assert_eq!(
        requests[1].headers.get("Authorization"),
        Some(&"Bearer access-1".to_string())
    );
}

#[tokio::test]
async fn test_expired_session_refreshes_once_before_upload() {
    let h = harness();
    h.http.reply(200, TOKENS);
    h.client
        .auth()
        .handle_redirect(&format!("{}?code=ABC123", REDIRECT_URI))
        .await
        .unwrap();

    h.clock.advance(Duration::seconds(3600));
    h.http
        .reply(200, r#"{"access_token":"access-2","expires_in":3600,"token_type":"Bearer"}"#);
    h.http.reply(200, FILE);

    let file = h
        .client
        .drive()
        .create_file(CreateFileParams {
            metadata: FileMetadata {
                name: "notes.txt".to_string(),
                mime_type: Some("text/plain".to_string()),
                ..Default::default()
            },
            data: Bytes::from_static(b"hello"),
        })
        .await
        .unwrap();
    assert_eq!(file.id, "file-1");

    let requests = h.http.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].url, "https://oauth2.googleapis.com/token");
    assert_eq!(
        requests[2].headers.get("Authorization"),
        Some(&"Bearer access-2".to_string())
    );
    assert_eq!(
        requests[2].headers.get("Content-Type"),
        Some(&"multipart/related; boundary=00000000-0000-0000-0000-000000000001".to_string())
    );

    let stored = h.client.auth().credentials().await.unwrap().unwrap();
    assert_eq!(stored.refresh_token(), "refresh-1");
}

#[tokio::test]
async fn test_sign_out_blocks_drive_calls() {
    let h = harness();
    h.http.reply(200, TOKENS);
    h.client
        .auth()
        .handle_redirect(&format!("{}?code=ABC123", REDIRECT_URI))
        .await
        .unwrap();

    h.client.auth().sign_out().await.unwrap();

    let result = h
        .client
        .drive()
        .delete_file(DeleteFileParams::new("file-1"))
        .await;
    assert!(matches!(result, Err(GoogleDriveError::NotAuthorized)));
    assert_eq!(h.http.requests().len(), 1);
}

#[tokio::test]
async fn test_api_rejection_keeps_session() {
    let h = harness();
    h.http.reply(200, TOKENS);
    h.client
        .auth()
        .handle_redirect(&format!("{}?code=ABC123", REDIRECT_URI))
        .await
        .unwrap();

    h.http.reply(403, r#"{"error":{"code":403}}"#);
    let result = h.client.drive().get_file_data("file-1").await;

    assert_eq!(result.unwrap_err().status_code(), Some(403));
    assert!(h.client.auth().is_signed_in().await.unwrap());
}
