//! End-to-end session lifecycle tests against in-memory host bridges.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::{Clock, SecureStore, UrlOpener};
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use core_auth::{AuthError, AuthManager, Credentials};
use core_runtime::config::AuthConfig;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

const REDIRECT_URI: &str = "com.example.app://";
const KEY: &str = "gdrive_client.credentials";

struct FakeClock(Mutex<DateTime<Utc>>);

impl FakeClock {
    fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

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
    writes: Mutex<usize>,
}

impl MemoryStore {
    fn record(&self) -> Option<Credentials> {
        self.entries
            .lock()
            .unwrap()
            .get(KEY)
            .map(|bytes| serde_json::from_slice(bytes).unwrap())
    }

    fn put(&self, credentials: &Credentials) {
        self.entries
            .lock()
            .unwrap()
            .insert(KEY.to_string(), serde_json::to_vec(credentials).unwrap());
    }

    fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        *self.writes.lock().unwrap() += 1;
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
        *self.writes.lock().unwrap() += 1;
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

/// Plays back queued responses in order and records every request.
#[derive(Default)]
struct ScriptedHttpClient {
    replies: Mutex<VecDeque<(u16, &'static str)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn reply(&self, status: u16, body: &'static str) {
        self.replies.lock().unwrap().push_back((status, body));
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
            .ok_or_else(|| BridgeError::OperationFailed("unexpected request".to_string()))?;
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        })
    }
}

/// Parks every request until released, then grants a renewed token.
#[derive(Default)]
struct GatedHttpClient {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl HttpClient for GatedHttpClient {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from_static(
                br#"{"access_token":"renewed","expires_in":3600,"token_type":"Bearer"}"#,
            ),
        })
    }
}

struct Harness {
    auth: AuthManager,
    clock: Arc<FakeClock>,
    store: Arc<MemoryStore>,
    http: Arc<ScriptedHttpClient>,
    opener: Arc<RecordingOpener>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn harness() -> Harness {
    let clock = FakeClock::at(start());
    let store = Arc::new(MemoryStore::default());
    let http = Arc::new(ScriptedHttpClient::default());
    let opener = Arc::new(RecordingOpener::default());
    let auth = AuthManager::new(
        AuthConfig::new("client-123", REDIRECT_URI).unwrap(),
        http.clone(),
        store.clone(),
        opener.clone(),
        clock.clone(),
    );
    Harness {
        auth,
        clock,
        store,
        http,
        opener,
    }
}

fn stored(expires_at: DateTime<Utc>) -> Credentials {
    Credentials::new(
        "stored-access".to_string(),
        expires_at,
        "stored-refresh".to_string(),
        "Bearer".to_string(),
    )
}

const GRANT: &str =
    r#"{"access_token":"t","expires_in":3600,"refresh_token":"r","token_type":"Bearer"}"#;

#[tokio::test]
async fn test_is_signed_in_tracks_store_presence() {
    let h = harness();
    assert!(!h.auth.is_signed_in().await.unwrap());

    h.store.put(&stored(start()));
    assert!(h.auth.is_signed_in().await.unwrap());

    h.store.entries.lock().unwrap().clear();
    assert!(!h.auth.is_signed_in().await.unwrap());
}

#[tokio::test]
async fn test_full_sign_in_flow() {
    let h = harness();
    h.http.reply(200, GRANT);

    h.auth.sign_in().await.unwrap();
    assert_eq!(h.opener.opened.lock().unwrap().len(), 1);

    assert!(h
        .auth
        .handle_redirect("com.example.app://?code=ABC123")
        .await
        .unwrap());

    let record = h.store.record().expect("credentials persisted");
    assert_eq!(record.access_token(), "t");
    assert_eq!(record.refresh_token(), "r");
    assert_eq!(record.token_type(), "Bearer");
    assert_eq!(record.expires_at(), start() + Duration::seconds(3600));
    assert!(h.auth.is_signed_in().await.unwrap());

    let requests = h.http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "https://www.googleapis.com/oauth2/v4/token");
}

#[tokio::test]
async fn test_foreign_redirect_has_no_side_effects() {
    let h = harness();

    for url in ["https://other.com/x", "https://other.com/x?code=ABC123"] {
        assert!(!h.auth.handle_redirect(url).await.unwrap());
    }

    assert!(h.http.requests().is_empty());
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn test_redirect_errors_leave_store_untouched() {
    let h = harness();

    let denied = h
        .auth
        .handle_redirect("com.example.app://?error=access_denied")
        .await;
    assert!(matches!(denied, Err(AuthError::CodeError(m)) if m == "access_denied"));

    let missing = h.auth.handle_redirect("com.example.app://?state=1").await;
    assert!(matches!(missing, Err(AuthError::CodeNotFoundInRedirectUrl)));

    h.http.reply(400, r#"{"error":"invalid_grant"}"#);
    let rejected = h.auth.handle_redirect("com.example.app://?code=used").await;
    assert!(matches!(
        rejected,
        Err(AuthError::Response { status_code: 400, .. })
    ));

    assert_eq!(h.store.writes(), 0);
    assert!(!h.auth.is_signed_in().await.unwrap());
}

#[tokio::test]
async fn test_valid_token_is_never_refreshed() {
    let h = harness();
    h.store.put(&stored(start() + Duration::minutes(30)));

    for _ in 0..10 {
        h.auth.refresh_token().await.unwrap();
    }
    h.clock.advance(Duration::minutes(29));
    h.auth.refresh_token().await.unwrap();

    assert!(h.http.requests().is_empty());
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_refresh_token_kept() {
    let h = harness();
    h.store.put(&stored(start() + Duration::minutes(30)));
    h.clock.advance(Duration::minutes(31));
    h.http.reply(
        200,
        r#"{"access_token":"renewed","expires_in":3599,"token_type":"Bearer"}"#,
    );

    h.auth.refresh_token().await.unwrap();

    let record = h.store.record().unwrap();
    assert_eq!(record.access_token(), "renewed");
    assert_eq!(record.refresh_token(), "stored-refresh");
    assert_eq!(
        record.expires_at(),
        start() + Duration::minutes(31) + Duration::seconds(3599)
    );

    let request = &h.http.requests()[0];
    assert_eq!(request.url, "https://oauth2.googleapis.com/token");
    let body = String::from_utf8(request.body.clone().unwrap().to_vec()).unwrap();
    assert!(body.contains("grant_type=refresh_token"));
    assert!(body.contains("refresh_token=stored-refresh"));
}

#[tokio::test]
async fn test_rejected_refresh_signs_out_with_one_transition() {
    let h = harness();
    h.store.put(&stored(start()));
    assert!(h.auth.is_signed_in().await.unwrap());

    let mut stream = h.auth.is_signed_in_stream();
    assert_eq!(stream.next().await, Some(true));
    // Let the subscriber's scheduled re-read settle first.
    tokio::task::yield_now().await;

    h.http.reply(401, r#"{"error":"invalid_grant"}"#);
    let result = h.auth.refresh_token().await;

    match result {
        Err(AuthError::Response { status_code, body }) => {
            assert_eq!(status_code, 401);
            assert_eq!(body.as_ref(), br#"{"error":"invalid_grant"}"#);
        }
        other => panic!("expected Response error, got {:?}", other),
    }
    assert!(h.store.record().is_none());

    assert_eq!(stream.next().await, Some(false));
    tokio::task::yield_now().await;
    assert!(stream.try_next().is_err(), "exactly one transition");
}

#[tokio::test]
async fn test_transport_failure_during_refresh_keeps_session() {
    let h = harness();
    h.store.put(&stored(start()));

    // No scripted reply: the client fails at the transport level.
    let result = h.auth.refresh_token().await;

    assert!(matches!(result, Err(AuthError::Network(_))));
    assert!(h.store.record().is_some());
}

#[tokio::test]
async fn test_subscribers_see_same_transitions_in_order() {
    let h = harness();
    let mut first = h.auth.is_signed_in_stream();
    let mut second = h.auth.is_signed_in_stream();

    h.http.reply(200, GRANT);
    h.auth
        .handle_redirect("com.example.app://?code=ABC123")
        .await
        .unwrap();
    h.auth.sign_out().await.unwrap();

    let first: Vec<bool> = (&mut first).take(3).collect().await;
    let second: Vec<bool> = (&mut second).take(3).collect().await;
    assert_eq!(first, vec![false, true, false]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_late_subscriber_gets_current_value_first() {
    let h = harness();
    h.http.reply(200, GRANT);
    h.auth
        .handle_redirect("com.example.app://?code=ABC123")
        .await
        .unwrap();

    let mut late = h.auth.is_signed_in_stream();
    assert_eq!(late.next().await, Some(true));
}

#[tokio::test]
async fn test_sign_out_always_wins() {
    let h = harness();
    h.store.put(&stored(start() + Duration::hours(1)));
    assert!(h.auth.is_signed_in().await.unwrap());

    h.auth.sign_out().await.unwrap();
    assert!(!h.auth.is_signed_in().await.unwrap());

    h.auth.sign_out().await.unwrap();
    assert!(!h.auth.is_signed_in().await.unwrap());
}

#[tokio::test]
async fn test_concurrent_refresh_hits_network_once() {
    let h = harness();
    h.store.put(&stored(start()));
    h.http.reply(
        200,
        r#"{"access_token":"renewed","expires_in":3600,"token_type":"Bearer"}"#,
    );

    let a = h.auth.clone();
    let b = h.auth.clone();
    let (ra, rb) = tokio::join!(a.refresh_token(), b.refresh_token());
    ra.unwrap();
    rb.unwrap();

    // The second caller sees the renewed, unexpired token.
    assert_eq!(h.http.requests().len(), 1);
    assert_eq!(h.store.record().unwrap().access_token(), "renewed");
}

#[tokio::test]
async fn test_corrupted_record_reads_as_signed_out() {
    let h = harness();
    h.store
        .entries
        .lock()
        .unwrap()
        .insert(KEY.to_string(), b"garbage".to_vec());

    assert!(!h.auth.is_signed_in().await.unwrap());
    assert!(h.store.entries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_refresh_lifetime_keeps_session() {
    let h = harness();
    h.store.put(&stored(start()));
    h.http.reply(
        200,
        r#"{"access_token":"renewed","expires_in":9223372036854775807,"token_type":"Bearer"}"#,
    );

    let result = h.auth.refresh_token().await;

    assert!(matches!(result, Err(AuthError::Serialization(_))));
    assert_eq!(h.store.record().unwrap().access_token(), "stored-access");
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn test_sign_out_waits_for_in_flight_refresh() {
    let store = Arc::new(MemoryStore::default());
    let http = Arc::new(GatedHttpClient::default());
    let auth = AuthManager::new(
        AuthConfig::new("client-123", REDIRECT_URI).unwrap(),
        http.clone(),
        store.clone(),
        Arc::new(RecordingOpener::default()),
        FakeClock::at(start()),
    );
    store.put(&stored(start()));

    let refresh = tokio::spawn({
        let auth = auth.clone();
        async move { auth.refresh_token().await }
    });
    http.entered.notified().await;

    let sign_out = tokio::spawn({
        let auth = auth.clone();
        async move { auth.sign_out().await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!sign_out.is_finished(), "sign_out ran during the refresh");
    assert_eq!(store.record().unwrap().access_token(), "stored-access");

    http.release.notify_one();
    refresh.await.unwrap().unwrap();
    sign_out.await.unwrap().unwrap();

    // Refresh persisted first, then sign-out deleted it.
    assert_eq!(store.writes(), 2);
    assert!(store.record().is_none());
    assert!(!auth.is_signed_in().await.unwrap());
}
