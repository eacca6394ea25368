//! In-memory bridges shared by the unit tests.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{Clock, HttpClient, IdGenerator, SecureStore, UrlOpener};
use chrono::{DateTime, TimeZone, Utc};
use core_auth::{AuthManager, CredentialStore, Credentials};
use core_runtime::config::{AuthConfig, DEFAULT_CREDENTIAL_KEY};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Unix time the fake clock is frozen at.
pub const NOW: i64 = 1_700_000_000;

#[derive(Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.secrets
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.secrets.lock().unwrap().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.secrets.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct NoopOpener;

#[async_trait]
impl UrlOpener for NoopOpener {
    async fn open_url(&self, _url: &str) -> BridgeResult<()> {
        Ok(())
    }
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        at(NOW)
    }
}

pub struct FixedIdGenerator;

impl FixedIdGenerator {
    pub const BOUNDARY: &'static str = "00000000-0000-0000-0000-000000000001";
}

impl IdGenerator for FixedIdGenerator {
    fn new_id(&self) -> Uuid {
        Uuid::from_u128(1)
    }
}

pub fn at(unix: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(unix, 0).unwrap()
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::new("client-id.apps.googleusercontent.com", "com.example.app://").unwrap()
}

pub fn stored_credentials(expires_at: i64) -> Credentials {
    Credentials::new(
        "access-token".to_string(),
        at(expires_at),
        "refresh-token".to_string(),
        "Bearer".to_string(),
    )
}

pub fn signed_out_auth(http: Arc<dyn HttpClient>) -> AuthManager {
    auth_with_store(http, Arc::new(MemoryStore::default()))
}

pub async fn signed_in_auth(http: Arc<dyn HttpClient>, credentials: Credentials) -> AuthManager {
    let store = Arc::new(MemoryStore::default());
    CredentialStore::new(store.clone(), DEFAULT_CREDENTIAL_KEY)
        .save(&credentials)
        .await
        .unwrap();
    auth_with_store(http, store)
}

fn auth_with_store(http: Arc<dyn HttpClient>, store: Arc<MemoryStore>) -> AuthManager {
    AuthManager::new(
        auth_config(),
        http,
        store,
        Arc::new(NoopOpener),
        Arc::new(FixedClock),
    )
}
