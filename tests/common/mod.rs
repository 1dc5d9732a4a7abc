//! Shared fixtures for router tests: in-memory doubles of the store and the
//! face detector, plus request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{SubsecRound, Utc};
use serde_json::Value;
use smart_brain::api::FaceDetector;
use smart_brain::db::{Account, AccountStore, NewAccount};
use smart_brain::error::BrainError;
use smart_brain::service::{CredentialHasher, ErrorLog};
use smart_brain::{BrainState, Config, brain_router};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct Tables {
    // (email, hash)
    login: Vec<(String, String)>,
    users: Vec<Account>,
}

/// `AccountStore` over two in-memory tables with the same pairing and
/// uniqueness rules as the Postgres schema.
pub struct MemoryAccountStore {
    tables: Mutex<Tables>,
    hasher: CredentialHasher,
}

impl MemoryAccountStore {
    pub fn new(hasher: CredentialHasher) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            hasher,
        }
    }

    pub fn credential_count(&self, email: &str) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.login.iter().filter(|(e, _)| e == email).count()
    }

    pub fn account_count(&self, email: &str) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.users.iter().filter(|a| a.email == email).count()
    }

    pub fn stored_hash(&self, email: &str) -> Option<String> {
        let tables = self.tables.lock().unwrap();
        tables
            .login
            .iter()
            .find(|(e, _)| e == email)
            .map(|(_, h)| h.clone())
    }

    /// Remove an account but keep its credential, to simulate inconsistent data.
    pub fn drop_account(&self, email: &str) {
        let mut tables = self.tables.lock().unwrap();
        tables.users.retain(|a| a.email != email);
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn count_accounts(&self) -> Result<i64, BrainError> {
        Ok(self.tables.lock().unwrap().users.len() as i64)
    }

    async fn register_account(&self, new: NewAccount) -> Result<Account, BrainError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.login.iter().any(|(e, _)| *e == new.email) {
            return Err(BrainError::DuplicateEmail);
        }
        let account = Account {
            id: tables.users.len() as i32 + 1,
            email: new.email.clone(),
            name: new.name,
            joined: Utc::now().trunc_subsecs(6),
            entries: 0,
        };
        tables.login.push((new.email, new.hash));
        tables.users.push(account.clone());
        Ok(account)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, BrainError> {
        let hash = self.stored_hash(email).ok_or(BrainError::NotFound)?;
        if !self.hasher.verify(password, &hash).await {
            return Err(BrainError::InvalidCredentials);
        }
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|a| a.email == email)
            .cloned()
            .ok_or(BrainError::NotFound)
    }

    async fn increment_entries(&self, id: i32, delta: i64) -> Result<Account, BrainError> {
        let mut tables = self.tables.lock().unwrap();
        let account = tables
            .users
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(BrainError::NotFound)?;
        account.entries += delta;
        Ok(account.clone())
    }
}

/// A store whose backend is always down.
pub struct UnavailableStore;

#[async_trait]
impl AccountStore for UnavailableStore {
    async fn count_accounts(&self) -> Result<i64, BrainError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn register_account(&self, _new: NewAccount) -> Result<Account, BrainError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn authenticate(&self, _email: &str, _password: &str) -> Result<Account, BrainError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn increment_entries(&self, _id: i32, _delta: i64) -> Result<Account, BrainError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

/// A store whose backend accepts calls and never answers.
pub struct HangingStore;

#[async_trait]
impl AccountStore for HangingStore {
    async fn count_accounts(&self) -> Result<i64, BrainError> {
        std::future::pending().await
    }

    async fn register_account(&self, _new: NewAccount) -> Result<Account, BrainError> {
        std::future::pending().await
    }

    async fn authenticate(&self, _email: &str, _password: &str) -> Result<Account, BrainError> {
        std::future::pending().await
    }

    async fn increment_entries(&self, _id: i32, _delta: i64) -> Result<Account, BrainError> {
        std::future::pending().await
    }
}

/// Face detector that never answers.
pub struct HangingDetector;

#[async_trait]
impl FaceDetector for HangingDetector {
    async fn detect_faces(&self, _image_url: &str) -> Result<Value, BrainError> {
        std::future::pending().await
    }
}

/// Face detector that answers with a fixed payload, or fails.
pub struct StubDetector {
    pub response: Option<Value>,
    pub seen: Mutex<Vec<String>>,
}

impl StubDetector {
    pub fn answering(response: Value) -> Self {
        Self {
            response: Some(response),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FaceDetector for StubDetector {
    async fn detect_faces(&self, image_url: &str) -> Result<Value, BrainError> {
        self.seen.lock().unwrap().push(image_url.to_string());
        self.response
            .clone()
            .ok_or(BrainError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE))
    }
}

pub fn app_with(
    store: Arc<dyn AccountStore>,
    detector: Arc<dyn FaceDetector>,
    error_log: ErrorLog,
) -> Router {
    let state = BrainState::new(store, detector, CredentialHasher::new(), error_log);
    brain_router(state, Duration::from_secs(30))
}

/// Router wired with the timeouts `cfg` derives, as `main` does.
pub fn app_with_config(
    store: Arc<dyn AccountStore>,
    detector: Arc<dyn FaceDetector>,
    error_log: ErrorLog,
    cfg: &Config,
) -> Router {
    let state = BrainState::new(store, detector, CredentialHasher::new(), error_log)
        .with_backend_timeout(cfg.backend_timeout());
    brain_router(state, cfg.request_timeout())
}

/// `Config` with a one second request budget.
pub fn short_timeouts() -> Config {
    Config {
        request_timeout_secs: 1,
        ..Config::default()
    }
}

pub fn memory_app() -> (Router, Arc<MemoryAccountStore>) {
    let store = Arc::new(MemoryAccountStore::new(CredentialHasher::new()));
    let app = app_with(
        store.clone(),
        Arc::new(StubDetector::failing()),
        ErrorLog::disabled(),
    );
    (app, store)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let resp = app.clone().oneshot(request).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let text = String::from_utf8(bytes.to_vec()).expect("response body was not utf-8");
    (status, text)
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, Some(body)).await;
    let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status, value)
}

pub fn temp_path(tag: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "smart-brain-{tag}-{}-{}.log",
        std::process::id(),
        nanos
    ));
    path
}
