//! Integration tests for the Mid Shop client.
//!
//! Every test runs the real client stack (boundary, vault, stores) against a
//! `wiremock` server standing in for the REST API, mounted under `/api`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mid-shop-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mid_shop_client::storage::keys;
use mid_shop_client::{
    ApiClient, CartStore, ClientConfig, FavoritesStore, MemoryStorage, Navigator, SessionStore,
    SessionVault, Storage,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path prefix of every API endpoint on the mock server.
pub const API_PREFIX: &str = "/api";

/// Navigator that remembers every requested path.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_owned());
    }
}

/// A mock API plus a fully wired client.
pub struct TestContext {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub api: ApiClient,
    pub session: SessionStore,
    pub cart: CartStore,
    pub favorites: FavoritesStore,
}

impl TestContext {
    /// Nobody signed in.
    pub async fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new())).await
    }

    /// A session for `jane` with token `t1` restored from storage.
    pub async fn signed_in() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "t1").unwrap();
        storage
            .set(keys::USER, r#"{"username":"jane","email":"j@x.com"}"#)
            .unwrap();
        Self::with_storage(storage).await
    }

    /// Catalog caching disabled so every call reaches the mock.
    pub async fn with_storage(storage: Arc<MemoryStorage>) -> Self {
        Self::build(storage, Duration::ZERO).await
    }

    pub async fn with_catalog_cache() -> Self {
        Self::build(Arc::new(MemoryStorage::new()), Duration::from_secs(60)).await
    }

    async fn build(storage: Arc<MemoryStorage>, cache_ttl: Duration) -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig::new(&format!("{}{API_PREFIX}", server.uri()))
            .unwrap()
            .with_catalog_cache_ttl(cache_ttl);

        let navigator = Arc::new(RecordingNavigator::default());
        let vault = Arc::new(SessionVault::open(storage.clone()));
        let api = ApiClient::new(&config, vault, navigator.clone());

        Self {
            server,
            storage,
            navigator,
            session: SessionStore::new(api.clone()),
            cart: CartStore::new(api.clone()),
            favorites: FavoritesStore::new(api.clone()),
            api,
        }
    }

    /// Make `POST /auth/login` accept `username`/`password` and hand out `token`.
    pub async fn mount_login(&self, username: &str, password: &str, token: &str) {
        Mock::given(method("POST"))
            .and(path(api_path("/auth/login")))
            .and(body_json(json!({ "username": username, "password": password })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "token": token,
                "username": username,
                "email": "j@x.com"
            }))))
            .mount(&self.server)
            .await;
    }

    /// Answer `method path` with 401 and the backend's error envelope.
    pub async fn mount_unauthorized(&self, http_method: &str, endpoint: &str) {
        Mock::given(method(http_method))
            .and(path(api_path(endpoint)))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "message": "Invalid or expired token"
            })))
            .mount(&self.server)
            .await;
    }

    pub fn persisted_token(&self) -> Option<String> {
        self.storage.get(keys::TOKEN).unwrap()
    }

    pub fn persisted_user(&self) -> Option<Value> {
        self.storage
            .get(keys::USER)
            .unwrap()
            .map(|user| serde_json::from_str(&user).unwrap())
    }

    /// Requests the mock server has seen, oldest first.
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap()
    }
}

/// `endpoint` under [`API_PREFIX`].
#[must_use]
pub fn api_path(endpoint: &str) -> String {
    format!("{API_PREFIX}{endpoint}")
}

/// Wrap `data` in a success envelope.
#[must_use]
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// The cart the API returns after adding two mugs.
#[must_use]
pub fn mug_cart() -> Value {
    json!({
        "id": 1,
        "items": [{
            "id": 1,
            "productId": 5,
            "quantity": 2,
            "productTitle": "Mug",
            "productPrice": 9.99,
            "productThumbnail": "x.png",
            "subtotal": 19.98
        }],
        "total": 19.98,
        "totalItems": 2
    })
}

/// The mug product as the catalog returns it.
#[must_use]
pub fn mug() -> Value {
    json!({
        "id": 5,
        "title": "Mug",
        "price": 9.99,
        "thumbnail": "x.png",
        "category": "kitchen-accessories"
    })
}
