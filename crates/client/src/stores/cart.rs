//! The signed-in user's cart, mirrored from the server.
//!
//! Every mutation sends one request and replaces the local snapshot with the
//! cart the server answered with. There is no optimistic update and no
//! request sequencing: when calls overlap, whichever response arrives last
//! becomes the snapshot.

use std::sync::Arc;

use mid_shop_core::{AddItem, Cart, Product, ProductId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Snapshot published by [`CartStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub cart: Cart,
    /// True while [`CartStore::fetch_cart`] is waiting for the server.
    pub loading: bool,
}

/// Cart state plus the operations that change it.
#[derive(Clone)]
pub struct CartStore {
    api: ApiClient,
    state: Arc<watch::Sender<CartState>>,
}

impl CartStore {
    /// A store starting from the empty cart.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self {
            api,
            state: Arc::new(state),
        }
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.borrow().cart.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Watch the cart and the loading flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Reload the cart from the server.
    ///
    /// Does nothing when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns the API error; the previous snapshot is kept.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<()> {
        if !self.api.vault().is_authenticated() {
            debug!("Not signed in, skipping cart fetch");
            return Ok(());
        }

        self.state.send_modify(|state| state.loading = true);
        let result = self.api.get_cart().await;
        self.state.send_modify(|state| {
            state.loading = false;
            if let Ok(cart) = &result {
                state.cart = cart.clone();
            }
        });

        result.map(|_| ()).map_err(ClientError::from)
    }

    /// Add `quantity` of `product`. Title, price and thumbnail are captured
    /// from `product` as it is now.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a zero quantity, or the API
    /// error; the previous snapshot is kept.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: &Product, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(ClientError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let cart = self
            .api
            .add_cart_item(&AddItem::for_product(product, quantity))
            .await?;
        self.replace(cart);
        Ok(())
    }

    /// Set the quantity of a line. The value is sent as given; the server
    /// decides what zero or negative quantities mean.
    ///
    /// # Errors
    ///
    /// Returns the API error; the previous snapshot is kept.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: i64) -> Result<()> {
        let cart = self.api.update_cart_item(product_id, quantity).await?;
        self.replace(cart);
        Ok(())
    }

    /// Drop a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns the API error; the previous snapshot is kept.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<()> {
        let cart = self.api.remove_cart_item(product_id).await?;
        self.replace(cart);
        Ok(())
    }

    /// Empty the cart on the server, then locally.
    ///
    /// # Errors
    ///
    /// Returns the API error; the previous snapshot is kept.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        self.api.clear_cart().await?;
        self.replace(Cart::empty());
        Ok(())
    }

    /// Keep the cart in step with the session.
    ///
    /// The spawned task fetches the cart whenever a user is signed in
    /// (starting with a session restored at start-up) and resets to the
    /// empty cart whenever the session ends. Abort the handle to stop it.
    #[must_use = "dropping the handle detaches the sync task"]
    pub fn sync_with_session(&self) -> JoinHandle<()> {
        let store = self.clone();
        let mut identity = self.api.vault().subscribe();

        tokio::spawn(async move {
            loop {
                let signed_in = identity.borrow_and_update().is_some();
                if signed_in {
                    if let Err(e) = store.fetch_cart().await {
                        warn!(error = %e, "Automatic cart fetch failed");
                    }
                } else {
                    store.state.send_replace(CartState::default());
                }

                if identity.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    fn replace(&self, cart: Cart) {
        self.state.send_modify(|state| state.cart = cart);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::{MemoryStorage, Storage, keys};
    use crate::stores::test_support::api_for;

    fn signed_in_storage() -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "t1").unwrap();
        storage
            .set(keys::USER, r#"{"username":"jane","email":"j@x.com"}"#)
            .unwrap();
        storage
    }

    fn mug_cart() -> Value {
        json!({
            "id": 3,
            "items": [{
                "id": 11,
                "productId": 5,
                "quantity": 2,
                "productTitle": "Mug",
                "productPrice": 9.5,
                "productThumbnail": "m.png",
                "subtotal": 19.0
            }],
            "total": 19.0,
            "totalItems": 2
        })
    }

    fn mug() -> Product {
        serde_json::from_value(json!({
            "id": 5,
            "title": "Mug",
            "price": 9.5,
            "thumbnail": "m.png"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_cart_skips_when_signed_out() {
        let server = MockServer::start().await;
        let (api, _) = api_for(&server, Arc::new(MemoryStorage::new()));
        let store = CartStore::new(api);

        store.fetch_cart().await.unwrap();

        assert_eq!(store.cart(), Cart::empty());
        assert!(!store.is_loading());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_cart_replaces_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": mug_cart() })),
            )
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);
        store.fetch_cart().await.unwrap();

        let expected: Cart = serde_json::from_value(mug_cart()).unwrap();
        assert_eq!(store.cart(), expected);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_cart_is_loading_while_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": mug_cart() }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);
        let mut rx = store.subscribe();
        assert!(!store.is_loading());

        let fetch = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_cart().await }
        });

        let cart_while_loading =
            tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|state| state.loading))
                .await
                .unwrap()
                .unwrap()
                .cart
                .clone();
        assert_eq!(cart_while_loading, Cart::empty());

        fetch.await.unwrap().unwrap();

        let expected: Cart = serde_json::from_value(mug_cart()).unwrap();
        assert!(!store.is_loading());
        assert_eq!(store.cart(), expected);
    }

    #[tokio::test]
    async fn test_add_item_sends_captured_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .and(body_json(json!({
                "productId": 5,
                "quantity": 2,
                "productTitle": "Mug",
                "productPrice": 9.5,
                "productThumbnail": "m.png"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": mug_cart() })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);
        store.add_item(&mug(), 2).await.unwrap();

        assert_eq!(store.cart().total_items, 2);
    }

    #[tokio::test]
    async fn test_add_item_rejects_zero_quantity() {
        let server = MockServer::start().await;
        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);

        let err = store.add_item(&mug(), 0).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": mug_cart() })),
            )
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/cart/items/5"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "Not enough stock"
            })))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);
        store.fetch_cart().await.unwrap();

        let err = store
            .update_quantity(ProductId::new(5), 500)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Not enough stock");
        assert_eq!(store.cart().total_items, 2);
    }

    #[tokio::test]
    async fn test_clear_cart_resets_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": mug_cart() })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "message": "Cart cleared" })),
            )
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);
        store.fetch_cart().await.unwrap();
        store.clear_cart().await.unwrap();

        assert_eq!(store.cart(), Cart::empty());
    }

    #[tokio::test]
    async fn test_sync_fetches_restored_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": mug_cart() })),
            )
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let store = CartStore::new(api);
        let mut rx = store.subscribe();
        let sync = store.sync_with_session();

        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|state| state.cart.total_items == 2),
        )
        .await
        .unwrap()
        .unwrap();

        sync.abort();
    }
}
