//! The signed-in user's favorite products.

use std::collections::BTreeSet;
use std::sync::Arc;

use mid_shop_core::{ProductId, UserProfile};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::api::ApiClient;
use crate::error::Result;

/// Set of favorite product ids.
///
/// The set is only ever replaced wholesale with the ids in a profile the
/// server returned, never edited locally.
#[derive(Clone)]
pub struct FavoritesStore {
    api: ApiClient,
    ids: Arc<watch::Sender<BTreeSet<ProductId>>>,
}

impl FavoritesStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (ids, _) = watch::channel(BTreeSet::new());
        Self {
            api,
            ids: Arc::new(ids),
        }
    }

    /// Favorite ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.ids.borrow().iter().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.ids.borrow().contains(&product_id)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BTreeSet<ProductId>> {
        self.ids.subscribe()
    }

    /// Reload the set from the user's profile. Empties it when nobody is
    /// signed in.
    ///
    /// # Errors
    ///
    /// Returns the API error; the set is left as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        if !self.api.vault().is_authenticated() {
            debug!("Not signed in, clearing favorites");
            self.ids.send_replace(BTreeSet::new());
            return Ok(());
        }

        let profile = self.api.me().await?;
        self.apply(profile);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error; the set is left as it was.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId) -> Result<()> {
        let profile = self.api.add_favorite(product_id).await?;
        self.apply(profile);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error; the set is left as it was.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<()> {
        let profile = self.api.remove_favorite(product_id).await?;
        self.apply(profile);
        Ok(())
    }

    /// Add the product if it is not a favorite, remove it otherwise.
    /// Returns whether it is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns the API error; the set is left as it was.
    pub async fn toggle(&self, product_id: ProductId) -> Result<bool> {
        if self.contains(product_id) {
            self.remove(product_id).await?;
        } else {
            self.add(product_id).await?;
        }
        Ok(self.contains(product_id))
    }

    /// Refresh on every sign-in and empty the set on sign-out.
    #[must_use = "dropping the handle detaches the sync task"]
    pub fn sync_with_session(&self) -> JoinHandle<()> {
        let store = self.clone();
        let mut identity = self.api.vault().subscribe();

        tokio::spawn(async move {
            loop {
                let signed_in = identity.borrow_and_update().is_some();
                if signed_in {
                    if let Err(e) = store.refresh().await {
                        warn!(error = %e, "Automatic favorites refresh failed");
                    }
                } else {
                    store.ids.send_replace(BTreeSet::new());
                }

                if identity.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    fn apply(&self, profile: UserProfile) {
        self.ids
            .send_replace(profile.favorite_product_ids.into_iter().collect());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::{MemoryStorage, Storage, keys};
    use crate::stores::test_support::api_for;

    fn profile(favorites: &[i64]) -> Value {
        json!({
            "success": true,
            "data": {
                "id": 1,
                "username": "jane",
                "email": "j@x.com",
                "favoriteProductIds": favorites
            }
        })
    }

    fn signed_in_storage() -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "t1").unwrap();
        storage
            .set(keys::USER, r#"{"username":"jane","email":"j@x.com"}"#)
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_refresh_replaces_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile(&[7, 3])))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let favorites = FavoritesStore::new(api);
        favorites.refresh().await.unwrap();

        assert_eq!(favorites.ids(), vec![ProductId::new(3), ProductId::new(7)]);
    }

    #[tokio::test]
    async fn test_toggle_uses_server_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/favorites/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile(&[5])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/users/favorites/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let favorites = FavoritesStore::new(api);

        assert!(favorites.toggle(ProductId::new(5)).await.unwrap());
        assert!(favorites.contains(ProductId::new(5)));
        assert!(!favorites.toggle(ProductId::new(5)).await.unwrap());
        assert!(favorites.ids().is_empty());
    }

    #[tokio::test]
    async fn test_failed_add_keeps_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile(&[1])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/users/favorites/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "message": "Product not found"
            })))
            .mount(&server)
            .await;

        let (api, _) = api_for(&server, signed_in_storage());
        let favorites = FavoritesStore::new(api);
        favorites.refresh().await.unwrap();

        let err = favorites.add(ProductId::new(9)).await.unwrap_err();
        assert_eq!(err.user_message(), "Product not found");
        assert_eq!(favorites.ids(), vec![ProductId::new(1)]);
    }

    #[tokio::test]
    async fn test_refresh_signed_out_empties_set() {
        let server = MockServer::start().await;
        let (api, _) = api_for(&server, Arc::new(MemoryStorage::new()));
        let favorites = FavoritesStore::new(api);

        favorites.refresh().await.unwrap();
        assert!(favorites.ids().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
