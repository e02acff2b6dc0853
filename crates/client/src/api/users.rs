//! Profile and favorites endpoints.

use mid_shop_core::{ProductId, UserProfile};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Profile of the signed-in user, including favorite product ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("users/me")?;
        self.execute_required(self.request(Method::GET, url), "profile")
            .await
    }

    /// Mark a product as favorite. Returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_favorite(&self, product_id: ProductId) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&format!("users/favorites/{product_id}"))?;
        self.execute_required(self.request(Method::POST, url), "profile")
            .await
    }

    /// Unmark a favorite product. Returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_favorite(&self, product_id: ProductId) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&format!("users/favorites/{product_id}"))?;
        self.execute_required(self.request(Method::DELETE, url), "profile")
            .await
    }
}
