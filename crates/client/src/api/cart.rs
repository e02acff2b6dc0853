//! Cart endpoints (not cached - mutable state).

use mid_shop_core::{AddItem, Cart, ProductId, UpdateQuantity};
use reqwest::Method;
use serde::de::IgnoredAny;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Current user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        let url = self.endpoint("cart")?;
        self.execute_required(self.request(Method::GET, url), "cart")
            .await
    }

    /// Add a line (or more of an existing line). Returns the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the item.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_cart_item(&self, item: &AddItem) -> Result<Cart, ApiError> {
        let url = self.endpoint("cart/items")?;
        self.execute_required(self.request(Method::POST, url).json(item), "cart")
            .await
    }

    /// Set the absolute quantity of a line. Returns the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the quantity.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Cart, ApiError> {
        let url = self.endpoint(&format!("cart/items/{product_id}"))?;
        self.execute_required(
            self.request(Method::PATCH, url)
                .json(&UpdateQuantity { quantity }),
            "cart",
        )
        .await
    }

    /// Remove a line entirely. Returns the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_cart_item(&self, product_id: ProductId) -> Result<Cart, ApiError> {
        let url = self.endpoint(&format!("cart/items/{product_id}"))?;
        self.execute_required(self.request(Method::DELETE, url), "cart")
            .await
    }

    /// Empty the cart. The response carries no cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let url = self.endpoint("cart")?;
        self.execute::<IgnoredAny>(self.request(Method::DELETE, url))
            .await
            .map(|_| ())
    }
}
