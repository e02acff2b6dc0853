//! Cart snapshot and cart mutation request bodies.

use serde::{Deserialize, Serialize};

use super::id::{CartId, CartItemId, ProductId};
use super::money::Money;
use super::product::Product;

/// The server-computed cart for the current user.
///
/// Totals are whatever the server returned. Nothing in the client adds up
/// line subtotals, so a `Cart` is always a verbatim copy of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub total: Money,
    pub total_items: i64,
}

impl Cart {
    /// The canonical empty cart: `{id: 0, items: [], total: 0, totalItems: 0}`.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            id: CartId::new(0),
            items: Vec::new(),
            total: Money::ZERO,
            total_items: 0,
        }
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line item for `product_id`, if the product is in the cart.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }
}

/// A line of the cart.
///
/// Title, price and thumbnail were captured when the product was added and
/// do not follow later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub product_title: String,
    pub product_price: Money,
    #[serde(default)]
    pub product_thumbnail: String,
    pub subtotal: Money,
}

/// Body of `POST /cart/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub product_title: String,
    pub product_price: Money,
    pub product_thumbnail: String,
}

impl AddItem {
    /// Capture the display fields of `product` as they are right now.
    #[must_use]
    pub fn for_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            quantity,
            product_title: product.title.clone(),
            product_price: product.price,
            product_thumbnail: product.thumbnail.clone(),
        }
    }
}

/// Body of `PATCH /cart/items/{productId}`. The quantity is absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: i64,
}
