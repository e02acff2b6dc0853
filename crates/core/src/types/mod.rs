//! Core types for Mid Shop.
//!
//! This module provides type-safe wrappers for the API's domain concepts.

pub mod cart;
pub mod envelope;
pub mod id;
pub mod money;
pub mod product;
pub mod user;

pub use cart::{AddItem, Cart, CartItem, UpdateQuantity};
pub use envelope::ApiResponse;
pub use id::*;
pub use money::Money;
pub use product::{
    Category, Product, ProductPage, ProductQuery, ProductSort, SortField, SortOrder, SortParseError,
};
pub use user::{AuthPayload, Credentials, Identity, Registration, UserProfile};
