//! Observable client-side state built on top of [`ApiClient`](crate::api::ApiClient).
//!
//! Each store owns one piece of state behind a `tokio::sync::watch` channel so
//! views can both read the current value and wait for the next one.

mod cart;
mod favorites;
mod session;

pub use cart::{CartState, CartStore};
pub use favorites::FavoritesStore;
pub use session::SessionStore;
