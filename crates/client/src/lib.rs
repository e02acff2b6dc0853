//! Mid Shop storefront client.
//!
//! Keeps a signed-in session and a server-side cart in sync with the Mid Shop
//! REST API:
//! - [`api`] - HTTP boundary: bearer token attach, envelope decoding, global
//!   teardown on 401, catalog cache
//! - [`stores`] - Session, cart and favorites state for views to read and watch
//! - [`vault`] - The persisted session shared by the boundary and the stores
//! - [`storage`] - File and in-memory persistence backends
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mid_shop_client::{ApiClient, CartStore, ClientConfig, FileStorage, LogNavigator, SessionStore, SessionVault};
//!
//! let config = ClientConfig::from_env()?;
//! let vault = Arc::new(SessionVault::open(Arc::new(FileStorage::new(config.session_file()))));
//! let api = ApiClient::new(&config, vault, Arc::new(LogNavigator));
//!
//! let session = SessionStore::new(api.clone());
//! let cart = CartStore::new(api);
//! let _sync = cart.sync_with_session();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod navigator;
pub mod storage;
pub mod stores;
pub mod vault;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use navigator::{LogNavigator, Navigator};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use stores::{CartState, CartStore, FavoritesStore, SessionStore};
pub use vault::SessionVault;
