//! Mid Shop Core - Shared wire types.
//!
//! This crate provides the types exchanged with the Mid Shop REST API and
//! shared by every other crate in the workspace:
//! - `client` - Session, cart and favorites stores plus the HTTP boundary
//! - `cli` - Terminal front end driving the stores
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. Field names follow the API's camelCase JSON.
//!
//! # Modules
//!
//! - [`types`] - IDs, money, products, carts, users and the response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
