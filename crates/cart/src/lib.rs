//! Cartkeep cart store library.
//!
//! Keeps a shopping cart in memory, mirrors every change to a key-value
//! storage backend, and hands one shared store to callers through a scoped
//! provider.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart behind an async mutex; mutations are
//!   applied in order and their snapshots are written by a single background
//!   task, so the persisted cart always matches the last mutation
//! - [`storage::CartStorage`] is the persistence seam, with in-memory and
//!   file-backed implementations
//! - [`provider::CartProvider`] mounts a store and exposes it to a subtree of
//!   async code via [`provider::use_cart`]
//! - [`api::ApiClient`] is the base-URL catalog client used by front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cartkeep::{CartConfig, CartProvider, storage::FileStorage, use_cart};
//!
//! let config = CartConfig::from_env()?;
//! let storage = Arc::new(FileStorage::new(&config.storage.dir));
//! let provider = CartProvider::mount(storage, &config.storage).await;
//!
//! provider.scope(async {
//!     let cart = use_cart()?;
//!     cart.add_to_cart(product).await;
//!     Ok::<_, cartkeep::CartError>(())
//! }).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod provider;
pub mod storage;
pub mod store;

pub use cartkeep_core::{Cart, LineItem, NewLineItem, Price, ProductId};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use provider::{CartProvider, use_cart};
pub use store::CartStore;
