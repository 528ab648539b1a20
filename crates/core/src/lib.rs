//! Cartkeep Core - Shared cart types and pure cart logic.
//!
//! This crate provides the types used across all Cartkeep components:
//! - `cartkeep` - Cart store, persistence backends and provider scope
//! - `cli` - Command-line front end over a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types and in-memory logic - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and line items
//! - [`cart`] - The ordered, id-unique cart and its add/increment/decrement rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, SnapshotError};
pub use types::*;
