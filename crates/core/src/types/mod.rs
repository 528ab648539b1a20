//! Core types for Cartkeep.
//!
//! This module provides type-safe wrappers for common cart concepts.

pub mod id;
pub mod line_item;
pub mod price;

pub use id::*;
pub use line_item::{LineItem, NewLineItem};
pub use price::Price;
