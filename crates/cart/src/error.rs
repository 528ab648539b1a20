//! Errors surfaced to cart consumers.
//!
//! Persistence failures never show up here: the store logs and swallows
//! them. Only misuse of the provider boundary is reported to callers.

use thiserror::Error;

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was requested outside of any mounted provider scope.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
