//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{CartId, LineId, StationId};

/// The base error type for `cl-core` and a common variant for sub-crates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("station {0} not found")]
    StationNotFound(StationId),

    #[error("line {0} not found")]
    LineNotFound(LineId),

    #[error("cart {0} not found")]
    CartNotFound(CartId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `cl-core`.
pub type CoreResult<T> = Result<T, CoreError>;
