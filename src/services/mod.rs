// src/services/mod.rs

pub mod texts;
pub mod tree;

use crate::store::StoreError;

pub use texts::TextService;

/// Failures of the text operations, before they are mapped to HTTP.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Parent text {0} not found")]
    InvalidParent(i64),

    #[error("Text {0} not found")]
    NotFound(i64),

    /// The requested page is past the last stored row.
    #[error("End of texts")]
    EndOfResults,

    #[error(transparent)]
    Storage(#[from] StoreError),
}
