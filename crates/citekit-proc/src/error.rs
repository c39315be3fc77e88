//! Error types for the rendering core.
//!
//! A missing variable is never an error: it yields empty output and feeds
//! the group suppression rule. The kinds below are real failures that abort
//! the whole top-level call; no partial bibliography is ever emitted.

use thiserror::Error;

/// Result type alias for citekit-proc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during rendering.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The invariant locale is missing from the registry.
    #[error("locale '{locale}' cannot be resolved and no invariant locale is registered")]
    LocaleNotFound { locale: String },

    /// A variable held a value of a type the element cannot render.
    #[error("variable '{variable}' is not {expected}")]
    UnsupportedValueType {
        variable: String,
        expected: &'static str,
    },

    /// A number or date-part format the locale cannot satisfy.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },

    /// The macro graph contains a cycle.
    #[error("macro '{name}' is part of a cycle")]
    CycleDetected { name: String },
}
