//! # Error Types
//!
//! Errors raised while constructing values. Checking never produces these;
//! see `ezt-check` for configuration and conformance errors.

use thiserror::Error;

/// Error constructing a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The input is not an RFC 3339 date/time.
    #[error("invalid date {input:?}: {reason}")]
    InvalidDate {
        /// The text that failed to parse.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
}
