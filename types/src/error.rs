//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid digest: expected 64 hex characters, got {0:?}")]
    InvalidDigest(String),

    #[error("address must not be empty")]
    EmptyAddress,
}
