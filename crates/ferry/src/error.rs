// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for boundary marshaling.
//!
//! Every variant is unrecoverable for the value/call in progress: a
//! marshaling failure means the two sides disagree structurally, not that a
//! transient fault occurred. Callers must surface these, never default or
//! retry.

use crate::handle::{HandleId, Side};
use std::fmt;

/// Errors returned by ferry marshaling operations.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Registration errors
    // ========================================================================
    /// Type already registered under a different shape.
    RegistrationConflict(String),
    /// Marshal attempted for a type that was never registered.
    UnregisteredType(String),
    /// Descriptor rejected at registration (duplicate tags, duplicate
    /// fields, empty enumerations).
    InvalidDescriptor { type_name: String, reason: String },

    // ========================================================================
    // Codec errors
    // ========================================================================
    /// Decoded tag does not resolve to any registered variant.
    UnknownDiscriminant { type_name: String, tag: i64 },
    /// Variant payload disagrees with the shape declared for its tag.
    PayloadShapeMismatch { type_name: String, detail: String },
    /// Collection length header disagrees with the transmitted element data.
    LengthMismatch { expected: usize, got: usize },
    /// Value does not match the descriptor it is being encoded against.
    TypeMismatch { expected: String, found: String },
    /// Wire data ended before the declared contents.
    BufferTooSmall { need: usize, have: usize },
    /// Malformed payload data (invalid UTF-8, bound overflow, ...).
    InvalidData(String),

    // ========================================================================
    // Handle lifecycle errors
    // ========================================================================
    /// Handle resolved or released after release, or the id is stale
    /// (its slot was reused under a newer generation).
    UseAfterRelease(HandleId),
    /// Release attempted by a side that does not own the handle.
    OwnershipViolation {
        handle: HandleId,
        owner: Side,
        caller: Side,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistrationConflict(name) => {
                write!(f, "type '{}' already registered with a different shape", name)
            }
            Self::UnregisteredType(name) => {
                write!(f, "type '{}' is not registered", name)
            }
            Self::InvalidDescriptor { type_name, reason } => {
                write!(f, "invalid descriptor for '{}': {}", type_name, reason)
            }
            Self::UnknownDiscriminant { type_name, tag } => {
                write!(f, "unknown discriminant {} for type '{}'", tag, type_name)
            }
            Self::PayloadShapeMismatch { type_name, detail } => {
                write!(f, "payload shape mismatch for '{}': {}", type_name, detail)
            }
            Self::LengthMismatch { expected, got } => {
                write!(
                    f,
                    "collection length mismatch: header declared {}, transmitted {}",
                    expected, got
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::BufferTooSmall { need, have } => {
                write!(f, "buffer too small: need {} bytes, have {}", need, have)
            }
            Self::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Self::UseAfterRelease(id) => {
                write!(f, "handle {} used after release", id)
            }
            Self::OwnershipViolation {
                handle,
                owner,
                caller,
            } => {
                write!(
                    f,
                    "handle {} owned by {} side, release attempted by {} side",
                    handle, owner, caller
                )
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::InvalidData(format!("invalid UTF-8 in string payload: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_offending_tag() {
        let err = Error::UnknownDiscriminant {
            type_name: "Suit".into(),
            tag: 77,
        };
        let msg = err.to_string();
        assert!(msg.contains("77"));
        assert!(msg.contains("Suit"));
    }

    #[test]
    fn test_display_length_mismatch() {
        let err = Error::LengthMismatch {
            expected: 10,
            got: 3,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("3"));
    }
}
