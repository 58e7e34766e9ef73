//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and invalid lifecycle transitions.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A time slot whose start is not strictly before its end
    #[error("Invalid time slot: start {start} is not before end {end}")]
    InvalidTimeSlot {
        /// Requested start of the slot (RFC 3339)
        start: String,
        /// Requested end of the slot (RFC 3339)
        end: String,
    },

    /// Invalid lifecycle transition attempt
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
