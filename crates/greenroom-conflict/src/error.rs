//! Error types for the conflict engine

use thiserror::Error;

use greenroom_core::domain::{ConflictLogId, DomainError};

use crate::detector::BookingConflict;

/// Errors that can occur during conflict detection and log operations
///
/// A `Storage` error means the conflict status is unknown: callers must
/// never treat it as "no conflict".
#[derive(Debug, Error)]
pub enum DetectorError {
    /// A store read or write failed
    #[error("database error: {0}")]
    Storage(#[from] anyhow::Error),

    /// No conflict log exists with the given ID
    #[error("conflict log not found: {0}")]
    LogNotFound(ConflictLogId),

    /// A domain rule rejected the operation (e.g. resolving twice)
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Errors returned by the create-booking workflow
#[derive(Debug, Error)]
pub enum CreateBookingError {
    /// The requested window is empty or inverted; the detector was not
    /// consulted
    #[error("invalid booking window: start {start} is not before end {end}")]
    InvalidWindow {
        /// Requested start (RFC 3339)
        start: String,
        /// Requested end (RFC 3339)
        end: String,
    },

    /// Conflict findings blocked the booking; callers map this to 409
    #[error("booking rejected: {} conflict(s) detected", .0.len())]
    Rejected(Vec<BookingConflict>),

    /// The guarded insert failed at the store level
    #[error("database error: {0}")]
    Storage(anyhow::Error),

    /// The detection pass itself failed
    #[error(transparent)]
    Detector(#[from] DetectorError),
}
