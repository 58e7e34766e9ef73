//! Greenroom Conflict - Booking conflict detection
//!
//! Provides:
//! - Double-booking, availability, and capacity checks over a booking store
//! - Conflict-log lifecycle: record, list/filter, resolve, aggregate stats
//! - The create-booking workflow that pairs the detector's fast-path check
//!   with the store's atomic insert guard

pub mod detector;
pub mod error;
pub mod ledger;
pub mod use_cases;

pub use detector::{BookingConflict, ConflictDetector};
pub use error::{CreateBookingError, DetectorError};
pub use ledger::ConflictStats;
pub use use_cases::CreateBookingUseCase;

#[cfg(test)]
pub(crate) mod testing;
