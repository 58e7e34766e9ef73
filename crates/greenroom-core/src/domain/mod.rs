//! Domain entities and business logic
//!
//! This module contains the core domain types for Greenroom:
//! - Newtypes for type-safe identifiers
//! - Booking entities and the half-open time-slot overlap rules
//! - Resource entities with availability gating
//! - Conflict log entities with their triage lifecycle
//! - Domain-specific error types

pub mod booking;
pub mod conflict_log;
pub mod errors;
pub mod newtypes;
pub mod resource;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, TimeSlot};
pub use conflict_log::{
    ConflictData, ConflictLog, ConflictSeverity, ConflictStatus, ConflictType, UnavailableReason,
};
pub use errors::DomainError;
pub use newtypes::*;
pub use resource::{Resource, ResourceRef};
