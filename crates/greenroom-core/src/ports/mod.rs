//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IBookingRepository`] - Persistent storage for bookings, resources,
//!   and conflict logs

pub mod booking_repository;

pub use booking_repository::{
    BookingInsertOutcome, ConflictLogFilter, ConflictRecord, IBookingRepository,
};
