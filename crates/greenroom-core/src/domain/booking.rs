//! Booking domain entities
//!
//! This module defines the `Booking` entity and the `TimeSlot` value
//! object. A booking reserves one resource for a half-open time interval;
//! the overlap semantics defined here are the single source of truth for
//! double-booking detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{BookingId, OrganizationId, ResourceId};

/// A half-open time interval `[start, end)`
///
/// Two slots overlap iff `a.start < b.end && a.end > b.start`. Touching
/// endpoints do not overlap, so back-to-back bookings on the same
/// resource are always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSlot {
    /// Creates a new TimeSlot
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTimeSlot` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeSlot {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns the start of the slot (inclusive)
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the end of the slot (exclusive)
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if this slot intersects another slot
    #[must_use]
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.overlaps_range(other.start, other.end)
    }

    /// Returns true if this slot intersects the raw window `[start, end)`
    ///
    /// The window is not validated: a zero- or negative-width window
    /// never overlaps anything, which is exactly the degenerate behavior
    /// conflict checks rely on for malformed candidate windows.
    #[must_use]
    pub fn overlaps_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// Lifecycle status of a booking
///
/// Only `Pending` and `Confirmed` bookings occupy their resource;
/// cancelled bookings are invisible to conflict queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested but not yet confirmed by an operator
    Pending,
    /// Confirmed and counting against the resource
    Confirmed,
    /// Cancelled; released back to the schedule
    Cancelled,
}

impl BookingStatus {
    /// Returns true for statuses that occupy the resource
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// A reservation of a resource for a time slot
///
/// Bookings are created in `Pending` status after passing conflict
/// checks, then confirmed or cancelled by operator action. They are never
/// hard-deleted: cancellation is the terminal state and excludes the
/// booking from all conflict-relevant queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier for this booking
    id: BookingId,
    /// The tenant organization that owns the booking
    organization_id: OrganizationId,
    /// The resource being reserved
    resource_id: ResourceId,
    /// The reserved interval
    slot: TimeSlot,
    /// Current lifecycle status
    status: BookingStatus,
    /// Number of participants currently attached to the booking
    participants: u32,
    /// When the booking was created
    created_at: DateTime<Utc>,
    /// When the booking was last modified
    updated_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new pending booking
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTimeSlot` if `start >= end`.
    pub fn new(
        organization_id: OrganizationId,
        resource_id: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        participants: u32,
    ) -> Result<Self, DomainError> {
        let slot = TimeSlot::new(start, end)?;
        let now = Utc::now();
        Ok(Self {
            id: BookingId::new(),
            organization_id,
            resource_id,
            slot,
            status: BookingStatus::Pending,
            participants,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the booking ID
    pub fn id(&self) -> &BookingId {
        &self.id
    }

    /// Returns the owning organization ID
    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    /// Returns the reserved resource ID
    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Returns the reserved time slot
    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    /// Returns the current status
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Returns the current participant count
    pub fn participants(&self) -> u32 {
        self.participants
    }

    /// Returns when the booking was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the booking was last modified
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the booking occupies its resource
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Confirms a pending booking
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` unless the booking is
    /// currently `Pending`.
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        match self.status {
            BookingStatus::Pending => {
                self.status = BookingStatus::Confirmed;
                self.updated_at = Utc::now();
                Ok(())
            }
            other => Err(DomainError::InvalidTransition {
                from: other.to_string(),
                to: BookingStatus::Confirmed.to_string(),
            }),
        }
    }

    /// Cancels a pending or confirmed booking
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` if already cancelled.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        match self.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {
                self.status = BookingStatus::Cancelled;
                self.updated_at = Utc::now();
                Ok(())
            }
            BookingStatus::Cancelled => Err(DomainError::InvalidTransition {
                from: BookingStatus::Cancelled.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            }),
        }
    }

    /// Updates the participant count
    pub fn set_participants(&mut self, participants: u32) {
        self.participants = participants;
        self.updated_at = Utc::now();
    }
}
