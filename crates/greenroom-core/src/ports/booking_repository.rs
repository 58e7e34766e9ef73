//! Booking repository port (driven/secondary port)
//!
//! This module defines the interface for persisting and querying
//! bookings, resources, and conflict logs.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, a hosted Postgres, an in-memory fake) and don't need
//!   domain-level classification; callers treat any storage error as
//!   "conflict status unknown", never as "no conflict".
//! - Overlap queries take raw `DateTime<Utc>` bounds rather than a
//!   validated `TimeSlot`: conflict checks accept degenerate candidate
//!   windows and rely on the half-open predicate to return nothing for
//!   them. Adapters that cannot push the predicate down must fetch and
//!   filter in-process with [`TimeSlot::overlaps_range`].
//! - `create_booking_guarded` exists because detect-then-insert is not
//!   atomic: two racing requests can both pass the detector before
//!   either row lands. The adapter must make the re-check and insert a
//!   single serialized unit so the insert itself fails on a lost race.
//!
//! [`TimeSlot::overlaps_range`]: crate::domain::TimeSlot::overlaps_range

use chrono::{DateTime, Utc};

use crate::domain::{
    Booking, BookingId, ConflictLog, ConflictLogId, ConflictSeverity, ConflictStatus,
    OrganizationId, Resource, ResourceId, ResourceRef,
};

// ============================================================================
// Query and result types
// ============================================================================

/// Filter criteria for querying conflict logs
///
/// All fields are optional; when `None`, no filtering is applied for that
/// field. Multiple filters are combined with AND logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictLogFilter {
    /// Filter by lifecycle status
    pub status: Option<ConflictStatus>,
    /// Filter by triage severity
    pub severity: Option<ConflictSeverity>,
}

impl ConflictLogFilter {
    /// Creates a new empty filter (matches all logs)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status filter
    pub fn with_status(mut self, status: ConflictStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the severity filter
    pub fn with_severity(mut self, severity: ConflictSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Returns true if no filters are set
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.severity.is_none()
    }
}

/// A conflict log joined with the minimal identity of its resource
///
/// `resource` is `None` when the resource row no longer exists; the log
/// outlives the resource it was recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictRecord {
    /// The persisted log entry
    pub log: ConflictLog,
    /// Display identity of the resource, if it still exists
    pub resource: Option<ResourceRef>,
}

/// Outcome of a guarded booking insert
#[derive(Debug, Clone)]
pub enum BookingInsertOutcome {
    /// The booking row was persisted
    Created,
    /// The transactional re-check found overlapping active bookings;
    /// nothing was persisted
    Rejected {
        /// The bookings that won the race for the window
        conflicting: Vec<Booking>,
    },
}

impl BookingInsertOutcome {
    /// Returns true if the booking was persisted
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, BookingInsertOutcome::Created)
    }
}

// ============================================================================
// IBookingRepository trait
// ============================================================================

/// Port trait for booking, resource, and conflict-log storage
///
/// This is the single persistence interface the conflict-detection
/// component depends on. The conflict-log operations are included here
/// rather than in a separate trait to avoid proliferating small
/// repository traits; implementations may delegate internally.
#[async_trait::async_trait]
pub trait IBookingRepository: Send + Sync {
    // --- Booking operations ---

    /// Saves a booking (insert or update)
    async fn save_booking(&self, booking: &Booking) -> anyhow::Result<()>;

    /// Retrieves a booking by its ID
    async fn get_booking(&self, id: &BookingId) -> anyhow::Result<Option<Booking>>;

    /// Lists active (pending or confirmed) bookings on a resource whose
    /// half-open interval overlaps `[start, end)`
    ///
    /// `exclude` removes one booking ID from consideration, used when
    /// re-validating an existing booking that is being modified.
    async fn find_active_overlapping(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> anyhow::Result<Vec<Booking>>;

    /// Sums participant counts over the same booking set as
    /// [`find_active_overlapping`], projecting only the counts
    ///
    /// [`find_active_overlapping`]: IBookingRepository::find_active_overlapping
    async fn sum_active_overlapping_participants(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> anyhow::Result<u32>;

    /// Inserts a booking behind an atomic overlap re-check
    ///
    /// The overlap check and the insert must execute as one serialized
    /// unit with respect to other guarded inserts, closing the window
    /// between a detector pass and the write. Returns
    /// [`BookingInsertOutcome::Rejected`] with the winning bookings when
    /// the race was lost; storage failures are errors as usual.
    async fn create_booking_guarded(
        &self,
        booking: &Booking,
    ) -> anyhow::Result<BookingInsertOutcome>;

    // --- Resource operations ---

    /// Saves a resource (insert or update)
    async fn save_resource(&self, resource: &Resource) -> anyhow::Result<()>;

    /// Retrieves a resource by its ID
    async fn get_resource(&self, id: &ResourceId) -> anyhow::Result<Option<Resource>>;

    // --- Conflict log operations ---

    /// Inserts a new conflict log entry
    async fn insert_conflict_log(&self, log: &ConflictLog) -> anyhow::Result<()>;

    /// Retrieves a conflict log by its ID
    async fn get_conflict_log(&self, id: &ConflictLogId)
        -> anyhow::Result<Option<ConflictLog>>;

    /// Updates an existing conflict log entry
    async fn update_conflict_log(&self, log: &ConflictLog) -> anyhow::Result<()>;

    /// Lists an organization's conflict logs matching the filter,
    /// joined with minimal resource identity, newest-created first
    async fn list_conflict_logs(
        &self,
        organization_id: &OrganizationId,
        filter: &ConflictLogFilter,
    ) -> anyhow::Result<Vec<ConflictRecord>>;
}
