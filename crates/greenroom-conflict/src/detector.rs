//! Conflict detection logic
//!
//! Runs the three independent checks a candidate booking must pass:
//! double-booking overlap, resource availability, and capacity headroom.
//! Each check contributes at most one finding; all applicable findings
//! are returned, in a fixed order, so a caller sees every reason a
//! booking would be rejected in a single pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use greenroom_core::domain::{
    Booking, BookingId, ConflictData, ConflictSeverity, ConflictType, OrganizationId, Resource,
    ResourceId, UnavailableReason,
};
use greenroom_core::ports::IBookingRepository;

use crate::error::DetectorError;

/// Fixed remediation hints attached to double-booking findings.
///
/// These are human-readable suggestions, not computed alternatives.
const DOUBLE_BOOKING_HINTS: [&str; 3] = [
    "Choose a different time window",
    "Choose a different resource",
    "Contact the holder of the existing booking",
];

/// One reason a candidate booking conflicts with the current schedule
///
/// The conflict kind is carried by the typed payload, so a finding's type
/// and its data can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingConflict {
    severity: ConflictSeverity,
    message: String,
    data: ConflictData,
    suggested_resolutions: Vec<String>,
}

impl BookingConflict {
    /// Builds a double-booking finding over the bookings occupying the window
    pub fn double_booking(
        conflicting: Vec<Booking>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            severity: ConflictSeverity::High,
            message: format!(
                "Resource is already booked between {} and {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            ),
            data: ConflictData::DoubleBooking {
                conflicting_bookings: conflicting,
            },
            suggested_resolutions: DOUBLE_BOOKING_HINTS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Builds an availability finding for the given gate
    pub fn resource_unavailable(reason: UnavailableReason, message: String) -> Self {
        let severity = match reason {
            UnavailableReason::NotFound => ConflictSeverity::Critical,
            UnavailableReason::Inactive => ConflictSeverity::High,
            UnavailableReason::NotBookable => ConflictSeverity::Medium,
        };
        Self {
            severity,
            message,
            data: ConflictData::ResourceUnavailable { reason },
            suggested_resolutions: Vec::new(),
        }
    }

    /// Builds a capacity finding from existing load and the ceiling
    pub fn capacity_exceeded(current_load: u32, capacity: u32) -> Self {
        Self {
            severity: ConflictSeverity::Medium,
            message: format!(
                "Existing bookings hold {current_load} of {capacity} participant slots in this window"
            ),
            data: ConflictData::CapacityExceeded {
                current_load,
                capacity,
            },
            suggested_resolutions: Vec::new(),
        }
    }

    /// Returns the conflict kind, derived from the payload
    pub fn conflict_type(&self) -> ConflictType {
        self.data.conflict_type()
    }

    /// Returns the triage severity
    pub fn severity(&self) -> ConflictSeverity {
        self.severity
    }

    /// Returns the human-readable description
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the typed payload
    pub fn data(&self) -> &ConflictData {
        &self.data
    }

    /// Returns the bookings occupying the window, for double-booking findings
    pub fn conflicting_bookings(&self) -> &[Booking] {
        match &self.data {
            ConflictData::DoubleBooking {
                conflicting_bookings,
            } => conflicting_bookings,
            _ => &[],
        }
    }

    /// Returns the fixed remediation hints, if any
    pub fn suggested_resolutions(&self) -> &[String] {
        &self.suggested_resolutions
    }
}

/// Detects conflicts for candidate bookings against the persistent store
///
/// The detector holds no state between calls: every check re-reads fresh
/// data through the injected repository, and the check itself is
/// read-only. Recording a conflict log for a finding is a separate,
/// explicit call the caller makes (see the ledger operations).
///
/// Note the detect-then-insert sequence is inherently racy; persisting a
/// booking must go through the store's guarded insert, with this check
/// serving as the fast path (see `CreateBookingUseCase`).
pub struct ConflictDetector {
    repository: Arc<dyn IBookingRepository>,
}

impl ConflictDetector {
    /// Creates a detector backed by the given repository
    pub fn new(repository: Arc<dyn IBookingRepository>) -> Self {
        Self { repository }
    }

    pub(crate) fn repository(&self) -> &Arc<dyn IBookingRepository> {
        &self.repository
    }

    /// Checks a candidate booking window for conflicts
    ///
    /// Runs three checks and returns every finding that applies, in a
    /// fixed order: double-booking first, resource availability second,
    /// capacity third. The candidate window is deliberately not
    /// validated; a window with `start >= end` overlaps nothing and the
    /// overlap-based checks degenerate to "no conflict" (callers should
    /// reject such windows before ever asking, see `CreateBookingUseCase`).
    ///
    /// `exclude` removes one booking from consideration in the overlap
    /// and capacity queries, for re-validating an existing booking being
    /// moved or resized.
    ///
    /// # Errors
    ///
    /// Any store failure aborts the whole check with
    /// [`DetectorError::Storage`]: partial results are never returned,
    /// and a failed check means "conflict status unknown".
    pub async fn check_booking_conflicts(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> Result<Vec<BookingConflict>, DetectorError> {
        let mut findings = Vec::new();

        // Check 1: double booking. Half-open overlap, pending/confirmed only.
        let overlapping = self
            .repository
            .find_active_overlapping(organization_id, resource_id, start, end, exclude)
            .await?;
        if !overlapping.is_empty() {
            debug!(
                resource_id = %resource_id,
                overlapping = overlapping.len(),
                "Double booking detected"
            );
            findings.push(BookingConflict::double_booking(overlapping, start, end));
        }

        // Checks 2 and 3 share one resource read. A missing resource is a
        // finding, not an error; its capacity cannot be read, so the
        // capacity check yields nothing for it.
        let resource = self.repository.get_resource(resource_id).await?;

        if let Some(finding) = availability_finding(resource_id, resource.as_ref()) {
            debug!(
                resource_id = %resource_id,
                severity = %finding.severity(),
                "Resource unavailable"
            );
            findings.push(finding);
        }

        if let Some(capacity) = resource.as_ref().and_then(Resource::capacity) {
            let load = self
                .repository
                .sum_active_overlapping_participants(
                    organization_id,
                    resource_id,
                    start,
                    end,
                    exclude,
                )
                .await?;
            // Existing load only; the candidate's own participants are not
            // added before comparing. A booking that fills the last slot
            // is admitted.
            if load >= capacity {
                debug!(
                    resource_id = %resource_id,
                    load,
                    capacity,
                    "Capacity exceeded"
                );
                findings.push(BookingConflict::capacity_exceeded(load, capacity));
            }
        }

        Ok(findings)
    }
}

/// Availability gate: not-found, inactive, and not-bookable, in strict
/// order with first match winning
fn availability_finding(
    resource_id: &ResourceId,
    resource: Option<&Resource>,
) -> Option<BookingConflict> {
    match resource {
        None => Some(BookingConflict::resource_unavailable(
            UnavailableReason::NotFound,
            format!("Resource {resource_id} does not exist"),
        )),
        Some(r) if !r.is_active() => Some(BookingConflict::resource_unavailable(
            UnavailableReason::Inactive,
            format!("Resource \"{}\" is inactive and cannot accept bookings", r.title()),
        )),
        Some(r) if !r.is_bookable() => Some(BookingConflict::resource_unavailable(
            UnavailableReason::NotBookable,
            format!("Resource \"{}\" is not currently accepting bookings", r.title()),
        )),
        Some(_) => None,
    }
}
