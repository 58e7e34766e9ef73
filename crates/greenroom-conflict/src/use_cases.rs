//! Booking-creation use case
//!
//! Wires the detector's read-only pass to the store's guarded insert.
//! The detector alone cannot prevent a double booking: two requests for
//! the same window can both see a clear schedule before either row
//! lands. The guarded insert re-checks inside the store's write
//! transaction, so the second writer loses even when both passed the
//! detector.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use greenroom_core::domain::{Booking, OrganizationId, ResourceId};
use greenroom_core::ports::{BookingInsertOutcome, IBookingRepository};

use crate::detector::{BookingConflict, ConflictDetector};
use crate::error::CreateBookingError;

/// Orchestrates validation, conflict checking, and the atomic insert
pub struct CreateBookingUseCase {
    detector: Arc<ConflictDetector>,
    repository: Arc<dyn IBookingRepository>,
    record_conflicts: bool,
}

impl CreateBookingUseCase {
    /// Creates the use case; conflict recording is off by default
    pub fn new(detector: Arc<ConflictDetector>, repository: Arc<dyn IBookingRepository>) -> Self {
        Self {
            detector,
            repository,
            record_conflicts: false,
        }
    }

    /// Enables or disables writing a conflict log per rejected finding
    pub fn with_conflict_recording(mut self, enabled: bool) -> Self {
        self.record_conflicts = enabled;
        self
    }

    /// Creates a booking for the given window, or reports why it cannot
    ///
    /// Steps:
    /// 1. Reject empty or inverted windows outright; the detector's
    ///    overlap math would silently call them conflict-free.
    /// 2. Run the full conflict check; any finding rejects the request.
    /// 3. Persist through the guarded insert; a lost race surfaces as
    ///    the same rejection shape with the winning bookings attached.
    ///
    /// # Errors
    ///
    /// [`CreateBookingError::Rejected`] carries the findings for the
    /// caller's 409 response; storage and detection failures mean the
    /// booking state is unknown and map to a 500-class response.
    pub async fn create(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        participants: u32,
    ) -> Result<Booking, CreateBookingError> {
        let booking = Booking::new(*organization_id, *resource_id, start, end, participants)
            .map_err(|_| CreateBookingError::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            })?;

        let findings = self
            .detector
            .check_booking_conflicts(organization_id, resource_id, start, end, None)
            .await?;
        if !findings.is_empty() {
            self.record(organization_id, resource_id, &findings).await?;
            return Err(CreateBookingError::Rejected(findings));
        }

        let outcome = self
            .repository
            .create_booking_guarded(&booking)
            .await
            .map_err(CreateBookingError::Storage)?;

        match outcome {
            BookingInsertOutcome::Created => {
                info!(
                    booking_id = %booking.id(),
                    resource_id = %resource_id,
                    "Booking created"
                );
                Ok(booking)
            }
            BookingInsertOutcome::Rejected { conflicting } => {
                // Another writer landed between our check and the insert.
                warn!(
                    resource_id = %resource_id,
                    winners = conflicting.len(),
                    "Booking lost check-to-insert race"
                );
                let findings = vec![BookingConflict::double_booking(conflicting, start, end)];
                self.record(organization_id, resource_id, &findings).await?;
                Err(CreateBookingError::Rejected(findings))
            }
        }
    }

    /// Writes one conflict log per finding when recording is enabled
    async fn record(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        findings: &[BookingConflict],
    ) -> Result<(), CreateBookingError> {
        if !self.record_conflicts {
            return Ok(());
        }
        for finding in findings {
            self.detector
                .log_conflict(
                    organization_id,
                    resource_id,
                    finding.data().clone(),
                    Some(finding.severity()),
                )
                .await?;
        }
        Ok(())
    }
}
