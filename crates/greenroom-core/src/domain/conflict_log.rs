//! Conflict log domain entities
//!
//! This module defines types for recording, tracking, and resolving
//! booking conflicts: the classification enums, the typed per-kind
//! payload, and the `ConflictLog` audit entity with its
//! open → investigating → resolved/ignored lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::Booking;
use super::errors::DomainError;
use super::newtypes::{ConflictLogId, OrganizationId, ResourceId};

/// Kinds of booking conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Two active bookings occupy overlapping windows on one resource
    DoubleBooking,
    /// A booking and its resource disagree about the wall-clock timezone
    TimezoneMismatch,
    /// The resource is missing, inactive, or closed to bookings
    ResourceUnavailable,
    /// Overlapping participant load meets or exceeds the capacity
    CapacityExceeded,
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConflictType::DoubleBooking => "double_booking",
            ConflictType::TimezoneMismatch => "timezone_mismatch",
            ConflictType::ResourceUnavailable => "resource_unavailable",
            ConflictType::CapacityExceeded => "capacity_exceeded",
        };
        write!(f, "{}", s)
    }
}

/// How serious a conflict is for operators triaging the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConflictSeverity::Low => "low",
            ConflictSeverity::Medium => "medium",
            ConflictSeverity::High => "high",
            ConflictSeverity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle status of a conflict log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    /// Newly recorded, awaiting triage
    Open,
    /// An operator is actively looking into it
    Investigating,
    /// Closed with a resolution
    Resolved,
    /// Closed without action
    Ignored,
}

impl ConflictStatus {
    /// Returns true for the two terminal states
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConflictStatus::Resolved | ConflictStatus::Ignored)
    }
}

impl std::fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConflictStatus::Open => "open",
            ConflictStatus::Investigating => "investigating",
            ConflictStatus::Resolved => "resolved",
            ConflictStatus::Ignored => "ignored",
        };
        write!(f, "{}", s)
    }
}

/// Why a resource could not accept a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No resource row exists for the requested ID
    NotFound,
    /// The resource exists but is deactivated
    Inactive,
    /// The resource is active but closed to new bookings
    NotBookable,
}

/// Structured payload for a conflict, one shape per conflict kind
///
/// The serde tag doubles as the stored `conflict_type` discriminant, so a
/// persisted log's type column and payload can never disagree: the type
/// is always derived from the payload via [`ConflictData::conflict_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictData {
    /// The bookings that already occupy the contested window
    DoubleBooking {
        conflicting_bookings: Vec<Booking>,
    },
    /// The gate that rejected the resource
    ResourceUnavailable { reason: UnavailableReason },
    /// Existing load versus the configured ceiling
    CapacityExceeded { current_load: u32, capacity: u32 },
    /// Reported timezone disagreement (never emitted by detection itself)
    TimezoneMismatch {
        booking_timezone: String,
        resource_timezone: String,
    },
}

impl ConflictData {
    /// Returns the conflict kind this payload describes
    #[must_use]
    pub fn conflict_type(&self) -> ConflictType {
        match self {
            ConflictData::DoubleBooking { .. } => ConflictType::DoubleBooking,
            ConflictData::ResourceUnavailable { .. } => ConflictType::ResourceUnavailable,
            ConflictData::CapacityExceeded { .. } => ConflictType::CapacityExceeded,
            ConflictData::TimezoneMismatch { .. } => ConflictType::TimezoneMismatch,
        }
    }
}

/// A persisted audit record of a detected or reported booking conflict
///
/// Conflict logs exist independently of whether the triggering action was
/// blocked: the detector's callers decide whether a rejected booking is
/// worth an audit row. Once resolved or ignored, a log is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictLog {
    /// Unique identifier for this log entry
    id: ConflictLogId,
    /// The tenant organization the conflict belongs to
    organization_id: OrganizationId,
    /// The resource the conflict is about
    resource_id: ResourceId,
    /// Structured payload; also carries the conflict kind
    conflict_data: ConflictData,
    /// Triage severity
    severity: ConflictSeverity,
    /// Lifecycle status
    status: ConflictStatus,
    /// Short resolution label, set only when resolved
    resolution: Option<String>,
    /// When the conflict was resolved or ignored
    resolved_at: Option<DateTime<Utc>>,
    /// Who resolved or ignored the conflict
    resolved_by: Option<String>,
    /// Free-text notes recorded at resolution time
    resolution_notes: Option<String>,
    /// When the log entry was created
    created_at: DateTime<Utc>,
    /// When the log entry was last modified
    updated_at: DateTime<Utc>,
}

impl ConflictLog {
    /// Creates a new open conflict log entry
    pub fn new(
        organization_id: OrganizationId,
        resource_id: ResourceId,
        conflict_data: ConflictData,
        severity: ConflictSeverity,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ConflictLogId::new(),
            organization_id,
            resource_id,
            conflict_data,
            severity,
            status: ConflictStatus::Open,
            resolution: None,
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the log entry ID
    pub fn id(&self) -> &ConflictLogId {
        &self.id
    }

    /// Returns the owning organization ID
    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    /// Returns the resource the conflict is about
    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Returns the conflict kind, derived from the payload
    pub fn conflict_type(&self) -> ConflictType {
        self.conflict_data.conflict_type()
    }

    /// Returns the structured payload
    pub fn conflict_data(&self) -> &ConflictData {
        &self.conflict_data
    }

    /// Returns the triage severity
    pub fn severity(&self) -> ConflictSeverity {
        self.severity
    }

    /// Returns the lifecycle status
    pub fn status(&self) -> ConflictStatus {
        self.status
    }

    /// Returns the resolution label if resolved
    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    /// Returns when the conflict was closed, if closed
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns who closed the conflict, if closed
    pub fn resolved_by(&self) -> Option<&str> {
        self.resolved_by.as_deref()
    }

    /// Returns the resolution notes, if any
    pub fn resolution_notes(&self) -> Option<&str> {
        self.resolution_notes.as_deref()
    }

    /// Returns when the log entry was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the log entry was last modified
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves an open conflict into investigation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` unless the status is `Open`.
    pub fn begin_investigation(&mut self) -> Result<(), DomainError> {
        match self.status {
            ConflictStatus::Open => {
                self.status = ConflictStatus::Investigating;
                self.updated_at = Utc::now();
                Ok(())
            }
            other => Err(DomainError::InvalidTransition {
                from: other.to_string(),
                to: ConflictStatus::Investigating.to_string(),
            }),
        }
    }

    /// Resolves the conflict, stamping the resolution metadata
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` if the conflict is
    /// already in a terminal state.
    pub fn resolve(
        &mut self,
        resolution: impl Into<String>,
        resolved_by: impl Into<String>,
        notes: Option<String>,
    ) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: ConflictStatus::Resolved.to_string(),
            });
        }

        self.status = ConflictStatus::Resolved;
        self.resolution = Some(resolution.into());
        self.resolved_by = Some(resolved_by.into());
        self.resolution_notes = notes;
        self.resolved_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Closes the conflict without action
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` if the conflict is
    /// already in a terminal state.
    pub fn ignore(&mut self, ignored_by: impl Into<String>) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: ConflictStatus::Ignored.to_string(),
            });
        }

        self.status = ConflictStatus::Ignored;
        self.resolved_by = Some(ignored_by.into());
        self.resolved_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }
}
