//! Resource domain entities
//!
//! A resource is any bookable thing an organization manages: a rehearsal
//! space, a piece of equipment, an instructor slot. Resources gate
//! bookability through two independent flags and an optional participant
//! capacity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{OrganizationId, ResourceId};

/// A bookable resource owned by one organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier for this resource
    id: ResourceId,
    /// The tenant organization that owns the resource
    organization_id: OrganizationId,
    /// Display title, e.g. "Studio B"
    title: String,
    /// Free-form kind tag, e.g. "space", "equipment", "person"
    resource_type: String,
    /// Maximum concurrent participants; `None` means unconstrained
    capacity: Option<u32>,
    /// Whether the resource exists operationally at all
    is_active: bool,
    /// Whether new bookings are currently accepted
    is_bookable: bool,
    /// When the resource was created
    created_at: DateTime<Utc>,
}

impl Resource {
    /// Creates a new active, bookable resource
    pub fn new(
        organization_id: OrganizationId,
        title: impl Into<String>,
        resource_type: impl Into<String>,
        capacity: Option<u32>,
    ) -> Self {
        Self {
            id: ResourceId::new(),
            organization_id,
            title: title.into(),
            resource_type: resource_type.into(),
            capacity,
            is_active: true,
            is_bookable: true,
            created_at: Utc::now(),
        }
    }

    /// Returns the resource ID
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Returns the owning organization ID
    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    /// Returns the display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the resource kind tag
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the participant capacity, if constrained
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Returns whether the resource is operationally active
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the resource accepts new bookings
    pub fn is_bookable(&self) -> bool {
        self.is_bookable
    }

    /// Returns when the resource was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Deactivates the resource entirely
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Reactivates the resource
    pub fn activate(&mut self) {
        self.is_active = true;
    }

    /// Closes the resource to new bookings without deactivating it
    pub fn close_bookings(&mut self) {
        self.is_bookable = false;
    }

    /// Reopens the resource to new bookings
    pub fn open_bookings(&mut self) {
        self.is_bookable = true;
    }

    /// Returns the minimal identity used in conflict listings
    pub fn to_ref(&self) -> ResourceRef {
        ResourceRef {
            id: self.id,
            title: self.title.clone(),
            resource_type: self.resource_type.clone(),
        }
    }
}

/// Minimal resource identity joined into conflict-log listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// The resource ID
    pub id: ResourceId,
    /// Display title at the time of the query
    pub title: String,
    /// Resource kind tag
    pub resource_type: String,
}
