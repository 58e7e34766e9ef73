//! In-process repository doubles shared by the unit tests
//!
//! `InMemoryRepository` is a functional implementation of the port over
//! hash maps, filtering overlap in-process with the domain predicate.
//! `FailingRepository` errors on every call, for exercising the
//! "conflict status unknown" propagation rules.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use greenroom_core::domain::{
    Booking, BookingId, ConflictLog, ConflictLogId, OrganizationId, Resource, ResourceId,
};
use greenroom_core::ports::{
    BookingInsertOutcome, ConflictLogFilter, ConflictRecord, IBookingRepository,
};

/// Fixed-date hour marks used across the detector tests
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
}

/// In-memory implementation of `IBookingRepository`
#[derive(Default)]
pub struct InMemoryRepository {
    bookings: Mutex<HashMap<BookingId, Booking>>,
    resources: Mutex<HashMap<ResourceId, Resource>>,
    conflict_logs: Mutex<Vec<ConflictLog>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn overlapping(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> Vec<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| {
                b.organization_id() == organization_id
                    && b.resource_id() == resource_id
                    && b.is_active()
                    && b.slot().overlaps_range(start, end)
                    && exclude != Some(b.id())
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl IBookingRepository for InMemoryRepository {
    async fn save_booking(&self, booking: &Booking) -> anyhow::Result<()> {
        self.bookings
            .lock()
            .unwrap()
            .insert(*booking.id(), booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: &BookingId) -> anyhow::Result<Option<Booking>> {
        Ok(self.bookings.lock().unwrap().get(id).cloned())
    }

    async fn find_active_overlapping(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> anyhow::Result<Vec<Booking>> {
        Ok(self.overlapping(organization_id, resource_id, start, end, exclude))
    }

    async fn sum_active_overlapping_participants(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> anyhow::Result<u32> {
        Ok(self
            .overlapping(organization_id, resource_id, start, end, exclude)
            .iter()
            .map(Booking::participants)
            .sum())
    }

    async fn create_booking_guarded(
        &self,
        booking: &Booking,
    ) -> anyhow::Result<BookingInsertOutcome> {
        // The bookings mutex stands in for the store's write transaction:
        // the re-check and the insert happen under one lock.
        let mut bookings = self.bookings.lock().unwrap();
        let conflicting: Vec<Booking> = bookings
            .values()
            .filter(|b| {
                b.organization_id() == booking.organization_id()
                    && b.resource_id() == booking.resource_id()
                    && b.is_active()
                    && b.slot().overlaps(booking.slot())
            })
            .cloned()
            .collect();

        if !conflicting.is_empty() {
            return Ok(BookingInsertOutcome::Rejected { conflicting });
        }

        bookings.insert(*booking.id(), booking.clone());
        Ok(BookingInsertOutcome::Created)
    }

    async fn save_resource(&self, resource: &Resource) -> anyhow::Result<()> {
        self.resources
            .lock()
            .unwrap()
            .insert(*resource.id(), resource.clone());
        Ok(())
    }

    async fn get_resource(&self, id: &ResourceId) -> anyhow::Result<Option<Resource>> {
        Ok(self.resources.lock().unwrap().get(id).cloned())
    }

    async fn insert_conflict_log(&self, log: &ConflictLog) -> anyhow::Result<()> {
        self.conflict_logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn get_conflict_log(
        &self,
        id: &ConflictLogId,
    ) -> anyhow::Result<Option<ConflictLog>> {
        Ok(self
            .conflict_logs
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id() == id)
            .cloned())
    }

    async fn update_conflict_log(&self, log: &ConflictLog) -> anyhow::Result<()> {
        let mut logs = self.conflict_logs.lock().unwrap();
        match logs.iter_mut().find(|l| l.id() == log.id()) {
            Some(existing) => {
                *existing = log.clone();
                Ok(())
            }
            None => anyhow::bail!("no conflict log with id {}", log.id()),
        }
    }

    async fn list_conflict_logs(
        &self,
        organization_id: &OrganizationId,
        filter: &ConflictLogFilter,
    ) -> anyhow::Result<Vec<ConflictRecord>> {
        let resources = self.resources.lock().unwrap();
        let mut records: Vec<ConflictRecord> = self
            .conflict_logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| {
                l.organization_id() == organization_id
                    && filter.status.map_or(true, |s| l.status() == s)
                    && filter.severity.map_or(true, |s| l.severity() == s)
            })
            .map(|l| ConflictRecord {
                log: l.clone(),
                resource: resources.get(l.resource_id()).map(Resource::to_ref),
            })
            .collect();
        records.sort_by(|a, b| b.log.created_at().cmp(&a.log.created_at()));
        Ok(records)
    }
}

/// Repository double whose every method fails
pub struct FailingRepository;

#[async_trait]
impl IBookingRepository for FailingRepository {
    async fn save_booking(&self, _: &Booking) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable")
    }
    async fn get_booking(&self, _: &BookingId) -> anyhow::Result<Option<Booking>> {
        anyhow::bail!("store unavailable")
    }
    async fn find_active_overlapping(
        &self,
        _: &OrganizationId,
        _: &ResourceId,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
        _: Option<&BookingId>,
    ) -> anyhow::Result<Vec<Booking>> {
        anyhow::bail!("store unavailable")
    }
    async fn sum_active_overlapping_participants(
        &self,
        _: &OrganizationId,
        _: &ResourceId,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
        _: Option<&BookingId>,
    ) -> anyhow::Result<u32> {
        anyhow::bail!("store unavailable")
    }
    async fn create_booking_guarded(
        &self,
        _: &Booking,
    ) -> anyhow::Result<BookingInsertOutcome> {
        anyhow::bail!("store unavailable")
    }
    async fn save_resource(&self, _: &Resource) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable")
    }
    async fn get_resource(&self, _: &ResourceId) -> anyhow::Result<Option<Resource>> {
        anyhow::bail!("store unavailable")
    }
    async fn insert_conflict_log(&self, _: &ConflictLog) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable")
    }
    async fn get_conflict_log(&self, _: &ConflictLogId) -> anyhow::Result<Option<ConflictLog>> {
        anyhow::bail!("store unavailable")
    }
    async fn update_conflict_log(&self, _: &ConflictLog) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable")
    }
    async fn list_conflict_logs(
        &self,
        _: &OrganizationId,
        _: &ConflictLogFilter,
    ) -> anyhow::Result<Vec<ConflictRecord>> {
        anyhow::bail!("store unavailable")
    }
}
