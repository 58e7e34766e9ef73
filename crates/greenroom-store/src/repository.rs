//! SQLite implementation of IBookingRepository
//!
//! This module provides the concrete SQLite-based implementation of the
//! booking repository port defined in greenroom-core. It handles domain
//! type serialization/deserialization and SQL query construction,
//! including the transactional double-booking guard.
//!
//! ## Type Mapping
//!
//! | Domain Type                 | SQL Type | Strategy                            |
//! |-----------------------------|----------|-------------------------------------|
//! | OrganizationId, ResourceId  | TEXT     | UUID string via `.to_string()`      |
//! | BookingId, ConflictLogId    | TEXT     | UUID string via `.to_string()`      |
//! | DateTime<Utc>               | TEXT     | ISO 8601 via `to_rfc3339()`         |
//! | BookingStatus               | TEXT     | snake_case via `Display`            |
//! | ConflictSeverity, ConflictStatus, ConflictType | TEXT | snake_case via `Display` |
//! | ConflictData                | TEXT     | serde_json serialization            |
//!
//! The half-open overlap predicate is pushed into SQL verbatim:
//! `start_time < :end AND end_time > :start`. RFC 3339 UTC strings
//! compare lexicographically in timestamp order, so the comparison runs
//! on the TEXT columns directly.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use chrono::{DateTime, Utc};
use serde_json::json;

use greenroom_core::domain::{
    Booking, BookingId, ConflictLog, ConflictLogId, OrganizationId, Resource, ResourceId,
    ResourceRef,
};
use greenroom_core::ports::{
    BookingInsertOutcome, ConflictLogFilter, ConflictRecord, IBookingRepository,
};

use crate::StoreError;

/// SQLite-based implementation of the booking repository port
///
/// All operations go through a connection pool; the guarded insert takes
/// a dedicated connection so it can hold the write lock across its
/// re-check and insert.
pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    /// Creates a new repository instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row mapping functions
// ============================================================================

/// Reconstruct a Booking from a database row
///
/// Uses serde JSON deserialization to reconstruct the entity since its
/// fields are private and can only be set through constructors or
/// deserialization.
fn booking_from_row(row: &SqliteRow) -> Result<Booking, StoreError> {
    let booking_json = json!({
        "id": row.get::<String, _>("id"),
        "organization_id": row.get::<String, _>("organization_id"),
        "resource_id": row.get::<String, _>("resource_id"),
        "slot": {
            "start": row.get::<String, _>("start_time"),
            "end": row.get::<String, _>("end_time"),
        },
        "status": row.get::<String, _>("status"),
        "participants": row.get::<i64, _>("participants"),
        "created_at": row.get::<String, _>("created_at"),
        "updated_at": row.get::<String, _>("updated_at"),
    });

    serde_json::from_value(booking_json)
        .map_err(|e| StoreError::SerializationError(format!("Invalid booking row: {}", e)))
}

/// Reconstruct a Resource from a database row
fn resource_from_row(row: &SqliteRow) -> Result<Resource, StoreError> {
    let resource_json = json!({
        "id": row.get::<String, _>("id"),
        "organization_id": row.get::<String, _>("organization_id"),
        "title": row.get::<String, _>("title"),
        "resource_type": row.get::<String, _>("resource_type"),
        "capacity": row.get::<Option<i64>, _>("capacity"),
        "is_active": row.get::<i64, _>("is_active") != 0,
        "is_bookable": row.get::<i64, _>("is_bookable") != 0,
        "created_at": row.get::<String, _>("created_at"),
    });

    serde_json::from_value(resource_json)
        .map_err(|e| StoreError::SerializationError(format!("Invalid resource row: {}", e)))
}

/// Reconstruct a ConflictLog from a database row
///
/// The `conflict_type` column is written for query use only; on read the
/// type is derived from the payload, which is the source of truth.
fn conflict_log_from_row(row: &SqliteRow) -> Result<ConflictLog, StoreError> {
    let data_str: String = row.get("conflict_data");
    let conflict_data: serde_json::Value = serde_json::from_str(&data_str)
        .map_err(|e| StoreError::SerializationError(format!("Invalid conflict_data JSON: {}", e)))?;

    let log_json = json!({
        "id": row.get::<String, _>("id"),
        "organization_id": row.get::<String, _>("organization_id"),
        "resource_id": row.get::<String, _>("resource_id"),
        "conflict_data": conflict_data,
        "severity": row.get::<String, _>("severity"),
        "status": row.get::<String, _>("status"),
        "resolution": row.get::<Option<String>, _>("resolution"),
        "resolved_at": row.get::<Option<String>, _>("resolved_at"),
        "resolved_by": row.get::<Option<String>, _>("resolved_by"),
        "resolution_notes": row.get::<Option<String>, _>("resolution_notes"),
        "created_at": row.get::<String, _>("created_at"),
        "updated_at": row.get::<String, _>("updated_at"),
    });

    serde_json::from_value(log_json)
        .map_err(|e| StoreError::SerializationError(format!("Invalid conflict log row: {}", e)))
}

// ============================================================================
// SQL fragments
// ============================================================================

/// Active bookings on one resource overlapping a half-open window, with
/// optional single-ID exclusion. Bind order: org, resource, end, start,
/// exclude, exclude.
const SELECT_ACTIVE_OVERLAPPING: &str = "\
    SELECT * FROM bookings \
    WHERE organization_id = ?1 AND resource_id = ?2 \
      AND status IN ('pending', 'confirmed') \
      AND start_time < ?3 AND end_time > ?4 \
      AND (?5 IS NULL OR id <> ?5) \
    ORDER BY start_time ASC";

const UPSERT_BOOKING: &str = "\
    INSERT INTO bookings \
        (id, organization_id, resource_id, start_time, end_time, status, \
         participants, created_at, updated_at) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
    ON CONFLICT(id) DO UPDATE SET \
        start_time = excluded.start_time, \
        end_time = excluded.end_time, \
        status = excluded.status, \
        participants = excluded.participants, \
        updated_at = excluded.updated_at";

/// Insert the booking row, shared by the plain save and the guarded path
async fn insert_booking(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<(), StoreError> {
    sqlx::query(UPSERT_BOOKING)
        .bind(booking.id().to_string())
        .bind(booking.organization_id().to_string())
        .bind(booking.resource_id().to_string())
        .bind(booking.slot().start().to_rfc3339())
        .bind(booking.slot().end().to_rfc3339())
        .bind(booking.status().to_string())
        .bind(i64::from(booking.participants()))
        .bind(booking.created_at().to_rfc3339())
        .bind(booking.updated_at().to_rfc3339())
        .execute(conn)
        .await
        .map_err(StoreError::from)?;
    Ok(())
}

/// Re-check the overlap predicate and insert while holding the write lock
async fn guarded_insert(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<BookingInsertOutcome, StoreError> {
    let rows = sqlx::query(SELECT_ACTIVE_OVERLAPPING)
        .bind(booking.organization_id().to_string())
        .bind(booking.resource_id().to_string())
        .bind(booking.slot().end().to_rfc3339())
        .bind(booking.slot().start().to_rfc3339())
        .bind(Option::<String>::None)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::from)?;

    let conflicting = rows
        .iter()
        .map(booking_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    if !conflicting.is_empty() {
        return Ok(BookingInsertOutcome::Rejected { conflicting });
    }

    insert_booking(conn, booking).await?;
    Ok(BookingInsertOutcome::Created)
}

// ============================================================================
// IBookingRepository implementation
// ============================================================================

#[async_trait::async_trait]
impl IBookingRepository for SqliteBookingRepository {
    async fn save_booking(&self, booking: &Booking) -> anyhow::Result<()> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::from)?;
        insert_booking(&mut conn, booking).await?;
        Ok(())
    }

    async fn get_booking(&self, id: &BookingId) -> anyhow::Result<Option<Booking>> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        row.as_ref().map(booking_from_row).transpose().map_err(Into::into)
    }

    async fn find_active_overlapping(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> anyhow::Result<Vec<Booking>> {
        let rows = sqlx::query(SELECT_ACTIVE_OVERLAPPING)
            .bind(organization_id.to_string())
            .bind(resource_id.to_string())
            .bind(end.to_rfc3339())
            .bind(start.to_rfc3339())
            .bind(exclude.map(ToString::to_string))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        rows.iter()
            .map(booking_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn sum_active_overlapping_participants(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<&BookingId>,
    ) -> anyhow::Result<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(participants), 0) AS total FROM bookings \
             WHERE organization_id = ?1 AND resource_id = ?2 \
               AND status IN ('pending', 'confirmed') \
               AND start_time < ?3 AND end_time > ?4 \
               AND (?5 IS NULL OR id <> ?5)",
        )
        .bind(organization_id.to_string())
        .bind(resource_id.to_string())
        .bind(end.to_rfc3339())
        .bind(start.to_rfc3339())
        .bind(exclude.map(ToString::to_string))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let total: i64 = row.get("total");
        u32::try_from(total).map_err(|_| {
            StoreError::SerializationError(format!("Participant sum out of range: {}", total))
                .into()
        })
    }

    async fn create_booking_guarded(
        &self,
        booking: &Booking,
    ) -> anyhow::Result<BookingInsertOutcome> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::from)?;

        // IMMEDIATE takes the write lock up front, so the overlap
        // re-check and the insert form one serialized unit with respect
        // to every other guarded insert.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(StoreError::from)?;

        match guarded_insert(&mut conn, booking).await {
            Ok(outcome) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(StoreError::from)?;
                if let BookingInsertOutcome::Rejected { conflicting } = &outcome {
                    tracing::debug!(
                        booking_id = %booking.id(),
                        winners = conflicting.len(),
                        "Guarded insert rejected overlapping booking"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e.into())
            }
        }
    }

    async fn save_resource(&self, resource: &Resource) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO resources \
                 (id, organization_id, title, resource_type, capacity, \
                  is_active, is_bookable, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(id) DO UPDATE SET \
                 title = excluded.title, \
                 resource_type = excluded.resource_type, \
                 capacity = excluded.capacity, \
                 is_active = excluded.is_active, \
                 is_bookable = excluded.is_bookable",
        )
        .bind(resource.id().to_string())
        .bind(resource.organization_id().to_string())
        .bind(resource.title())
        .bind(resource.resource_type())
        .bind(resource.capacity().map(i64::from))
        .bind(resource.is_active())
        .bind(resource.is_bookable())
        .bind(resource.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn get_resource(&self, id: &ResourceId) -> anyhow::Result<Option<Resource>> {
        let row = sqlx::query("SELECT * FROM resources WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        row.as_ref().map(resource_from_row).transpose().map_err(Into::into)
    }

    async fn insert_conflict_log(&self, log: &ConflictLog) -> anyhow::Result<()> {
        let data_json = serde_json::to_string(log.conflict_data()).map_err(|e| {
            StoreError::SerializationError(format!("Failed to serialize conflict_data: {}", e))
        })?;

        sqlx::query(
            "INSERT INTO conflict_logs \
                 (id, organization_id, resource_id, conflict_type, conflict_data, \
                  severity, status, resolution, resolved_at, resolved_by, \
                  resolution_notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(log.id().to_string())
        .bind(log.organization_id().to_string())
        .bind(log.resource_id().to_string())
        .bind(log.conflict_type().to_string())
        .bind(data_json)
        .bind(log.severity().to_string())
        .bind(log.status().to_string())
        .bind(log.resolution())
        .bind(log.resolved_at().map(|t| t.to_rfc3339()))
        .bind(log.resolved_by())
        .bind(log.resolution_notes())
        .bind(log.created_at().to_rfc3339())
        .bind(log.updated_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn get_conflict_log(
        &self,
        id: &ConflictLogId,
    ) -> anyhow::Result<Option<ConflictLog>> {
        let row = sqlx::query("SELECT * FROM conflict_logs WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        row.as_ref()
            .map(conflict_log_from_row)
            .transpose()
            .map_err(Into::into)
    }

    async fn update_conflict_log(&self, log: &ConflictLog) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE conflict_logs SET \
                 status = ?2, resolution = ?3, resolved_at = ?4, \
                 resolved_by = ?5, resolution_notes = ?6, updated_at = ?7 \
             WHERE id = ?1",
        )
        .bind(log.id().to_string())
        .bind(log.status().to_string())
        .bind(log.resolution())
        .bind(log.resolved_at().map(|t| t.to_rfc3339()))
        .bind(log.resolved_by())
        .bind(log.resolution_notes())
        .bind(log.updated_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            anyhow::bail!("no conflict log with id {}", log.id());
        }
        Ok(())
    }

    async fn list_conflict_logs(
        &self,
        organization_id: &OrganizationId,
        filter: &ConflictLogFilter,
    ) -> anyhow::Result<Vec<ConflictRecord>> {
        let rows = sqlx::query(
            "SELECT c.*, r.title AS resource_title, r.resource_type AS resource_kind \
             FROM conflict_logs c \
             LEFT JOIN resources r ON r.id = c.resource_id \
             WHERE c.organization_id = ?1 \
               AND (?2 IS NULL OR c.status = ?2) \
               AND (?3 IS NULL OR c.severity = ?3) \
             ORDER BY c.created_at DESC",
        )
        .bind(organization_id.to_string())
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.severity.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let log = conflict_log_from_row(row)?;
            let resource = match row.get::<Option<String>, _>("resource_title") {
                Some(title) => Some(ResourceRef {
                    id: *log.resource_id(),
                    title,
                    resource_type: row.get::<String, _>("resource_kind"),
                }),
                None => None,
            };
            records.push(ConflictRecord { log, resource });
        }
        Ok(records)
    }
}
