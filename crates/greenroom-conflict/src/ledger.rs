//! Conflict-log lifecycle operations
//!
//! The detector is the sole writer of conflict logs and the sole mutator
//! of their resolution fields. Unlike detection, these operations have
//! side effects; like detection, a store failure propagates to the
//! caller untouched by any retry or fallback.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use greenroom_core::domain::{
    ConflictData, ConflictLog, ConflictLogId, ConflictSeverity, ConflictStatus, ConflictType,
    OrganizationId, ResourceId,
};
use greenroom_core::ports::{ConflictLogFilter, ConflictRecord};

use crate::detector::ConflictDetector;
use crate::error::DetectorError;

/// Aggregated conflict counts for an organization
///
/// `open` and `resolved` count exactly those two statuses;
/// `investigating` and `ignored` logs appear only in `total` and in the
/// breakdown maps, which count every row regardless of status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictStats {
    pub total: u64,
    pub open: u64,
    pub resolved: u64,
    pub by_type: HashMap<ConflictType, u64>,
    pub by_severity: HashMap<ConflictSeverity, u64>,
}

impl ConflictDetector {
    /// Records a new open conflict log entry
    ///
    /// `severity` defaults to `Medium` when not given. The conflict kind
    /// is carried by the payload. No de-duplication is attempted: two
    /// calls for the same logical conflict create two rows, and callers
    /// that want one row per incident must dedupe themselves.
    pub async fn log_conflict(
        &self,
        organization_id: &OrganizationId,
        resource_id: &ResourceId,
        data: ConflictData,
        severity: Option<ConflictSeverity>,
    ) -> Result<ConflictLog, DetectorError> {
        let log = ConflictLog::new(
            *organization_id,
            *resource_id,
            data,
            severity.unwrap_or(ConflictSeverity::Medium),
        );
        self.repository().insert_conflict_log(&log).await?;

        info!(
            conflict_id = %log.id(),
            conflict_type = %log.conflict_type(),
            severity = %log.severity(),
            "Conflict recorded"
        );
        Ok(log)
    }

    /// Resolves an open or investigating conflict, stamping who and why
    ///
    /// # Errors
    ///
    /// [`DetectorError::LogNotFound`] if no log exists with the given ID;
    /// a domain error if the log is already resolved or ignored.
    pub async fn resolve_conflict(
        &self,
        conflict_id: &ConflictLogId,
        resolution: &str,
        resolved_by: &str,
        resolution_notes: Option<String>,
    ) -> Result<ConflictLog, DetectorError> {
        let mut log = self
            .repository()
            .get_conflict_log(conflict_id)
            .await?
            .ok_or(DetectorError::LogNotFound(*conflict_id))?;

        log.resolve(resolution, resolved_by, resolution_notes)?;
        self.repository().update_conflict_log(&log).await?;

        info!(
            conflict_id = %log.id(),
            resolution = resolution,
            resolved_by = resolved_by,
            "Conflict resolved"
        );
        Ok(log)
    }

    /// Lists an organization's conflict logs, newest-created first
    ///
    /// Each record carries the minimal identity of its resource for
    /// display; the optional filters narrow by status and/or severity.
    pub async fn get_conflicts(
        &self,
        organization_id: &OrganizationId,
        status: Option<ConflictStatus>,
        severity: Option<ConflictSeverity>,
    ) -> Result<Vec<ConflictRecord>, DetectorError> {
        let mut filter = ConflictLogFilter::new();
        if let Some(status) = status {
            filter = filter.with_status(status);
        }
        if let Some(severity) = severity {
            filter = filter.with_severity(severity);
        }

        Ok(self
            .repository()
            .list_conflict_logs(organization_id, &filter)
            .await?)
    }

    /// Computes conflict counts for an organization
    ///
    /// Fetches every log for the organization (no pagination) and counts
    /// in-process.
    pub async fn get_conflict_stats(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<ConflictStats, DetectorError> {
        let records = self
            .repository()
            .list_conflict_logs(organization_id, &ConflictLogFilter::new())
            .await?;

        let mut stats = ConflictStats {
            total: records.len() as u64,
            open: 0,
            resolved: 0,
            by_type: HashMap::new(),
            by_severity: HashMap::new(),
        };

        for record in &records {
            match record.log.status() {
                ConflictStatus::Open => stats.open += 1,
                ConflictStatus::Resolved => stats.resolved += 1,
                ConflictStatus::Investigating | ConflictStatus::Ignored => {}
            }
            *stats.by_type.entry(record.log.conflict_type()).or_insert(0) += 1;
            *stats
                .by_severity
                .entry(record.log.severity())
                .or_insert(0) += 1;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{FailingRepository, InMemoryRepository};
    use greenroom_core::domain::{Resource, UnavailableReason};
    use greenroom_core::ports::IBookingRepository;

    fn unavailable() -> ConflictData {
        ConflictData::ResourceUnavailable {
            reason: UnavailableReason::Inactive,
        }
    }

    #[tokio::test]
    async fn test_log_conflict_defaults_to_medium_open() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let org = OrganizationId::new();

        let log = detector
            .log_conflict(&org, &ResourceId::new(), unavailable(), None)
            .await
            .unwrap();

        assert_eq!(log.status(), ConflictStatus::Open);
        assert_eq!(log.severity(), ConflictSeverity::Medium);
        assert_eq!(log.conflict_type(), ConflictType::ResourceUnavailable);
    }

    #[tokio::test]
    async fn test_log_conflict_no_dedup() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let org = OrganizationId::new();
        let resource = ResourceId::new();

        let a = detector
            .log_conflict(&org, &resource, unavailable(), None)
            .await
            .unwrap();
        let b = detector
            .log_conflict(&org, &resource, unavailable(), None)
            .await
            .unwrap();

        assert_ne!(a.id(), b.id());
        let all = detector.get_conflicts(&org, None, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_through_resolution() {
        let repo = Arc::new(InMemoryRepository::new());
        let org = OrganizationId::new();
        let resource = Resource::new(org, "Studio A", "space", None);
        let resource_id = *resource.id();
        repo.save_resource(&resource).await.unwrap();
        let detector = ConflictDetector::new(repo);

        let log = detector
            .log_conflict(&org, &resource_id, unavailable(), Some(ConflictSeverity::High))
            .await
            .unwrap();

        // Appears under open, with the resource joined in.
        let open = detector
            .get_conflicts(&org, Some(ConflictStatus::Open), None)
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].log.id(), log.id());
        assert_eq!(open[0].resource.as_ref().unwrap().title, "Studio A");

        let resolved = detector
            .resolve_conflict(log.id(), "rebooked", "ops", Some("moved".to_string()))
            .await
            .unwrap();
        assert_eq!(resolved.status(), ConflictStatus::Resolved);
        assert_eq!(resolved.resolution(), Some("rebooked"));
        assert_eq!(resolved.resolved_by(), Some("ops"));
        assert!(resolved.resolved_at().is_some());

        // Moved out of open, into resolved.
        let open = detector
            .get_conflicts(&org, Some(ConflictStatus::Open), None)
            .await
            .unwrap();
        assert!(open.is_empty());
        let resolved_list = detector
            .get_conflicts(&org, Some(ConflictStatus::Resolved), None)
            .await
            .unwrap();
        assert_eq!(resolved_list.len(), 1);
        assert_eq!(
            resolved_list[0].log.resolution_notes(),
            Some("moved")
        );
    }

    #[tokio::test]
    async fn test_severity_filter() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let org = OrganizationId::new();
        let resource = ResourceId::new();

        detector
            .log_conflict(&org, &resource, unavailable(), Some(ConflictSeverity::High))
            .await
            .unwrap();
        detector
            .log_conflict(&org, &resource, unavailable(), Some(ConflictSeverity::Low))
            .await
            .unwrap();

        let high = detector
            .get_conflicts(&org, None, Some(ConflictSeverity::High))
            .await
            .unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].log.severity(), ConflictSeverity::High);
    }

    #[tokio::test]
    async fn test_conflicts_scoped_to_organization() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let org_a = OrganizationId::new();
        let org_b = OrganizationId::new();

        detector
            .log_conflict(&org_a, &ResourceId::new(), unavailable(), None)
            .await
            .unwrap();

        assert_eq!(detector.get_conflicts(&org_a, None, None).await.unwrap().len(), 1);
        assert!(detector.get_conflicts(&org_b, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_missing_log_is_not_found() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let missing = ConflictLogId::new();

        let result = detector.resolve_conflict(&missing, "x", "ops", None).await;

        match result {
            Err(DetectorError::LogNotFound(id)) => assert_eq!(id, missing),
            other => panic!("expected LogNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_twice_is_domain_error() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let org = OrganizationId::new();

        let log = detector
            .log_conflict(&org, &ResourceId::new(), unavailable(), None)
            .await
            .unwrap();
        detector
            .resolve_conflict(log.id(), "rebooked", "ops", None)
            .await
            .unwrap();

        let result = detector
            .resolve_conflict(log.id(), "again", "ops", None)
            .await;
        assert!(matches!(result, Err(DetectorError::Domain(_))));
    }

    #[tokio::test]
    async fn test_stats_buckets() {
        let detector = ConflictDetector::new(Arc::new(InMemoryRepository::new()));
        let org = OrganizationId::new();
        let resource = ResourceId::new();

        // Two open, one resolved, one ignored.
        detector
            .log_conflict(&org, &resource, unavailable(), Some(ConflictSeverity::High))
            .await
            .unwrap();
        detector
            .log_conflict(
                &org,
                &resource,
                ConflictData::CapacityExceeded {
                    current_load: 6,
                    capacity: 5,
                },
                None,
            )
            .await
            .unwrap();
        let resolved = detector
            .log_conflict(&org, &resource, unavailable(), None)
            .await
            .unwrap();
        detector
            .resolve_conflict(resolved.id(), "rebooked", "ops", None)
            .await
            .unwrap();
        let ignored = detector
            .log_conflict(&org, &resource, unavailable(), None)
            .await
            .unwrap();
        {
            // Flip the fourth log to ignored through the entity, the way
            // an admin flow would.
            let repo = detector.repository();
            let mut log = repo.get_conflict_log(ignored.id()).await.unwrap().unwrap();
            log.ignore("ops").unwrap();
            repo.update_conflict_log(&log).await.unwrap();
        }

        let stats = detector.get_conflict_stats(&org).await.unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.open, 2);
        assert_eq!(stats.resolved, 1);
        // Ignored counts only toward total and the breakdowns.
        assert_eq!(
            stats.by_type[&ConflictType::ResourceUnavailable],
            3
        );
        assert_eq!(stats.by_type[&ConflictType::CapacityExceeded], 1);
        assert_eq!(stats.by_severity[&ConflictSeverity::Medium], 3);
        assert_eq!(stats.by_severity[&ConflictSeverity::High], 1);
        assert_eq!(stats.by_type.values().sum::<u64>(), stats.total);
        assert_eq!(stats.by_severity.values().sum::<u64>(), stats.total);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let detector = ConflictDetector::new(Arc::new(FailingRepository));
        let org = OrganizationId::new();

        let result = detector
            .log_conflict(&org, &ResourceId::new(), unavailable(), None)
            .await;
        assert!(matches!(result, Err(DetectorError::Storage(_))));

        let result = detector.get_conflict_stats(&org).await;
        assert!(matches!(result, Err(DetectorError::Storage(_))));
    }
}
