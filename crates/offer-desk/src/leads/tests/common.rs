use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::leads::domain::{LeadId, LeadRecord, LeadSubmission, NewPhoto};
use crate::leads::repository::{LeadRepository, RecordChange, RepositoryError};
use crate::leads::{lead_router, LeadIntakeService};
use crate::photos::{VisionAnalyzer, VisionError};
use crate::valuation::{IntakeAnswers, IntakeSubmission, RentalAssumptions, ValuationEngine};

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn intake() -> IntakeAnswers {
    IntakeAnswers {
        occupancy: "vacant".to_string(),
        timeline: "soon".to_string(),
        motivation: "medium".to_string(),
        condition_overall: "standard".to_string(),
        kitchen_condition: "average".to_string(),
        bathrooms_condition: "average".to_string(),
        roof_condition: "average".to_string(),
        mechanicals_condition: "average".to_string(),
        electrical: "updated".to_string(),
        plumbing: "serviceable".to_string(),
        foundation: "good".to_string(),
        water_issues: "no".to_string(),
        square_feet: Some(1800.0),
        beds: Some(3.0),
        baths: Some(2.0),
        rehab_price_model_tier: Some("mid_rehab".to_string()),
        ..IntakeAnswers::default()
    }
}

pub(super) fn submission() -> LeadSubmission {
    LeadSubmission {
        street: " 1418 Grand Ave ".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50309".to_string(),
        seller_name: Some("Jordan Reyes".to_string()),
        seller_phone: Some("515-555-0142".to_string()),
        seller_email: None,
        created_by: Some("acq-desk".to_string()),
        baseline_market_value: Some(200_000.0),
        intake: IntakeSubmission::Current(intake()),
        rental: None,
    }
}

pub(super) fn rental() -> RentalAssumptions {
    RentalAssumptions {
        current_rent: Some(1400.0),
        market_rent: Some(2000.0),
        ..RentalAssumptions::default()
    }
}

pub(super) fn jpeg(name: &str) -> NewPhoto {
    NewPhoto {
        file_name: name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        size_bytes: 48_213,
        storage_path: None,
    }
}

pub(super) fn build_service() -> (LeadIntakeService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LeadIntakeService::new(repository.clone(), ValuationEngine::standard());
    (service, repository)
}

pub(super) fn create_lead(service: &LeadIntakeService<MemoryRepository>) -> LeadId {
    service
        .create_at(submission(), submitted_at())
        .expect("lead stored")
        .lead
        .id
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl LeadRepository for MemoryRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.lead.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead.id.clone(), record.clone());
        Ok(record)
    }

    fn modify(&self, id: &LeadId, change: RecordChange<'_>) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut next = stored.clone();
        change(&mut next)?;
        *stored = next.clone();
        Ok(next)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<LeadRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.lead
                .created_at
                .cmp(&a.lead.created_at)
                .then_with(|| b.lead.id.cmp(&a.lead.id))
        });
        records.truncate(limit);
        Ok(records)
    }

    fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.len();
        guard.retain(|_, record| record.lead.created_at >= cutoff);
        Ok(before - guard.len())
    }
}

pub(super) struct UnavailableRepository;

impl LeadRepository for UnavailableRepository {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify(&self, _id: &LeadId, _change: RecordChange<'_>) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_created_before(&self, _cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct ConflictRepository;

impl LeadRepository for ConflictRepository {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn modify(&self, _id: &LeadId, _change: RecordChange<'_>) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete_created_before(&self, _cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        Ok(0)
    }
}

/// Holds each write at a barrier so concurrent requests reach the store together.
pub(super) struct LockstepRepository {
    pub(super) inner: MemoryRepository,
    barrier: Barrier,
}

impl LockstepRepository {
    pub(super) fn new(writers: usize) -> Self {
        Self {
            inner: MemoryRepository::default(),
            barrier: Barrier::new(writers),
        }
    }
}

impl LeadRepository for LockstepRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn modify(&self, id: &LeadId, change: RecordChange<'_>) -> Result<LeadRecord, RepositoryError> {
        self.barrier.wait();
        self.inner.modify(id, change)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        self.inner.list(limit)
    }

    fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        self.inner.delete_created_before(cutoff)
    }
}

/// Vision stub that edits the lead's kitchen answer while the model is "thinking".
pub(super) struct EditingVision {
    pub(super) repository: Arc<MemoryRepository>,
    pub(super) lead: LeadId,
}

impl VisionAnalyzer for EditingVision {
    fn model(&self) -> &str {
        "stub-vision-1"
    }

    fn analyze(&self, _image_refs: &[String]) -> Result<Option<String>, VisionError> {
        self.repository
            .modify(&self.lead, &mut |record| {
                record.intake.kitchen_condition = "needs_replaced".to_string();
                Ok(())
            })
            .map_err(|err| VisionError::Transport(err.to_string()))?;
        Ok(Some(
            r#"{"conditionScore": 80, "confidence": 0.9, "observedKitchen": "updated"}"#
                .to_string(),
        ))
    }
}

/// Vision stub that always reports a confident, dated kitchen.
pub(super) struct DatedKitchenVision;

impl VisionAnalyzer for DatedKitchenVision {
    fn model(&self) -> &str {
        "stub-vision-1"
    }

    fn analyze(&self, image_refs: &[String]) -> Result<Option<String>, VisionError> {
        Ok(Some(format!(
            r#"{{"conditionScore": 60, "confidence": 0.9, "observedKitchen": "dated",
                "observedOverall": "unknown", "observedWaterIssues": "unknown",
                "observedSystemRisk": "none", "observations": ["{} photos looked at"]}}"#,
            image_refs.len()
        )))
    }
}

pub(super) struct OfflineVision;

impl VisionAnalyzer for OfflineVision {
    fn model(&self) -> &str {
        "stub-vision-1"
    }

    fn analyze(&self, _image_refs: &[String]) -> Result<Option<String>, VisionError> {
        Err(VisionError::Transport("connection reset".to_string()))
    }
}

pub(super) fn lead_router_with_service(
    service: LeadIntakeService<MemoryRepository>,
) -> axum::Router {
    lead_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
