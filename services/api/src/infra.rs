use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use offer_desk::config::ValuationConfig;
use offer_desk::error::AppError;
use offer_desk::leads::{
    LeadId, LeadIntakeService, LeadRecord, LeadRepository, RecordChange, RepositoryError,
};
use offer_desk::valuation::ValuationEngine;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local lead store backing the service and the CLI commands.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl InMemoryLeadRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<LeadId, LeadRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead store lock poisoned".to_string()))
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.lead.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead.id.clone(), record.clone());
        Ok(record)
    }

    fn modify(&self, id: &LeadId, change: RecordChange<'_>) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.guard()?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut next = stored.clone();
        change(&mut next)?;
        *stored = next.clone();
        Ok(next)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = self.guard()?;
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
        let mut guard = self.guard()?;
        let before = guard.len();
        guard.retain(|_, record| record.lead.created_at >= cutoff);
        Ok(before - guard.len())
    }
}

pub(crate) fn guess_content_type(file_name: &str) -> Option<mime_guess::mime::Mime> {
    mime_guess::from_path(file_name).first()
}

pub(crate) fn build_lead_service(
    valuation: &ValuationConfig,
) -> Result<LeadIntakeService<InMemoryLeadRepository>, AppError> {
    let engine = ValuationEngine::new(valuation.load_policy()?);
    Ok(LeadIntakeService::new(
        Arc::new(InMemoryLeadRepository::default()),
        engine,
    )
    .with_retention_days(valuation.retention_days)
    .with_content_type_guesser(guess_content_type))
}
