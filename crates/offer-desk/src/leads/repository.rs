use chrono::{DateTime, Utc};

use super::domain::{LeadId, LeadRecord};

/// Edit applied to a stored lead inside [`LeadRepository::modify`].
pub type RecordChange<'a> = &'a mut dyn FnMut(&mut LeadRecord) -> Result<(), RepositoryError>;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError>;
    /// Read-modify-write of one lead, atomic with respect to every other write.
    ///
    /// When `change` fails the stored record is left untouched.
    fn modify(&self, id: &LeadId, change: RecordChange<'_>) -> Result<LeadRecord, RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError>;
    /// Newest leads first.
    fn list(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError>;
    /// Removes leads created strictly before `cutoff`, returning how many were dropped.
    fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record changed while the request was in flight")]
    Stale,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
