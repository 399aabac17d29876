//! Lead intake: validation, storage through the repository seam, photo registration,
//! photo-driven revaluation, retention, and the HTTP surface over all of it.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Lead, LeadDetailView, LeadId, LeadRecord, LeadSubmission, LeadSummaryView, LeadUpdate,
    NewPhoto, PhotoAnalysisOutcome, PhotoRecord, PropertyAddress, QuoteRequest, QuoteResponse,
    SellerContact, SqftOfferRequest,
};
pub use import::{ImportedLead, LeadImportError, LeadImporter};
pub use repository::{LeadRepository, RecordChange, RepositoryError};
pub use router::lead_router;
pub use service::{
    ContentTypeGuesser, LeadIntakeService, LeadServiceError, ValidationError,
    DEFAULT_RETENTION_DAYS, PHOTO_SAMPLE_LIMIT,
};
