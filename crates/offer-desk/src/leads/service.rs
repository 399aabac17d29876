use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::domain::{
    Lead, LeadId, LeadRecord, LeadSubmission, LeadUpdate, NewPhoto, PhotoAnalysisOutcome,
    PhotoRecord, PropertyAddress, QuoteRequest, QuoteResponse, SellerContact, SqftOfferRequest,
};
use super::repository::{LeadRepository, RepositoryError};
use crate::photos::{analyze_photos, revalue_with_photos, VisionAnalyzer};
use crate::valuation::{
    compute_sqft_model_offer, ConditionProfile, IntakeAnswers, RehabTier, RentalAssumptions,
    SqftModelOffer, Valuation, ValuationEngine,
};

/// Most recent photos handed to the analyzer per run.
pub const PHOTO_SAMPLE_LIMIT: usize = 10;
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Maps a file name to a content type when the upload did not declare one.
pub type ContentTypeGuesser = fn(&str) -> Option<mime::Mime>;

/// Service composing the repository, the valuation engine, and the optional vision model.
pub struct LeadIntakeService<R> {
    repository: Arc<R>,
    engine: Arc<ValuationEngine>,
    vision: Option<Arc<dyn VisionAnalyzer>>,
    retention: Duration,
    guess_content_type: Option<ContentTypeGuesser>,
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PHOTO_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

fn next_photo_id() -> String {
    let id = PHOTO_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("photo-{id:06}")
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn require_baseline(value: Option<f64>) -> Result<f64, ValidationError> {
    value
        .filter(|baseline| baseline.is_finite() && *baseline > 0.0)
        .ok_or(ValidationError::MissingBaseline)
}

fn is_usable_image(photo: &PhotoRecord) -> bool {
    photo.size_bytes > 0
        && photo
            .content_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.type_() == mime::IMAGE)
            .unwrap_or(false)
}

impl<R> LeadIntakeService<R>
where
    R: LeadRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: ValuationEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
            vision: None,
            retention: Duration::days(i64::from(DEFAULT_RETENTION_DAYS)),
            guess_content_type: None,
        }
    }

    pub fn with_vision(mut self, analyzer: Arc<dyn VisionAnalyzer>) -> Self {
        self.vision = Some(analyzer);
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention = Duration::days(i64::from(days));
        self
    }

    pub fn with_content_type_guesser(mut self, guesser: ContentTypeGuesser) -> Self {
        self.guess_content_type = Some(guesser);
        self
    }

    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    fn price(
        &self,
        baseline: f64,
        intake: &IntakeAnswers,
        rental: Option<&RentalAssumptions>,
    ) -> Valuation {
        let valuation = self.engine.compute_answers(baseline, intake);
        match rental {
            Some(rental) => self.engine.apply_rent_gap(&valuation, rental),
            None => valuation,
        }
    }

    /// Validate and store a new lead with its first valuation.
    pub fn create(&self, submission: LeadSubmission) -> Result<LeadRecord, LeadServiceError> {
        self.create_at(submission, Utc::now())
    }

    pub(crate) fn create_at(
        &self,
        submission: LeadSubmission,
        now: DateTime<Utc>,
    ) -> Result<LeadRecord, LeadServiceError> {
        let address = PropertyAddress {
            street: trimmed(&submission.street),
            city: trimmed(&submission.city),
            state: trimmed(&submission.state),
            zip: trimmed(&submission.zip),
        };
        let missing: Vec<&str> = [
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("zip", &address.zip),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingAddress(missing.join(", ")).into());
        }
        let baseline = require_baseline(submission.baseline_market_value)?;

        let intake = submission.intake.into_current();
        let valuation = self.price(baseline, &intake, submission.rental.as_ref());

        let record = LeadRecord {
            lead: Lead {
                id: next_lead_id(),
                address,
                seller: SellerContact {
                    name: submission.seller_name,
                    phone: submission.seller_phone,
                    email: submission.seller_email,
                },
                created_by: submission.created_by,
                created_at: now,
            },
            baseline_market_value: baseline,
            intake,
            rental: submission.rental,
            valuation,
            photos: Vec::new(),
            photo_analysis: None,
        };

        let stored = self.repository.insert(record)?;
        info!(
            lead_id = %stored.lead.id,
            cash_offer_low = stored.valuation.cash_offer_low,
            cash_offer_high = stored.valuation.cash_offer_high,
            pursue_score = stored.valuation.pursue_score,
            "lead created"
        );
        Ok(stored)
    }

    /// Apply an edit and recompute the valuation from scratch.
    ///
    /// A stored photo analysis no longer matches the edited answers and is cleared.
    pub fn update(&self, id: &LeadId, update: LeadUpdate) -> Result<LeadRecord, LeadServiceError> {
        let baseline = match update.baseline_market_value {
            Some(baseline) => Some(require_baseline(Some(baseline))?),
            None => None,
        };
        let intake = update.intake.map(|intake| intake.into_current());
        let rental = update.rental;

        let record = self.repository.modify(id, &mut |record| {
            if let Some(baseline) = baseline {
                record.baseline_market_value = baseline;
            }
            if let Some(intake) = &intake {
                record.intake = intake.clone();
            }
            if let Some(rental) = &rental {
                record.rental = Some(rental.clone());
            }
            record.valuation = self.price(
                record.baseline_market_value,
                &record.intake,
                record.rental.as_ref(),
            );
            record.photo_analysis = None;
            Ok(())
        })?;
        info!(lead_id = %id, "valuation recomputed after edit");
        Ok(record)
    }

    pub fn get(&self, id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self, limit: usize) -> Result<Vec<LeadRecord>, LeadServiceError> {
        Ok(self.repository.list(limit)?)
    }

    /// Register an uploaded photo. Only non-empty image files are accepted.
    pub fn add_photo(&self, id: &LeadId, photo: NewPhoto) -> Result<PhotoRecord, LeadServiceError> {
        self.add_photo_at(id, photo, Utc::now())
    }

    pub(crate) fn add_photo_at(
        &self,
        id: &LeadId,
        photo: NewPhoto,
        now: DateTime<Utc>,
    ) -> Result<PhotoRecord, LeadServiceError> {
        let file_name = photo.file_name.trim().to_string();
        let unsupported = |reason: &str| ValidationError::UnsupportedPhoto {
            file_name: file_name.clone(),
            reason: reason.to_string(),
        };
        if file_name.is_empty() {
            return Err(unsupported("file name is empty").into());
        }
        if photo.size_bytes == 0 {
            return Err(unsupported("file is empty").into());
        }

        let declared = photo
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse::<mime::Mime>().ok());
        let content_type = declared
            .or_else(|| self.guess_content_type.and_then(|guess| guess(&file_name)))
            .ok_or_else(|| unsupported("content type is unknown"))?;
        if content_type.type_() != mime::IMAGE {
            return Err(unsupported(&format!("{content_type} is not an image")).into());
        }

        let photo_id = next_photo_id();
        let storage_path = photo
            .storage_path
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| format!("{}/{}-{}", id, photo_id, file_name));

        let stored = PhotoRecord {
            id: photo_id,
            file_name,
            storage_path,
            content_type: content_type.essence_str().to_string(),
            size_bytes: photo.size_bytes,
            uploaded_at: now,
        };
        self.repository.modify(id, &mut |record| {
            record.photos.push(stored.clone());
            Ok(())
        })?;
        debug!(lead_id = %id, photo_id = %stored.id, "photo registered");
        Ok(stored)
    }

    /// Analyze the most recent photos and fold the result into the lead's valuation.
    ///
    /// The vision call runs outside the store; if the lead's pricing inputs are edited
    /// meanwhile, nothing is written and the call fails with [`RepositoryError::Stale`].
    pub fn analyze_photos(&self, id: &LeadId) -> Result<PhotoAnalysisOutcome, LeadServiceError> {
        let record = self.get(id)?;
        if record.photos.is_empty() {
            return Err(ValidationError::NoPhotos.into());
        }

        let mut recent: Vec<&PhotoRecord> = record.photos.iter().collect();
        recent.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let image_refs: Vec<String> = recent
            .into_iter()
            .take(PHOTO_SAMPLE_LIMIT)
            .filter(|photo| is_usable_image(photo))
            .map(|photo| photo.storage_path.clone())
            .collect();

        let analysis = analyze_photos(self.vision.as_deref(), &image_refs, record.photos.len());
        let profile = ConditionProfile::from(&record.intake);
        let revaluation = revalue_with_photos(
            &self.engine,
            record.baseline_market_value,
            &profile,
            record.rental.as_ref(),
            analysis,
        );

        self.repository.modify(id, &mut |stored| {
            let inputs_unchanged = stored.baseline_market_value == record.baseline_market_value
                && stored.intake == record.intake
                && stored.rental == record.rental;
            if !inputs_unchanged {
                return Err(RepositoryError::Stale);
            }
            stored.valuation = revaluation.valuation.clone();
            stored.photo_analysis = Some(revaluation.analysis.clone());
            Ok(())
        })?;

        let outcome = PhotoAnalysisOutcome::from_revaluation(id.clone(), revaluation);
        info!(
            lead_id = %id,
            mode = ?outcome.mode,
            condition_score = outcome.analysis.condition_score,
            overrides = outcome.overrides_applied.len(),
            "photo analysis applied"
        );
        Ok(outcome)
    }

    /// Drop leads older than the retention window.
    ///
    /// A window reaching past the earliest representable timestamp expires nothing.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, LeadServiceError> {
        let Some(cutoff) = now.checked_sub_signed(self.retention) else {
            debug!(
                retention_days = self.retention.num_days(),
                "retention window exceeds calendar range"
            );
            return Ok(0);
        };
        let removed = self.repository.delete_created_before(cutoff)?;
        if removed > 0 {
            info!(removed, %cutoff, "expired leads purged");
        }
        Ok(removed)
    }

    /// Price a set of answers without storing anything.
    pub fn quote(&self, request: QuoteRequest) -> Result<QuoteResponse, ValidationError> {
        let baseline = require_baseline(request.baseline_market_value)?;
        let intake = request.intake.into_current();
        let valuation = self.price(baseline, &intake, request.rental.as_ref());
        let sqft_model = compute_sqft_model_offer(
            baseline,
            intake.square_feet,
            RehabTier::from_key(intake.rehab_price_model_tier.as_deref()),
        );
        Ok(QuoteResponse {
            valuation,
            sqft_model,
        })
    }

    pub fn sqft_offer(&self, request: SqftOfferRequest) -> Result<SqftModelOffer, ValidationError> {
        let arv = request
            .arv
            .filter(|arv| arv.is_finite() && *arv > 0.0)
            .ok_or(ValidationError::InvalidArv)?;
        Ok(compute_sqft_model_offer(
            arv,
            request.square_feet,
            RehabTier::from_key(request.tier.as_deref()),
        ))
    }
}

/// Input rejected before the engine runs.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("missing lead address fields: {0}")]
    MissingAddress(String),
    #[error("baseline market value is required")]
    MissingBaseline,
    #[error("after-repair value must be a positive amount")]
    InvalidArv,
    #[error("no photos found for this lead")]
    NoPhotos,
    #[error("unsupported photo {file_name}: {reason}")]
    UnsupportedPhoto { file_name: String, reason: String },
}

/// Error raised by the lead intake service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
