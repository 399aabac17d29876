use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::photos::{AnalysisMode, PhotoAnalysisResult, PhotoRevaluation};
use crate::valuation::intake::{lenient_number, lenient_optional_text, lenient_text};
use crate::valuation::{
    compute_sqft_model_offer, IntakeAnswers, IntakeSubmission, RehabTier, RentalAssumptions,
    SqftModelOffer, Valuation,
};

/// Identifier wrapper for stored leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl PropertyAddress {
    pub fn one_line(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Seller lead as captured by the intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub address: PropertyAddress,
    pub seller: SellerContact,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted when a lead is created. Text fields are trimmed before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadSubmission {
    #[serde(deserialize_with = "lenient_text")]
    pub street: String,
    #[serde(deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(deserialize_with = "lenient_text")]
    pub state: String,
    #[serde(deserialize_with = "lenient_text")]
    pub zip: String,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub seller_name: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub seller_phone: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub seller_email: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub created_by: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub baseline_market_value: Option<f64>,
    pub intake: IntakeSubmission,
    pub rental: Option<RentalAssumptions>,
}

/// Edit payload. The valuation is recomputed from scratch with whatever is supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadUpdate {
    #[serde(deserialize_with = "lenient_number")]
    pub baseline_market_value: Option<f64>,
    pub intake: Option<IntakeSubmission>,
    pub rental: Option<RentalAssumptions>,
}

/// Photo metadata registered after the file lands in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub size_bytes: u64,
    #[serde(default)]
    pub storage_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    pub file_name: String,
    pub storage_path: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Repository aggregate: the lead plus everything scored against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead: Lead,
    pub baseline_market_value: f64,
    pub intake: IntakeAnswers,
    pub rental: Option<RentalAssumptions>,
    pub valuation: Valuation,
    pub photos: Vec<PhotoRecord>,
    pub photo_analysis: Option<PhotoAnalysisResult>,
}

impl LeadRecord {
    pub fn rehab_tier(&self) -> RehabTier {
        RehabTier::from_key(self.intake.rehab_price_model_tier.as_deref())
    }

    /// Side-by-side rehab model offer using the baseline as the after-repair value.
    pub fn sqft_model(&self) -> SqftModelOffer {
        compute_sqft_model_offer(
            self.baseline_market_value,
            self.intake.square_feet,
            self.rehab_tier(),
        )
    }

    pub fn summary_view(&self) -> LeadSummaryView {
        LeadSummaryView {
            lead_id: self.lead.id.clone(),
            address: self.lead.address.one_line(),
            cash_offer_low: self.valuation.cash_offer_low,
            cash_offer_high: self.valuation.cash_offer_high,
            pursue_score: self.valuation.pursue_score,
            confidence: self.valuation.confidence,
            photo_count: self.photos.len(),
            created_at: self.lead.created_at,
        }
    }

    pub fn detail_view(&self) -> LeadDetailView {
        LeadDetailView {
            lead: self.lead.clone(),
            baseline_market_value: self.baseline_market_value,
            intake: self.intake.clone(),
            rental: self.rental.clone(),
            valuation: self.valuation.clone(),
            sqft_model: self.sqft_model(),
            photos: self.photos.clone(),
            photo_analysis: self.photo_analysis.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadSummaryView {
    pub lead_id: LeadId,
    pub address: String,
    pub cash_offer_low: u64,
    pub cash_offer_high: u64,
    pub pursue_score: u8,
    pub confidence: f64,
    pub photo_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadDetailView {
    pub lead: Lead,
    pub baseline_market_value: f64,
    pub intake: IntakeAnswers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental: Option<RentalAssumptions>,
    pub valuation: Valuation,
    pub sqft_model: SqftModelOffer,
    pub photos: Vec<PhotoRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_analysis: Option<PhotoAnalysisResult>,
}

/// Response body for a photo analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoAnalysisOutcome {
    pub lead_id: LeadId,
    pub mode: AnalysisMode,
    pub analysis: PhotoAnalysisResult,
    pub overrides_applied: Vec<String>,
    pub valuation: Valuation,
}

impl PhotoAnalysisOutcome {
    pub(crate) fn from_revaluation(lead_id: LeadId, revaluation: PhotoRevaluation) -> Self {
        Self {
            lead_id,
            mode: revaluation.analysis.mode(),
            analysis: revaluation.analysis,
            overrides_applied: revaluation.overrides_applied,
            valuation: revaluation.valuation,
        }
    }
}

/// Stateless pricing request that stores nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRequest {
    #[serde(deserialize_with = "lenient_number")]
    pub baseline_market_value: Option<f64>,
    pub intake: IntakeSubmission,
    pub rental: Option<RentalAssumptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub valuation: Valuation,
    pub sqft_model: SqftModelOffer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqftOfferRequest {
    #[serde(deserialize_with = "lenient_number")]
    pub arv: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub square_feet: Option<f64>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub tier: Option<String>,
}
