//! Condition-based pricing: intake normalization, the scoring policy, the valuation
//! engine, and the adjusters and side models layered on top of it.

mod engine;
mod explain;
pub mod intake;
mod photo;
pub mod policy;
pub mod profile;
pub mod rehab;
pub mod rental;

#[cfg(test)]
mod tests;

pub use explain::format_currency;
pub use intake::{IntakeAnswers, IntakeSubmission, LegacyIntakeAnswers, VersionedIntake};
pub use policy::{PolicyError, PursueScoring, ScoringPolicy};
pub use profile::{
    ConditionProfile, FinishCondition, FoundationCondition, LifespanCondition, Motivation,
    Occupancy, OverallCondition, SystemCondition, Timeline,
};
pub use rehab::{compute_sqft_model_offer, RehabTier, SqftModelOffer};
pub use rental::{
    compute_rent_spread, management_expense, resolve_management_pct, ManagementMode,
    RentSpread, RentalAssumptions,
};

use serde::{Deserialize, Serialize};

/// Stateless pricing engine over an injected [`ScoringPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    policy: ScoringPolicy,
}

impl ValuationEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn standard() -> Self {
        Self::new(ScoringPolicy::standard())
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Turns a baseline market value and a typed condition profile into an offer band.
    ///
    /// Total over its inputs: unknown answers take the policy's fallback weights and a
    /// non-finite or negative baseline is treated as zero.
    pub fn compute(&self, baseline: f64, profile: &ConditionProfile) -> Valuation {
        engine::compute_valuation(baseline, profile, &self.policy)
    }

    pub fn compute_answers(&self, baseline: f64, answers: &IntakeAnswers) -> Valuation {
        self.compute(baseline, &ConditionProfile::from(answers))
    }
}

/// Scored line item behind one explanation bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationFactor {
    OverallCondition,
    Kitchen,
    Bathrooms,
    BathCount,
    Roof,
    Mechanicals,
    Occupancy,
    WaterIntrusion,
    Electrical,
    Plumbing,
    Foundation,
}

impl ValuationFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OverallCondition => "Overall condition",
            Self::Kitchen => "Kitchen",
            Self::Bathrooms => "Bathrooms",
            Self::BathCount => "Bath count",
            Self::Roof => "Roof",
            Self::Mechanicals => "Mechanicals",
            Self::Occupancy => "Occupancy",
            Self::WaterIntrusion => "Water intrusion",
            Self::Electrical => "Electrical",
            Self::Plumbing => "Plumbing",
            Self::Foundation => "Foundation",
        }
    }
}

/// Discrete contribution to a valuation, kept for audits.
///
/// Percentage factors carry `penalty`; big-ticket systems carry `spread_pct` and `repairs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyComponent {
    pub factor: ValuationFactor,
    pub rating: String,
    pub penalty: f64,
    pub dollar_impact: f64,
    pub spread_pct: f64,
    pub repairs: f64,
}

/// Engine output. Offers and the listing benchmark are whole dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub baseline_market_value: f64,
    pub cash_offer_low: u64,
    pub cash_offer_high: u64,
    pub confidence: f64,
    pub pursue_score: u8,
    pub listing_net_estimate: u64,
    pub explanation_bullets: Vec<String>,
    #[serde(default)]
    pub components: Vec<PenaltyComponent>,
}

impl Valuation {
    /// Scales both offer bounds by `1 + bump`, keeping them whole, non-negative and ordered.
    pub(crate) fn scale_offers(&mut self, bump: f64) {
        let factor = (1.0 + bump).max(0.0);
        let low = engine::whole_dollars(self.cash_offer_low as f64 * factor);
        let high = engine::whole_dollars(self.cash_offer_high as f64 * factor);
        self.cash_offer_low = low.min(high);
        self.cash_offer_high = high.max(low);
    }

    pub(crate) fn nudge_pursue(&mut self, points: f64) {
        if !points.is_finite() {
            return;
        }
        let nudged = (f64::from(self.pursue_score) + points).round();
        self.pursue_score = nudged.clamp(0.0, 100.0) as u8;
    }

    /// Raises confidence by `gain` up to `cap`; never lowers it.
    pub(crate) fn raise_confidence(&mut self, gain: f64, cap: f64) {
        let current = self.confidence;
        let raised = (current + gain.max(0.0)).min(cap).max(current);
        self.confidence = engine::round_confidence(raised);
    }
}
