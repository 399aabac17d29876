use serde::{Deserialize, Deserializer, Serialize};

use super::explain::{format_currency, whole_percent};
use super::intake::{lenient_number, lenient_text};
use super::policy::{PursueScoring, RentGapAdjustment};
use super::profile::normalize_key;
use super::{Valuation, ValuationEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementMode {
    #[default]
    #[serde(rename = "self")]
    SelfManaged,
    ThirdParty,
}

impl ManagementMode {
    /// Anything other than a third-party answer is treated as self-managed.
    pub fn from_key(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "third_party" | "thirdparty" | "property_manager" | "pm" => Self::ThirdParty,
            _ => Self::SelfManaged,
        }
    }
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<ManagementMode, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ManagementMode::from_key(&lenient_text(deserializer)?))
}

/// Optional per-lead rental economics. `mgmt_pct` is a whole percent (e.g. `8` for 8%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalAssumptions {
    #[serde(deserialize_with = "lenient_number")]
    pub current_rent: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub market_rent: Option<f64>,
    #[serde(deserialize_with = "lenient_mode")]
    pub mgmt_mode: ManagementMode,
    #[serde(deserialize_with = "lenient_number")]
    pub mgmt_pct: Option<f64>,
}

/// Management fee as a fraction of rent: explicit override, else the mode default.
pub fn resolve_management_pct(assumptions: &RentalAssumptions) -> f64 {
    if let Some(pct) = assumptions.mgmt_pct.filter(|pct| pct.is_finite()) {
        return pct / 100.0;
    }
    match assumptions.mgmt_mode {
        ManagementMode::ThirdParty => 0.1,
        ManagementMode::SelfManaged => 0.02,
    }
}

pub fn management_expense(annual_rent: f64, assumptions: &RentalAssumptions) -> f64 {
    annual_rent * resolve_management_pct(assumptions)
}

/// Clamped rent gap and the offer bump derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentSpread {
    pub current_rent: f64,
    pub market_rent: f64,
    /// `(market - current) / market`, clamped.
    pub ratio: f64,
    /// Relative change applied to both offer bounds, clamped again.
    pub bump: f64,
}

/// `None` unless both rents are known, finite, and the market rent is positive.
pub fn compute_rent_spread(
    assumptions: &RentalAssumptions,
    adjustment: &RentGapAdjustment,
) -> Option<RentSpread> {
    let current_rent = assumptions
        .current_rent
        .filter(|rent| rent.is_finite() && *rent >= 0.0)?;
    let market_rent = assumptions
        .market_rent
        .filter(|rent| rent.is_finite() && *rent > 0.0)?;

    let ratio = ((market_rent - current_rent) / market_rent)
        .clamp(-adjustment.ratio_clamp, adjustment.ratio_clamp);
    let bump = (ratio * adjustment.bump_scale).clamp(-adjustment.bump_cap, adjustment.bump_cap);

    Some(RentSpread {
        current_rent,
        market_rent,
        ratio,
        bump,
    })
}

impl ValuationEngine {
    /// Moves the offer band by the capped rent-gap bump. Without usable rents the
    /// valuation is returned unchanged.
    pub fn apply_rent_gap(&self, valuation: &Valuation, assumptions: &RentalAssumptions) -> Valuation {
        let adjustment = &self.policy().rent_gap;
        let Some(spread) = compute_rent_spread(assumptions, adjustment) else {
            return valuation.clone();
        };

        let mut adjusted = valuation.clone();
        adjusted.scale_offers(spread.bump);
        if matches!(self.policy().pursue, PursueScoring::Heuristic(_)) {
            adjusted.nudge_pursue(spread.ratio * adjustment.pursue_gain);
        }
        adjusted.raise_confidence(adjustment.confidence_gain, self.policy().confidence.cap);
        adjusted.explanation_bullets.push(format!(
            "Rent gap: current {} vs market {} ({}% gap) moved the range by {:+.1}%.",
            format_currency(spread.current_rent),
            format_currency(spread.market_rent),
            whole_percent(spread.ratio),
            spread.bump * 100.0
        ));
        adjusted
    }
}
