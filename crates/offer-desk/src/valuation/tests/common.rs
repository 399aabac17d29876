use crate::valuation::{
    ConditionProfile, IntakeAnswers, RentalAssumptions, Valuation, ValuationEngine,
};

pub(super) const BASELINE: f64 = 200_000.0;

pub(super) fn engine() -> ValuationEngine {
    ValuationEngine::standard()
}

/// Mid-grade vacant house with updated systems and 1,800 sf.
pub(super) fn standard_answers() -> IntakeAnswers {
    IntakeAnswers {
        occupancy: "vacant".to_string(),
        condition_overall: "standard".to_string(),
        kitchen_condition: "average".to_string(),
        bathrooms_condition: "average".to_string(),
        roof_condition: "average".to_string(),
        mechanicals_condition: "average".to_string(),
        electrical: "updated".to_string(),
        foundation: "good".to_string(),
        square_feet: Some(1800.0),
        ..IntakeAnswers::default()
    }
}

pub(super) fn standard_profile() -> ConditionProfile {
    ConditionProfile::from(&standard_answers())
}

pub(super) fn standard_valuation() -> Valuation {
    engine().compute(BASELINE, &standard_profile())
}

pub(super) fn rents(current: f64, market: f64) -> RentalAssumptions {
    RentalAssumptions {
        current_rent: Some(current),
        market_rent: Some(market),
        ..RentalAssumptions::default()
    }
}

pub(super) fn assert_bounds(valuation: &Valuation) {
    assert!(valuation.cash_offer_low <= valuation.cash_offer_high);
    assert!((0.0..=1.0).contains(&valuation.confidence));
    assert!(valuation.pursue_score <= 100);
}
