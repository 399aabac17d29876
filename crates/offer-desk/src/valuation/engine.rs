use super::explain::{format_currency, format_square_feet, whole_percent};
use super::policy::{PursueScoring, ScoringPolicy, SystemAdjustment};
use super::profile::{label, ConditionProfile, FinishCondition, FoundationCondition, LifespanCondition, Occupancy, OverallCondition, SystemCondition};
use super::{PenaltyComponent, Valuation, ValuationFactor};

pub(crate) struct PenaltyBreakdown {
    pub components: Vec<PenaltyComponent>,
    pub size_multiplier: f64,
    pub unsized_overall: f64,
    pub total_penalty: f64,
    pub system_repairs: f64,
    pub system_spread: f64,
}

fn percentage_component(
    factor: ValuationFactor,
    rating: &str,
    penalty: f64,
    baseline: f64,
) -> PenaltyComponent {
    PenaltyComponent {
        factor,
        rating: rating.to_string(),
        penalty,
        dollar_impact: baseline * penalty,
        spread_pct: 0.0,
        repairs: 0.0,
    }
}

fn system_component(
    factor: ValuationFactor,
    rating: &str,
    adjustment: SystemAdjustment,
) -> PenaltyComponent {
    PenaltyComponent {
        factor,
        rating: rating.to_string(),
        penalty: 0.0,
        dollar_impact: adjustment.repairs,
        spread_pct: adjustment.spread_pct.min(0.0),
        repairs: adjustment.repairs.max(0.0),
    }
}

pub(crate) fn score_profile(
    baseline: f64,
    profile: &ConditionProfile,
    policy: &ScoringPolicy,
) -> PenaltyBreakdown {
    let mut components = Vec::new();
    let size_multiplier = policy.size.multiplier(profile.square_feet);

    let unsized_overall = policy.overall.weight(profile.overall);
    components.push(percentage_component(
        ValuationFactor::OverallCondition,
        label(profile.overall, OverallCondition::key),
        unsized_overall * size_multiplier,
        baseline,
    ));
    components.push(percentage_component(
        ValuationFactor::Kitchen,
        label(profile.kitchen, FinishCondition::key),
        policy.kitchen.weight(profile.kitchen),
        baseline,
    ));
    components.push(percentage_component(
        ValuationFactor::Bathrooms,
        label(profile.bathrooms, FinishCondition::key),
        policy.bathrooms.weight(profile.bathrooms),
        baseline,
    ));

    if profile.bathrooms.is_some_and(FinishCondition::is_worn) {
        let baths = profile.baths.unwrap_or(0.0);
        let add_on = (baths * policy.bath_count.per_bath).clamp(0.0, policy.bath_count.cap);
        if add_on > 0.0 {
            components.push(percentage_component(
                ValuationFactor::BathCount,
                &baths.to_string(),
                add_on,
                baseline,
            ));
        }
    }

    components.push(percentage_component(
        ValuationFactor::Roof,
        label(profile.roof, LifespanCondition::key),
        policy.roof.weight(profile.roof),
        baseline,
    ));
    components.push(percentage_component(
        ValuationFactor::Mechanicals,
        label(profile.mechanicals, LifespanCondition::key),
        policy.mechanicals.weight(profile.mechanicals),
        baseline,
    ));

    let occupancy_penalty = policy.occupancy.weight(profile.occupancy);
    if occupancy_penalty > 0.0 {
        components.push(percentage_component(
            ValuationFactor::Occupancy,
            label(profile.occupancy, Occupancy::key),
            occupancy_penalty,
            baseline,
        ));
    }

    if profile.water_issues == Some(true) {
        components.push(percentage_component(
            ValuationFactor::WaterIntrusion,
            "yes",
            policy.water_penalty * size_multiplier,
            baseline,
        ));
    }

    let systems = [
        (
            ValuationFactor::Electrical,
            label(profile.electrical, SystemCondition::key),
            policy.electrical.adjustment(profile.electrical),
        ),
        (
            ValuationFactor::Plumbing,
            label(profile.plumbing, SystemCondition::key),
            policy.plumbing.adjustment(profile.plumbing),
        ),
        (
            ValuationFactor::Foundation,
            label(profile.foundation, FoundationCondition::key),
            policy.foundation.adjustment(profile.foundation),
        ),
    ];
    for (factor, rating, adjustment) in systems {
        if adjustment.is_material() {
            components.push(system_component(factor, rating, adjustment));
        }
    }

    let total_penalty = (policy.base_penalty
        + components
            .iter()
            .map(|component| component.penalty.max(0.0))
            .sum::<f64>())
    .clamp(0.0, 1.0);
    let system_repairs = components.iter().map(|component| component.repairs).sum();
    let system_spread = components.iter().map(|component| component.spread_pct).sum();

    PenaltyBreakdown {
        components,
        size_multiplier,
        unsized_overall,
        total_penalty,
        system_repairs,
        system_spread,
    }
}

pub(crate) fn compute_valuation(
    baseline: f64,
    profile: &ConditionProfile,
    policy: &ScoringPolicy,
) -> Valuation {
    let base = if baseline.is_finite() { baseline.max(0.0) } else { 0.0 };
    let breakdown = score_profile(base, profile, policy);
    let adjusted = base * (1.0 - breakdown.total_penalty);

    let low_pct = (policy.offer_band.low_pct + breakdown.system_spread).max(0.0);
    let high_pct = (policy.offer_band.high_pct + breakdown.system_spread).max(low_pct);
    let cash_offer_low = whole_dollars(adjusted * low_pct - breakdown.system_repairs);
    let cash_offer_high = whole_dollars(adjusted * high_pct - breakdown.system_repairs);

    let listing_net_estimate = whole_dollars(
        base * policy.listing.factor - base * breakdown.total_penalty * policy.listing.penalty_share,
    );

    let explanation_bullets = explain(base, profile, &breakdown);

    Valuation {
        baseline_market_value: base,
        cash_offer_low,
        cash_offer_high,
        confidence: round_confidence(confidence(profile, policy)),
        pursue_score: pursue_score(base, profile, &breakdown, policy),
        listing_net_estimate,
        explanation_bullets,
        components: breakdown.components,
    }
}

pub(crate) fn whole_dollars(value: f64) -> u64 {
    if value.is_finite() {
        value.round().max(0.0) as u64
    } else {
        0
    }
}

pub(crate) fn round_confidence(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

fn confidence(profile: &ConditionProfile, policy: &ScoringPolicy) -> f64 {
    let model = &policy.confidence;
    let note_chars = profile
        .notes
        .as_deref()
        .map(|notes| notes.chars().count())
        .unwrap_or(0) as f64;
    let notes_boost = (note_chars * model.per_note_char).clamp(0.0, model.notes_cap);
    let age_fields = [profile.roof_age, profile.hvac_age]
        .iter()
        .filter(|age| age.is_some())
        .count() as f64;
    let size_boost = if profile.square_feet.is_some() {
        model.square_feet
    } else {
        0.0
    };

    (model.base
        + notes_boost
        + model.motivation_boost(profile.motivation)
        + age_fields * model.per_age_field
        + size_boost)
        .clamp(0.0, model.cap)
}

fn pursue_score(
    baseline: f64,
    profile: &ConditionProfile,
    breakdown: &PenaltyBreakdown,
    policy: &ScoringPolicy,
) -> u8 {
    let weights = match &policy.pursue {
        PursueScoring::Heuristic(weights) => weights,
        PursueScoring::Disabled => return 0,
    };

    let repair_share = if baseline > 0.0 {
        breakdown.system_repairs / baseline
    } else {
        0.0
    };
    let risk = breakdown.total_penalty + (-breakdown.system_spread).max(0.0) + repair_share;
    let excess = ((risk - policy.base_penalty) / weights.risk_span).clamp(0.0, 1.0);
    let financial = weights.financial_max * (1.0 - excess);

    let score = financial
        + weights.motivation_points(profile.motivation)
        + weights.timeline_points(profile.timeline);
    score.round().clamp(0.0, 100.0) as u8
}

fn explain(baseline: f64, profile: &ConditionProfile, breakdown: &PenaltyBreakdown) -> Vec<String> {
    let mut bullets = vec![format!("Baseline value: {}.", format_currency(baseline))];

    let sized_overall = breakdown.unsized_overall * breakdown.size_multiplier;
    bullets.push(match profile.square_feet {
        Some(square_feet) => format!(
            "Square footage effect: {} sf falls in the {:.2}x band, so the overall-condition penalty moves from {}% to {}% (about {} of additional impact before spread and repairs).",
            format_square_feet(square_feet),
            breakdown.size_multiplier,
            whole_percent(breakdown.unsized_overall),
            whole_percent(sized_overall),
            format_currency(baseline * (sized_overall - breakdown.unsized_overall)),
        ),
        None => "Square footage effect: not provided, so a neutral 1.00x multiplier applies to the overall-condition penalty.".to_string(),
    });

    let bath_add_on = breakdown
        .components
        .iter()
        .find(|component| component.factor == ValuationFactor::BathCount);

    for component in &breakdown.components {
        let percent = whole_percent(component.penalty);
        let dollars = format_currency(component.dollar_impact);
        let line = match component.factor {
            ValuationFactor::OverallCondition => format!(
                "Overall condition ({}): adds {percent}% penalty (about {dollars}).",
                component.rating
            ),
            ValuationFactor::Kitchen => format!(
                "Kitchen ({}): adds {percent}% penalty (about {dollars}).",
                component.rating
            ),
            ValuationFactor::Bathrooms => match bath_add_on {
                Some(add_on) => format!(
                    "Bathrooms ({}): base {percent}% penalty (about {dollars}), plus a bath-count add-on of {}% (about {}).",
                    component.rating,
                    whole_percent(add_on.penalty),
                    format_currency(add_on.dollar_impact)
                ),
                None => format!(
                    "Bathrooms ({}): base {percent}% penalty (about {dollars}).",
                    component.rating
                ),
            },
            ValuationFactor::BathCount => format!(
                "Bath count ({}): adds {percent}% because bathroom condition is {}.",
                component.rating,
                label(profile.bathrooms, FinishCondition::key)
            ),
            ValuationFactor::Roof => format!(
                "Roof ({}): adds {percent}% penalty (about {dollars}).",
                component.rating
            ),
            ValuationFactor::Mechanicals => format!(
                "Mechanicals ({}): adds {percent}% penalty (about {dollars}).",
                component.rating
            ),
            ValuationFactor::Occupancy => format!(
                "Occupancy ({}): adds {percent}% friction (about {dollars}).",
                component.rating
            ),
            ValuationFactor::WaterIntrusion => format!(
                "Water intrusion reported: adds {percent}% penalty after the size multiplier (about {dollars})."
            ),
            ValuationFactor::Electrical | ValuationFactor::Plumbing | ValuationFactor::Foundation => {
                format!(
                    "{} ({}): spread haircut {}% and repair reserve {}.",
                    component.factor.label(),
                    component.rating,
                    whole_percent(component.spread_pct),
                    format_currency(component.repairs)
                )
            }
        };
        bullets.push(line);
    }

    bullets.push(format!(
        "Total condition/systems penalty before spread and repairs: ~{}%.",
        whole_percent(breakdown.total_penalty)
    ));
    bullets
}
