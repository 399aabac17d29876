use serde::{Deserialize, Serialize};

use super::analysis::{
    ObservedKitchen, ObservedOverall, ObservedSystemRisk, ObservedWaterIssues,
    PhotoAnalysisResult,
};
use crate::valuation::profile::label;
use crate::valuation::{
    ConditionProfile, FinishCondition, FoundationCondition, OverallCondition, RentalAssumptions,
    SystemCondition, Valuation, ValuationEngine,
};

/// Intake profile after confident photo evidence has been merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoOverrides {
    pub profile: ConditionProfile,
    pub conflict_notes: Vec<String>,
    pub applied: Vec<&'static str>,
}

/// Result of revaluing a lead with a photo analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRevaluation {
    pub valuation: Valuation,
    pub analysis: PhotoAnalysisResult,
    pub overrides_applied: Vec<String>,
}

fn observed_finish(kitchen: ObservedKitchen) -> Option<FinishCondition> {
    match kitchen {
        ObservedKitchen::Updated => Some(FinishCondition::Updated),
        ObservedKitchen::Average => Some(FinishCondition::Average),
        ObservedKitchen::Dated => Some(FinishCondition::Dated),
        ObservedKitchen::Unknown => None,
    }
}

fn observed_overall(overall: ObservedOverall) -> Option<OverallCondition> {
    match overall {
        ObservedOverall::Excellent => Some(OverallCondition::HighEnd),
        ObservedOverall::Good => Some(OverallCondition::Standard),
        ObservedOverall::Fair => Some(OverallCondition::Dated),
        ObservedOverall::Poor => Some(OverallCondition::FixerUpper),
        ObservedOverall::Unknown => None,
    }
}

fn observed_water(water: ObservedWaterIssues) -> Option<bool> {
    match water {
        ObservedWaterIssues::Yes => Some(true),
        ObservedWaterIssues::No => Some(false),
        ObservedWaterIssues::Unknown => None,
    }
}

fn water_label(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}

/// Lets a confident photo analysis override the seller's answers.
///
/// Below `override_confidence` the profile is returned unchanged. Each override that
/// changes an answer records a conflict note.
pub fn merge_photo_signals(
    profile: &ConditionProfile,
    analysis: &PhotoAnalysisResult,
    override_confidence: f64,
) -> PhotoOverrides {
    let mut merged = profile.clone();
    let mut conflict_notes = Vec::new();
    let mut applied = Vec::new();

    if analysis.confidence < override_confidence {
        return PhotoOverrides {
            profile: merged,
            conflict_notes,
            applied,
        };
    }

    if let Some(kitchen) = observed_finish(analysis.observed_kitchen) {
        if profile.kitchen != Some(kitchen) {
            conflict_notes.push(format!(
                "Photo evidence overrode intake kitchen rating: {} → {}.",
                label(profile.kitchen, FinishCondition::key),
                kitchen.key()
            ));
            applied.push("kitchen_condition");
        }
        merged.kitchen = Some(kitchen);
    }

    if let Some(overall) = observed_overall(analysis.observed_overall) {
        if profile.overall != Some(overall) {
            conflict_notes.push(format!(
                "Photo evidence overrode overall condition: {} → {}.",
                label(profile.overall, OverallCondition::key),
                overall.key()
            ));
            applied.push("condition_overall");
        }
        merged.overall = Some(overall);
    }

    if let Some(water) = observed_water(analysis.observed_water_issues) {
        if profile.water_issues != Some(water) {
            conflict_notes.push(format!(
                "Photo evidence overrode water-issue indicator: {} → {}.",
                water_label(profile.water_issues),
                water_label(Some(water))
            ));
            applied.push("water_issues");
        }
        merged.water_issues = Some(water);
    }

    match analysis.observed_system_risk {
        ObservedSystemRisk::Major => {
            if merged.electrical != Some(SystemCondition::Major) {
                conflict_notes
                    .push("Photo evidence flagged major system risk; electrical set to major.".to_string());
            }
            if merged.plumbing != Some(SystemCondition::Major) {
                conflict_notes
                    .push("Photo evidence flagged major system risk; plumbing set to major.".to_string());
            }
            if merged.foundation != Some(FoundationCondition::Major) {
                conflict_notes
                    .push("Photo evidence flagged major system risk; foundation set to major.".to_string());
            }
            merged.electrical = Some(SystemCondition::Major);
            merged.plumbing = Some(SystemCondition::Major);
            merged.foundation = Some(FoundationCondition::Major);
        }
        ObservedSystemRisk::Minor => {
            for system in [&mut merged.electrical, &mut merged.plumbing] {
                if *system == Some(SystemCondition::Updated) {
                    *system = Some(SystemCondition::Serviceable);
                }
            }
            if merged.foundation == Some(FoundationCondition::Good) {
                merged.foundation = Some(FoundationCondition::Minor);
            }
            conflict_notes.push(
                "Photo evidence flagged minor system risk; system assumptions were made more conservative."
                    .to_string(),
            );
        }
        ObservedSystemRisk::None | ObservedSystemRisk::Unknown => {}
    }

    PhotoOverrides {
        profile: merged,
        conflict_notes,
        applied,
    }
}

/// Merges photo evidence, recomputes the base valuation, re-applies the rent gap, then
/// applies the relative photo bump.
///
/// Conflict notes lead the explanation; applied overrides are listed first among the
/// analysis observations.
pub fn revalue_with_photos(
    engine: &ValuationEngine,
    baseline: f64,
    profile: &ConditionProfile,
    rental: Option<&RentalAssumptions>,
    mut analysis: PhotoAnalysisResult,
) -> PhotoRevaluation {
    let overrides = merge_photo_signals(
        profile,
        &analysis,
        engine.policy().photo.override_confidence,
    );

    let mut base = engine.compute(baseline, &overrides.profile);
    if !overrides.conflict_notes.is_empty() {
        let mut bullets = overrides.conflict_notes.clone();
        bullets.append(&mut base.explanation_bullets);
        base.explanation_bullets = bullets;
    }
    if let Some(rental) = rental {
        base = engine.apply_rent_gap(&base, rental);
    }

    let valuation =
        engine.adjust_for_photo_analysis(&base, analysis.condition_score, analysis.confidence);

    if !overrides.applied.is_empty() {
        analysis.observations.insert(
            0,
            format!("Overrides applied: {}.", overrides.applied.join(", ")),
        );
    }

    PhotoRevaluation {
        valuation,
        analysis,
        overrides_applied: overrides.applied.iter().map(|name| name.to_string()).collect(),
    }
}
