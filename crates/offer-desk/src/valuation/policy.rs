use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::profile::{
    FinishCondition, FoundationCondition, LifespanCondition, Motivation, Occupancy,
    OverallCondition, SystemCondition, Timeline,
};

/// Versioned scoring data injected into the valuation engine.
///
/// Every literal the engine scores with lives here so a policy change never touches the
/// engine itself. [`ScoringPolicy::standard`] is the canonical revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub revision: String,
    /// Fixed transaction friction applied to every deal.
    pub base_penalty: f64,
    pub overall: OverallWeights,
    pub kitchen: FinishWeights,
    pub bathrooms: FinishWeights,
    pub roof: LifespanWeights,
    pub mechanicals: LifespanWeights,
    pub occupancy: OccupancyWeights,
    pub size: SizeMultiplier,
    pub bath_count: BathCountAddOn,
    /// Penalty for an active water-intrusion answer, scaled by the size multiplier.
    pub water_penalty: f64,
    pub electrical: SystemTable,
    pub plumbing: SystemTable,
    pub foundation: FoundationTable,
    pub offer_band: OfferBand,
    pub listing: ListingNet,
    pub confidence: ConfidenceModel,
    pub pursue: PursueScoring,
    pub photo: PhotoAdjustment,
    pub rent_gap: RentGapAdjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallWeights {
    pub high_end: f64,
    pub standard: f64,
    pub rent_ready: f64,
    pub dated: f64,
    pub fixer_upper: f64,
    pub fallback: f64,
}

impl OverallWeights {
    pub fn weight(&self, rating: Option<OverallCondition>) -> f64 {
        match rating {
            Some(OverallCondition::HighEnd) => self.high_end,
            Some(OverallCondition::Standard) => self.standard,
            Some(OverallCondition::RentReady) => self.rent_ready,
            Some(OverallCondition::Dated) => self.dated,
            Some(OverallCondition::FixerUpper) => self.fixer_upper,
            None => self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishWeights {
    pub updated: f64,
    pub average: f64,
    pub dated: f64,
    pub needs_replaced: f64,
    pub fallback: f64,
}

impl FinishWeights {
    pub fn weight(&self, rating: Option<FinishCondition>) -> f64 {
        match rating {
            Some(FinishCondition::Updated) => self.updated,
            Some(FinishCondition::Average) => self.average,
            Some(FinishCondition::Dated) => self.dated,
            Some(FinishCondition::NeedsReplaced) => self.needs_replaced,
            None => self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifespanWeights {
    pub new: f64,
    pub average: f64,
    pub older: f64,
    pub needs_replaced: f64,
    pub fallback: f64,
}

impl LifespanWeights {
    pub fn weight(&self, rating: Option<LifespanCondition>) -> f64 {
        match rating {
            Some(LifespanCondition::New) => self.new,
            Some(LifespanCondition::Average) => self.average,
            Some(LifespanCondition::Older) => self.older,
            Some(LifespanCondition::NeedsReplaced) => self.needs_replaced,
            None => self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyWeights {
    pub vacant: f64,
    pub owner_occupied: f64,
    pub tenant: f64,
    pub fallback: f64,
}

impl OccupancyWeights {
    pub fn weight(&self, occupancy: Option<Occupancy>) -> f64 {
        match occupancy {
            Some(Occupancy::Vacant) => self.vacant,
            Some(Occupancy::OwnerOccupied) => self.owner_occupied,
            Some(Occupancy::Tenant) => self.tenant,
            None => self.fallback,
        }
    }
}

/// Step function over square footage applied to condition-derived penalties.
///
/// `bands` are checked first (largest threshold first); a property at or below
/// `small_at_most` gets `small_multiplier`; everything else, and unknown sizes, is 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeMultiplier {
    pub bands: Vec<SizeBand>,
    pub small_at_most: f64,
    pub small_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeBand {
    pub at_least: f64,
    pub multiplier: f64,
}

impl SizeMultiplier {
    pub fn multiplier(&self, square_feet: Option<f64>) -> f64 {
        let Some(sf) = square_feet.filter(|sf| sf.is_finite() && *sf > 0.0) else {
            return 1.0;
        };
        if let Some(band) = self.bands.iter().find(|band| sf >= band.at_least) {
            return band.multiplier;
        }
        if sf <= self.small_at_most {
            return self.small_multiplier;
        }
        1.0
    }
}

/// Extra bathroom penalty per bath when bathrooms are worn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BathCountAddOn {
    pub per_bath: f64,
    pub cap: f64,
}

/// Dollar reserve plus offer-band haircut for one big-ticket system rating.
///
/// `spread_pct` is zero or negative; it is added to the offer-band percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemAdjustment {
    pub repairs: f64,
    pub spread_pct: f64,
}

impl SystemAdjustment {
    pub const NONE: SystemAdjustment = SystemAdjustment {
        repairs: 0.0,
        spread_pct: 0.0,
    };

    pub fn is_material(&self) -> bool {
        self.repairs != 0.0 || self.spread_pct != 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemTable {
    pub updated: SystemAdjustment,
    pub serviceable: SystemAdjustment,
    pub outdated: SystemAdjustment,
    pub major: SystemAdjustment,
    pub fallback: SystemAdjustment,
}

impl SystemTable {
    pub fn adjustment(&self, rating: Option<SystemCondition>) -> SystemAdjustment {
        match rating {
            Some(SystemCondition::Updated) => self.updated,
            Some(SystemCondition::Serviceable) => self.serviceable,
            Some(SystemCondition::Outdated) => self.outdated,
            Some(SystemCondition::Major) => self.major,
            None => self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundationTable {
    pub good: SystemAdjustment,
    pub minor: SystemAdjustment,
    pub major: SystemAdjustment,
    pub fallback: SystemAdjustment,
}

impl FoundationTable {
    pub fn adjustment(&self, rating: Option<FoundationCondition>) -> SystemAdjustment {
        match rating {
            Some(FoundationCondition::Good) => self.good,
            Some(FoundationCondition::Minor) => self.minor,
            Some(FoundationCondition::Major) => self.major,
            None => self.fallback,
        }
    }
}

/// Nominal offer band as fractions of the adjusted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferBand {
    pub low_pct: f64,
    pub high_pct: f64,
}

/// Traditional-listing benchmark: `baseline * factor - baseline * penalty * penalty_share`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingNet {
    pub factor: f64,
    pub penalty_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceModel {
    pub base: f64,
    pub per_note_char: f64,
    pub notes_cap: f64,
    pub motivation_high: f64,
    pub motivation_medium: f64,
    pub per_age_field: f64,
    pub square_feet: f64,
    pub cap: f64,
}

impl ConfidenceModel {
    pub fn motivation_boost(&self, motivation: Option<Motivation>) -> f64 {
        match motivation {
            Some(Motivation::High) => self.motivation_high,
            Some(Motivation::Medium) => self.motivation_medium,
            Some(Motivation::Low) | None => 0.0,
        }
    }
}

/// Pursue-score model. `Disabled` reproduces the intake revision that always reported 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PursueScoring {
    Heuristic(PursueWeights),
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursueWeights {
    /// Points available from the financial side when risk is at the base friction.
    pub financial_max: f64,
    /// Risk above base friction at which the financial points reach zero.
    pub risk_span: f64,
    pub motivation_high: f64,
    pub motivation_medium: f64,
    pub motivation_low: f64,
    pub motivation_unknown: f64,
    pub timeline_asap: f64,
    pub timeline_soon: f64,
    pub timeline_flexible: f64,
    pub timeline_unknown: f64,
}

impl PursueWeights {
    pub fn motivation_points(&self, motivation: Option<Motivation>) -> f64 {
        match motivation {
            Some(Motivation::High) => self.motivation_high,
            Some(Motivation::Medium) => self.motivation_medium,
            Some(Motivation::Low) => self.motivation_low,
            None => self.motivation_unknown,
        }
    }

    pub fn timeline_points(&self, timeline: Option<Timeline>) -> f64 {
        match timeline {
            Some(Timeline::Asap) => self.timeline_asap,
            Some(Timeline::Soon) => self.timeline_soon,
            Some(Timeline::Flexible) => self.timeline_flexible,
            None => self.timeline_unknown,
        }
    }
}

/// Constants for the relative photo-evidence correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAdjustment {
    pub neutral_score: f64,
    pub score_divisor: f64,
    pub confidence_floor: f64,
    pub confidence_slope: f64,
    pub confidence_gain: f64,
    pub pursue_gain: f64,
    pub confidence_cap: f64,
    /// Minimum photo confidence before observed signals override intake answers.
    pub override_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentGapAdjustment {
    pub ratio_clamp: f64,
    pub bump_scale: f64,
    pub bump_cap: f64,
    pub pursue_gain: f64,
    pub confidence_gain: f64,
}

impl ScoringPolicy {
    /// Canonical revision of the scoring tables.
    pub fn standard() -> Self {
        Self {
            revision: "2025-03-standard".to_string(),
            base_penalty: 0.08,
            overall: OverallWeights {
                high_end: 0.02,
                standard: 0.06,
                rent_ready: 0.08,
                dated: 0.12,
                fixer_upper: 0.2,
                fallback: 0.08,
            },
            kitchen: FinishWeights {
                updated: 0.015,
                average: 0.04,
                dated: 0.07,
                needs_replaced: 0.1,
                fallback: 0.06,
            },
            bathrooms: FinishWeights {
                updated: 0.015,
                average: 0.04,
                dated: 0.07,
                needs_replaced: 0.1,
                fallback: 0.06,
            },
            roof: LifespanWeights {
                new: 0.0,
                average: 0.03,
                older: 0.06,
                needs_replaced: 0.1,
                fallback: 0.04,
            },
            mechanicals: LifespanWeights {
                new: 0.0,
                average: 0.03,
                older: 0.06,
                needs_replaced: 0.1,
                fallback: 0.04,
            },
            occupancy: OccupancyWeights {
                vacant: 0.0,
                owner_occupied: 0.02,
                tenant: 0.03,
                fallback: 0.02,
            },
            size: SizeMultiplier {
                bands: vec![
                    SizeBand {
                        at_least: 3000.0,
                        multiplier: 1.14,
                    },
                    SizeBand {
                        at_least: 2200.0,
                        multiplier: 1.08,
                    },
                ],
                small_at_most: 950.0,
                small_multiplier: 0.9,
            },
            bath_count: BathCountAddOn {
                per_bath: 0.005,
                cap: 0.03,
            },
            water_penalty: 0.04,
            electrical: SystemTable {
                updated: SystemAdjustment::NONE,
                serviceable: SystemAdjustment::NONE,
                outdated: SystemAdjustment {
                    repairs: 12_000.0,
                    spread_pct: -0.02,
                },
                major: SystemAdjustment {
                    repairs: 25_000.0,
                    spread_pct: -0.05,
                },
                fallback: SystemAdjustment::NONE,
            },
            plumbing: SystemTable {
                updated: SystemAdjustment::NONE,
                serviceable: SystemAdjustment::NONE,
                outdated: SystemAdjustment {
                    repairs: 9_000.0,
                    spread_pct: -0.015,
                },
                major: SystemAdjustment {
                    repairs: 20_000.0,
                    spread_pct: -0.04,
                },
                fallback: SystemAdjustment::NONE,
            },
            foundation: FoundationTable {
                good: SystemAdjustment::NONE,
                minor: SystemAdjustment {
                    repairs: 7_000.0,
                    spread_pct: -0.01,
                },
                major: SystemAdjustment {
                    repairs: 35_000.0,
                    spread_pct: -0.07,
                },
                fallback: SystemAdjustment::NONE,
            },
            offer_band: OfferBand {
                low_pct: 0.88,
                high_pct: 0.94,
            },
            listing: ListingNet {
                factor: 0.93,
                penalty_share: 0.35,
            },
            confidence: ConfidenceModel {
                base: 0.55,
                per_note_char: 0.0005,
                notes_cap: 0.1,
                motivation_high: 0.08,
                motivation_medium: 0.04,
                per_age_field: 0.04,
                square_feet: 0.03,
                cap: 0.92,
            },
            pursue: PursueScoring::Heuristic(PursueWeights {
                financial_max: 60.0,
                risk_span: 0.6,
                motivation_high: 25.0,
                motivation_medium: 15.0,
                motivation_low: 5.0,
                motivation_unknown: 10.0,
                timeline_asap: 15.0,
                timeline_soon: 10.0,
                timeline_flexible: 4.0,
                timeline_unknown: 6.0,
            }),
            photo: PhotoAdjustment {
                neutral_score: 70.0,
                score_divisor: 200.0,
                confidence_floor: 0.6,
                confidence_slope: 0.4,
                confidence_gain: 0.1,
                pursue_gain: 50.0,
                confidence_cap: 0.97,
                override_confidence: 0.75,
            },
            rent_gap: RentGapAdjustment {
                ratio_clamp: 0.4,
                bump_scale: 0.1,
                bump_cap: 0.04,
                pursue_gain: 10.0,
                confidence_gain: 0.02,
            },
        }
    }

    /// Reads a JSON policy document and validates it before use.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        let policy: ScoringPolicy = serde_json::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Rejects tables the engine cannot score with sensibly.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let fraction = |value: f64| value.is_finite() && (0.0..=1.0).contains(&value);

        if !fraction(self.base_penalty) {
            return Err(PolicyError::Invalid(format!(
                "base_penalty {} must be within 0..=1",
                self.base_penalty
            )));
        }
        let band = &self.offer_band;
        if !(band.low_pct.is_finite() && band.high_pct.is_finite())
            || band.low_pct < 0.0
            || band.low_pct > band.high_pct
        {
            return Err(PolicyError::Invalid(format!(
                "offer band must satisfy 0 <= low ({}) <= high ({})",
                band.low_pct, band.high_pct
            )));
        }
        if !self
            .size
            .bands
            .windows(2)
            .all(|pair| pair[0].at_least > pair[1].at_least)
        {
            return Err(PolicyError::Invalid(
                "size bands must be ordered from largest threshold to smallest".to_string(),
            ));
        }
        let smallest_band = self
            .size
            .bands
            .last()
            .map(|band| band.at_least)
            .unwrap_or(f64::INFINITY);
        if self.size.small_at_most >= smallest_band {
            return Err(PolicyError::Invalid(format!(
                "small_at_most {} overlaps the {} sqft band",
                self.size.small_at_most, smallest_band
            )));
        }
        if self
            .size
            .bands
            .iter()
            .map(|band| band.multiplier)
            .chain(std::iter::once(self.size.small_multiplier))
            .any(|multiplier| !(multiplier.is_finite() && multiplier > 0.0))
        {
            return Err(PolicyError::Invalid(
                "size multipliers must be positive".to_string(),
            ));
        }
        for (name, cap) in [
            ("confidence.cap", self.confidence.cap),
            ("photo.confidence_cap", self.photo.confidence_cap),
        ] {
            if !fraction(cap) {
                return Err(PolicyError::Invalid(format!(
                    "{name} {cap} must be within 0..=1"
                )));
            }
        }
        if !(self.photo.score_divisor.is_finite() && self.photo.score_divisor > 0.0) {
            return Err(PolicyError::Invalid(
                "photo.score_divisor must be positive".to_string(),
            ));
        }
        let rent = &self.rent_gap;
        if !(fraction(rent.ratio_clamp) && fraction(rent.bump_cap)) {
            return Err(PolicyError::Invalid(
                "rent_gap clamps must be within 0..=1".to_string(),
            ));
        }
        if let PursueScoring::Heuristic(weights) = &self.pursue {
            if !(weights.risk_span.is_finite() && weights.risk_span > 0.0) {
                return Err(PolicyError::Invalid(
                    "pursue.risk_span must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read scoring policy {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("scoring policy is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scoring policy rejected: {0}")]
    Invalid(String),
}
