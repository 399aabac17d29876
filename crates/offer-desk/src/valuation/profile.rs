use serde::{Deserialize, Serialize};

/// Canonicalizes a categorical answer so aliases and form labels resolve to one key.
pub(crate) fn normalize_key(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == '&')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Keeps only finite, strictly positive measurements.
pub(crate) fn positive_measure(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Keeps only finite, non-negative measurements (ages may legitimately be zero).
pub(crate) fn non_negative_measure(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Overall finish level reported by the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallCondition {
    HighEnd,
    Standard,
    RentReady,
    Dated,
    FixerUpper,
}

impl OverallCondition {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "high_end" | "excellent" | "luxury" => Some(Self::HighEnd),
            "standard" | "good" => Some(Self::Standard),
            "rent_ready" => Some(Self::RentReady),
            "dated" | "fair" => Some(Self::Dated),
            "fixer_upper" | "fixer" | "poor" => Some(Self::FixerUpper),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::HighEnd => "high_end",
            Self::Standard => "standard",
            Self::RentReady => "rent_ready",
            Self::Dated => "dated",
            Self::FixerUpper => "fixer_upper",
        }
    }
}

/// Finish rating shared by kitchens and bathrooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishCondition {
    Updated,
    Average,
    Dated,
    NeedsReplaced,
}

impl FinishCondition {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "updated" | "new" | "remodeled" => Some(Self::Updated),
            "average" => Some(Self::Average),
            "dated" | "outdated" => Some(Self::Dated),
            "needs_replaced" | "needs_replacement" | "poor" => Some(Self::NeedsReplaced),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Average => "average",
            Self::Dated => "dated",
            Self::NeedsReplaced => "needs_replaced",
        }
    }

    pub const fn is_worn(self) -> bool {
        matches!(self, Self::Dated | Self::NeedsReplaced)
    }
}

/// Remaining-life rating for the roof and the mechanical systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifespanCondition {
    New,
    Average,
    Older,
    NeedsReplaced,
}

impl LifespanCondition {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "new" | "updated" => Some(Self::New),
            "average" => Some(Self::Average),
            "older" | "old" | "aging" => Some(Self::Older),
            "needs_replaced" | "needs_replacement" | "failing" => Some(Self::NeedsReplaced),
            _ => None,
        }
    }

    /// Buckets an age in years the way the first intake revision recorded roofs and HVAC.
    pub fn from_age_years(years: f64) -> Option<Self> {
        if !years.is_finite() || years < 0.0 {
            return None;
        }
        Some(if years <= 5.0 {
            Self::New
        } else if years <= 15.0 {
            Self::Average
        } else if years <= 22.0 {
            Self::Older
        } else {
            Self::NeedsReplaced
        })
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Average => "average",
            Self::Older => "older",
            Self::NeedsReplaced => "needs_replaced",
        }
    }
}

/// Rating for the electrical and plumbing systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemCondition {
    Updated,
    Serviceable,
    Outdated,
    Major,
}

impl SystemCondition {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "updated" | "new" | "modern" => Some(Self::Updated),
            "serviceable" | "ok" => Some(Self::Serviceable),
            "outdated" | "needs_work" | "fuse_knob_tube" | "knob_and_tube" | "fuse" => {
                Some(Self::Outdated)
            }
            "major" => Some(Self::Major),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Serviceable => "serviceable",
            Self::Outdated => "outdated",
            Self::Major => "major",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundationCondition {
    Good,
    Minor,
    Major,
}

impl FoundationCondition {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "good" | "solid" | "ok" => Some(Self::Good),
            "minor" | "needs_work" => Some(Self::Minor),
            "major" | "structural" => Some(Self::Major),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Vacant,
    OwnerOccupied,
    Tenant,
}

impl Occupancy {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "vacant" | "empty" => Some(Self::Vacant),
            "occupied" | "owner" | "owner_occupied" => Some(Self::OwnerOccupied),
            "tenant" | "tenant_occupied" | "rented" => Some(Self::Tenant),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Vacant => "vacant",
            Self::OwnerOccupied => "occupied",
            Self::Tenant => "tenant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motivation {
    High,
    Medium,
    Low,
}

impl Motivation {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "high" | "urgent" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// How quickly the seller wants to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    Asap,
    Soon,
    Flexible,
}

impl Timeline {
    pub fn from_key(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "asap" | "immediate" | "immediately" | "now" => Some(Self::Asap),
            "soon" | "30_days" | "60_days" => Some(Self::Soon),
            "flexible" | "no_rush" | "later" | "whenever" => Some(Self::Flexible),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::Soon => "soon",
            Self::Flexible => "flexible",
        }
    }
}

pub(crate) fn water_flag_from_key(raw: &str) -> Option<bool> {
    match normalize_key(raw).as_str() {
        "yes" | "y" | "true" | "active" => Some(true),
        "no" | "n" | "false" | "none" => Some(false),
        _ => None,
    }
}

/// The single typed shape every intake revision is mapped into before scoring.
///
/// `None` on a categorical field means the answer was missing or unrecognized; the
/// scoring policy decides what neutral weight that carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionProfile {
    pub occupancy: Option<Occupancy>,
    pub timeline: Option<Timeline>,
    pub motivation: Option<Motivation>,
    pub overall: Option<OverallCondition>,
    pub kitchen: Option<FinishCondition>,
    pub bathrooms: Option<FinishCondition>,
    pub roof: Option<LifespanCondition>,
    pub mechanicals: Option<LifespanCondition>,
    pub electrical: Option<SystemCondition>,
    pub plumbing: Option<SystemCondition>,
    pub foundation: Option<FoundationCondition>,
    pub water_issues: Option<bool>,
    pub square_feet: Option<f64>,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub roof_age: Option<f64>,
    pub hvac_age: Option<f64>,
    pub notes: Option<String>,
}

pub(crate) fn label<T>(value: Option<T>, key: fn(T) -> &'static str) -> &'static str {
    value.map(key).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_collapses_form_labels() {
        assert_eq!(normalize_key("  Fuse/Knob & Tube "), "fuse_knob_tube");
        assert_eq!(normalize_key("Needs-Replaced"), "needs_replaced");
        assert_eq!(normalize_key("\u{feff}High End"), "high_end");
    }

    #[test]
    fn legacy_vocabulary_resolves_to_canonical_ratings() {
        assert_eq!(SystemCondition::from_key("modern"), Some(SystemCondition::Updated));
        assert_eq!(SystemCondition::from_key("needs_work"), Some(SystemCondition::Outdated));
        assert_eq!(
            FoundationCondition::from_key("structural"),
            Some(FoundationCondition::Major)
        );
        assert_eq!(OverallCondition::from_key("poor"), Some(OverallCondition::FixerUpper));
        assert_eq!(Occupancy::from_key("occupied"), Some(Occupancy::OwnerOccupied));
    }

    #[test]
    fn unknown_answers_resolve_to_none() {
        assert_eq!(FinishCondition::from_key("granite??"), None);
        assert_eq!(Timeline::from_key(""), None);
        assert_eq!(water_flag_from_key("maybe"), None);
    }

    #[test]
    fn ages_bucket_into_lifespan_ratings() {
        assert_eq!(LifespanCondition::from_age_years(3.0), Some(LifespanCondition::New));
        assert_eq!(LifespanCondition::from_age_years(12.0), Some(LifespanCondition::Average));
        assert_eq!(LifespanCondition::from_age_years(20.0), Some(LifespanCondition::Older));
        assert_eq!(
            LifespanCondition::from_age_years(30.0),
            Some(LifespanCondition::NeedsReplaced)
        );
        assert_eq!(LifespanCondition::from_age_years(-1.0), None);
        assert_eq!(LifespanCondition::from_age_years(f64::NAN), None);
    }
}
