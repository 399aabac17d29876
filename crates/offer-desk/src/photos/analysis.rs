use serde::{Deserialize, Serialize};

pub const HEURISTIC_MODEL: &str = "heuristic";

/// Kitchen finish visible in the photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedKitchen {
    Updated,
    Average,
    Dated,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedOverall {
    Excellent,
    Good,
    Fair,
    Poor,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedWaterIssues {
    Yes,
    No,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedSystemRisk {
    None,
    Minor,
    Major,
    #[default]
    Unknown,
}

impl ObservedKitchen {
    pub(crate) fn from_key(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "updated" => Self::Updated,
            "average" => Self::Average,
            "dated" => Self::Dated,
            _ => Self::Unknown,
        }
    }
}

impl ObservedOverall {
    pub(crate) fn from_key(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "excellent" => Self::Excellent,
            "good" => Self::Good,
            "fair" => Self::Fair,
            "poor" => Self::Poor,
            _ => Self::Unknown,
        }
    }
}

impl ObservedWaterIssues {
    pub(crate) fn from_key(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            _ => Self::Unknown,
        }
    }
}

impl ObservedSystemRisk {
    pub(crate) fn from_key(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "minor" => Self::Minor,
            "major" => Self::Major,
            _ => Self::Unknown,
        }
    }
}

/// Scope of updates the photos suggest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateLevel {
    #[serde(rename = "Light cosmetics")]
    LightCosmetics,
    #[serde(rename = "Moderate refresh")]
    ModerateRefresh,
    #[serde(rename = "Full renovation")]
    FullRenovation,
}

impl UpdateLevel {
    pub fn from_score(condition_score: f64) -> Self {
        if condition_score > 85.0 {
            Self::LightCosmetics
        } else if condition_score > 70.0 {
            Self::ModerateRefresh
        } else {
            Self::FullRenovation
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LightCosmetics => "Light cosmetics",
            Self::ModerateRefresh => "Moderate refresh",
            Self::FullRenovation => "Full renovation",
        }
    }

    pub(crate) fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [Self::LightCosmetics, Self::ModerateRefresh, Self::FullRenovation]
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhotoRehabTier {
    #[serde(rename = "Tier 1")]
    Tier1,
    #[serde(rename = "Tier 2")]
    Tier2,
    #[serde(rename = "Tier 3")]
    Tier3,
}

impl PhotoRehabTier {
    pub fn from_score(condition_score: f64) -> Self {
        if condition_score > 80.0 {
            Self::Tier1
        } else if condition_score > 65.0 {
            Self::Tier2
        } else {
            Self::Tier3
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "Tier 1",
            Self::Tier2 => "Tier 2",
            Self::Tier3 => "Tier 3",
        }
    }

    pub(crate) fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [Self::Tier1, Self::Tier2, Self::Tier3]
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(raw))
    }
}

/// Quality flags attached to an analysis. `model` records which path produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoFlags {
    pub limited_photos: bool,
    pub exterior_only_risk: bool,
    pub poor_lighting: bool,
    pub mostly_exterior: bool,
    pub severe_damage_visible: bool,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Heuristic,
    Vision,
}

/// Condition evidence extracted from a lead's photo set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAnalysisResult {
    pub condition_score: f64,
    pub confidence: f64,
    pub update_level: UpdateLevel,
    pub rehab_tier: PhotoRehabTier,
    pub observed_kitchen: ObservedKitchen,
    pub observed_overall: ObservedOverall,
    pub observed_water_issues: ObservedWaterIssues,
    pub observed_system_risk: ObservedSystemRisk,
    pub observations: Vec<String>,
    pub flags: PhotoFlags,
}

impl PhotoAnalysisResult {
    pub fn mode(&self) -> AnalysisMode {
        if self.flags.model == HEURISTIC_MODEL {
            AnalysisMode::Heuristic
        } else {
            AnalysisMode::Vision
        }
    }
}

/// Deterministic stand-in when no vision result is available: more photos read as a
/// slightly better-documented, better-presented property.
pub fn heuristic_from_photo_count(photo_count: usize) -> PhotoAnalysisResult {
    let count = photo_count as f64;
    let condition_score = (68.0 + count * 2.0).clamp(45.0, 95.0);
    let confidence = (0.55 + count * 0.04).min(0.92);

    PhotoAnalysisResult {
        condition_score,
        confidence,
        update_level: UpdateLevel::from_score(condition_score),
        rehab_tier: PhotoRehabTier::from_score(condition_score),
        observed_kitchen: ObservedKitchen::Unknown,
        observed_overall: ObservedOverall::Unknown,
        observed_water_issues: ObservedWaterIssues::Unknown,
        observed_system_risk: ObservedSystemRisk::Unknown,
        observations: vec![
            format!("Analyzed {photo_count} photos from the latest upload batch."),
            "Fallback heuristic used (no vision model configured).".to_string(),
        ],
        flags: PhotoFlags {
            limited_photos: photo_count < 6,
            exterior_only_risk: photo_count > 0 && photo_count < 4,
            model: HEURISTIC_MODEL.to_string(),
            ..PhotoFlags::default()
        },
    }
}
