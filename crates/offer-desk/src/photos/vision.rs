use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use super::analysis::{
    heuristic_from_photo_count, ObservedKitchen, ObservedOverall, ObservedSystemRisk,
    ObservedWaterIssues, PhotoAnalysisResult, PhotoFlags, PhotoRehabTier, UpdateLevel,
};
use crate::valuation::intake::{lenient_number, lenient_text};

/// Most observation lines kept from a vision response.
pub const MAX_OBSERVATIONS: usize = 6;

/// External vision collaborator scoring condition from photo references.
///
/// `Ok(None)` means the model declined to answer; callers fall back to the heuristic.
pub trait VisionAnalyzer: Send + Sync {
    fn model(&self) -> &str;
    fn analyze(&self, image_refs: &[String]) -> Result<Option<String>, VisionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision model unavailable: {0}")]
    Unavailable(String),
    #[error("vision request failed: {0}")]
    Transport(String),
    #[error("vision response was not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFlags {
    #[serde(deserialize_with = "lenient_flag")]
    limited_photos: bool,
    #[serde(deserialize_with = "lenient_flag")]
    poor_lighting: bool,
    #[serde(deserialize_with = "lenient_flag")]
    mostly_exterior: bool,
    #[serde(deserialize_with = "lenient_flag")]
    severe_damage_visible: bool,
}

/// Only a literal `true` sets a flag.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_flags<'de, D>(deserializer: D) -> Result<RawFlags, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(fields) => {
            serde_json::from_value(Value::Object(fields)).unwrap_or_default()
        }
        _ => RawFlags::default(),
    })
}

/// Anything but an array reads as no observations.
fn lenient_observations<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawVisionPayload {
    #[serde(deserialize_with = "lenient_number")]
    condition_score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    confidence: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    update_level: String,
    #[serde(deserialize_with = "lenient_text")]
    rehab_tier: String,
    #[serde(deserialize_with = "lenient_text")]
    observed_kitchen: String,
    #[serde(deserialize_with = "lenient_text")]
    observed_overall: String,
    #[serde(deserialize_with = "lenient_text")]
    observed_water_issues: String,
    #[serde(deserialize_with = "lenient_text")]
    observed_system_risk: String,
    #[serde(deserialize_with = "lenient_observations")]
    observations: Vec<Value>,
    #[serde(deserialize_with = "lenient_flags")]
    flags: RawFlags,
}

/// Validates a vision model's JSON answer into a typed analysis.
///
/// Scores clamp to 0..=100, confidence to 0..=1, and unrecognized categorical values
/// become `unknown`. Missing labels are derived from the score.
pub fn parse_vision_output(raw: &str, model: &str) -> Result<PhotoAnalysisResult, VisionError> {
    let payload: RawVisionPayload = serde_json::from_str(raw)?;

    let condition_score = payload.condition_score.unwrap_or(0.0).clamp(0.0, 100.0);
    let confidence = payload.confidence.unwrap_or(0.0).clamp(0.0, 1.0);
    let observations = payload
        .observations
        .into_iter()
        .take(MAX_OBSERVATIONS)
        .map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect();

    Ok(PhotoAnalysisResult {
        condition_score,
        confidence,
        update_level: UpdateLevel::from_label(&payload.update_level)
            .unwrap_or_else(|| UpdateLevel::from_score(condition_score)),
        rehab_tier: PhotoRehabTier::from_label(&payload.rehab_tier)
            .unwrap_or_else(|| PhotoRehabTier::from_score(condition_score)),
        observed_kitchen: ObservedKitchen::from_key(&payload.observed_kitchen),
        observed_overall: ObservedOverall::from_key(&payload.observed_overall),
        observed_water_issues: ObservedWaterIssues::from_key(&payload.observed_water_issues),
        observed_system_risk: ObservedSystemRisk::from_key(&payload.observed_system_risk),
        observations,
        flags: PhotoFlags {
            limited_photos: payload.flags.limited_photos,
            exterior_only_risk: false,
            poor_lighting: payload.flags.poor_lighting,
            mostly_exterior: payload.flags.mostly_exterior,
            severe_damage_visible: payload.flags.severe_damage_visible,
            model: model.to_string(),
        },
    })
}

/// Runs the vision model when one is configured and there are usable images, and the
/// photo-count heuristic otherwise. Vision failures never propagate.
pub fn analyze_photos(
    analyzer: Option<&dyn VisionAnalyzer>,
    image_refs: &[String],
    photo_count: usize,
) -> PhotoAnalysisResult {
    let Some(analyzer) = analyzer.filter(|_| !image_refs.is_empty()) else {
        return heuristic_from_photo_count(photo_count);
    };

    let outcome = analyzer
        .analyze(image_refs)
        .and_then(|raw| raw.map(|raw| parse_vision_output(&raw, analyzer.model())).transpose());

    match outcome {
        Ok(Some(mut result)) => {
            debug!(model = analyzer.model(), images = image_refs.len(), "vision analysis completed");
            result.observations.insert(
                0,
                format!("Vision model reviewed {} photo(s).", image_refs.len()),
            );
            result
        }
        Ok(None) => heuristic_from_photo_count(photo_count),
        Err(err) => {
            warn!(model = analyzer.model(), error = %err, "vision analysis failed, using heuristic");
            let mut result = heuristic_from_photo_count(photo_count);
            result.observations.insert(
                0,
                "Vision model unavailable; used fallback heuristic.".to_string(),
            );
            result
        }
    }
}
