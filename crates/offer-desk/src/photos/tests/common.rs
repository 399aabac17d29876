use std::sync::Mutex;

use crate::photos::{
    heuristic_from_photo_count, ObservedKitchen, ObservedOverall, ObservedSystemRisk,
    ObservedWaterIssues, PhotoAnalysisResult, VisionAnalyzer, VisionError,
};

/// Analyzer returning a canned response and recording how many images it saw.
pub(super) struct StubAnalyzer {
    pub response: Result<Option<String>, String>,
    pub seen: Mutex<Vec<usize>>,
}

impl StubAnalyzer {
    pub fn answering(raw: &str) -> Self {
        Self {
            response: Ok(Some(raw.to_string())),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self {
            response: Ok(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<usize> {
        self.seen.lock().expect("stub lock").clone()
    }
}

impl VisionAnalyzer for StubAnalyzer {
    fn model(&self) -> &str {
        "stub-vision-1"
    }

    fn analyze(&self, image_refs: &[String]) -> Result<Option<String>, VisionError> {
        self.seen.lock().expect("stub lock").push(image_refs.len());
        self.response.clone().map_err(VisionError::Unavailable)
    }
}

pub(super) fn image_refs(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| format!("leads/lead-000001/photo-{index}.jpg"))
        .collect()
}

pub(super) fn confident_analysis(score: f64) -> PhotoAnalysisResult {
    let mut analysis = heuristic_from_photo_count(8);
    analysis.condition_score = score;
    analysis.confidence = 0.85;
    analysis.flags.model = "stub-vision-1".to_string();
    analysis
}

pub(super) fn with_observations(
    mut analysis: PhotoAnalysisResult,
    kitchen: ObservedKitchen,
    overall: ObservedOverall,
    water: ObservedWaterIssues,
    risk: ObservedSystemRisk,
) -> PhotoAnalysisResult {
    analysis.observed_kitchen = kitchen;
    analysis.observed_overall = overall;
    analysis.observed_water_issues = water;
    analysis.observed_system_risk = risk;
    analysis
}
