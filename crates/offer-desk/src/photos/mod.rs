//! Photo condition analysis and the revaluation pipeline that folds it into a valuation.

pub mod analysis;
pub mod pipeline;
pub mod vision;

#[cfg(test)]
mod tests;

pub use analysis::{
    heuristic_from_photo_count, AnalysisMode, ObservedKitchen, ObservedOverall,
    ObservedSystemRisk, ObservedWaterIssues, PhotoAnalysisResult, PhotoFlags, PhotoRehabTier,
    UpdateLevel, HEURISTIC_MODEL,
};
pub use pipeline::{merge_photo_signals, revalue_with_photos, PhotoOverrides, PhotoRevaluation};
pub use vision::{analyze_photos, parse_vision_output, VisionAnalyzer, VisionError};
