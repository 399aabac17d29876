use super::policy::PursueScoring;
use super::{Valuation, ValuationEngine};

impl ValuationEngine {
    /// Relative offer bump implied by a photo condition score and its confidence.
    ///
    /// Zero at the neutral score regardless of confidence.
    pub fn photo_bump(&self, condition_score: f64, confidence: f64) -> f64 {
        let photo = &self.policy().photo;
        let score = if condition_score.is_finite() {
            condition_score.clamp(0.0, 100.0)
        } else {
            photo.neutral_score
        };
        let confidence = sanitize_fraction(confidence);

        let condition_delta = (score - photo.neutral_score) / photo.score_divisor;
        let confidence_weight = photo.confidence_floor + confidence * photo.confidence_slope;
        condition_delta * confidence_weight
    }

    /// Applies an independent photo-evidence correction on top of an engine result.
    ///
    /// Offers scale by `1 + bump`; pursue score and confidence move up proportionally
    /// and stay within their caps. The input valuation is left untouched.
    pub fn adjust_for_photo_analysis(
        &self,
        valuation: &Valuation,
        condition_score: f64,
        confidence: f64,
    ) -> Valuation {
        let photo = &self.policy().photo;
        let bump = self.photo_bump(condition_score, confidence);
        let confidence = sanitize_fraction(confidence);

        let mut adjusted = valuation.clone();
        adjusted.scale_offers(bump);
        if matches!(self.policy().pursue, PursueScoring::Heuristic(_)) {
            adjusted.nudge_pursue(bump * photo.pursue_gain);
        }
        adjusted.raise_confidence(confidence * photo.confidence_gain, photo.confidence_cap);
        adjusted
            .explanation_bullets
            .push(format!("Photo review adjusted range by {:+.1}%.", bump * 100.0));
        adjusted
    }
}

fn sanitize_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
