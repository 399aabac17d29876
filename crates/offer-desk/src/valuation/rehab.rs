use serde::{Deserialize, Serialize};

use super::profile::normalize_key;

/// Rehab scope used by the price-per-square-foot offer model, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RehabTier {
    LowRehabRentalAlmost,
    MidRehab,
    #[default]
    FullRehabInteriorCosmetics,
    AddExteriorCosmetics,
    FullRehabPlusBigTicket,
    GutJob,
}

impl RehabTier {
    pub const ALL: [RehabTier; 6] = [
        RehabTier::LowRehabRentalAlmost,
        RehabTier::MidRehab,
        RehabTier::FullRehabInteriorCosmetics,
        RehabTier::AddExteriorCosmetics,
        RehabTier::FullRehabPlusBigTicket,
        RehabTier::GutJob,
    ];

    /// Resolves a stored tier key; unknown or missing keys use the default tier.
    pub fn from_key(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let key = normalize_key(raw);
        Self::ALL
            .into_iter()
            .find(|tier| tier.key() == key)
            .unwrap_or_default()
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::LowRehabRentalAlmost => "low_rehab_rental_almost",
            Self::MidRehab => "mid_rehab",
            Self::FullRehabInteriorCosmetics => "full_rehab_interior_cosmetics",
            Self::AddExteriorCosmetics => "add_exterior_cosmetics",
            Self::FullRehabPlusBigTicket => "full_rehab_plus_big_ticket",
            Self::GutJob => "gut_job",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LowRehabRentalAlmost => "Low rehab (rental almost ready)",
            Self::MidRehab => "Mid rehab",
            Self::FullRehabInteriorCosmetics => "Full rehab (interior cosmetics)",
            Self::AddExteriorCosmetics => "Full rehab plus exterior cosmetics",
            Self::FullRehabPlusBigTicket => "Full rehab plus big-ticket items",
            Self::GutJob => "Gut job",
        }
    }

    pub const fn price_per_sqft(self) -> u32 {
        match self {
            Self::LowRehabRentalAlmost => 15,
            Self::MidRehab => 25,
            Self::FullRehabInteriorCosmetics => 35,
            Self::AddExteriorCosmetics => 40,
            Self::FullRehabPlusBigTicket => 45,
            Self::GutJob => 62,
        }
    }
}

/// Offer from subtracting a flat rehab budget from the after-repair value.
///
/// Shown beside the engine's band, never blended into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqftModelOffer {
    pub tier: RehabTier,
    pub price_per_sqft: u32,
    pub rehab_cost: u64,
    pub offer: u64,
}

/// `rehab_cost = square_feet * ppsf` and `offer = arv - rehab_cost`, both floored at zero.
/// A missing or unusable square footage costs nothing.
pub fn compute_sqft_model_offer(arv: f64, square_feet: Option<f64>, tier: RehabTier) -> SqftModelOffer {
    let price_per_sqft = tier.price_per_sqft();
    let square_feet = square_feet
        .filter(|sf| sf.is_finite() && *sf > 0.0)
        .unwrap_or(0.0);
    let rehab_cost = (square_feet * f64::from(price_per_sqft)).round().max(0.0);
    let arv = if arv.is_finite() { arv } else { 0.0 };
    let offer = (arv - rehab_cost).round().max(0.0);

    SqftModelOffer {
        tier,
        price_per_sqft,
        rehab_cost: rehab_cost as u64,
        offer: offer as u64,
    }
}
