use offer_desk::photos::{parse_vision_output, revalue_with_photos};
use offer_desk::valuation::{
    compute_sqft_model_offer, management_expense, ConditionProfile, IntakeAnswers,
    ManagementMode, RehabTier, RentalAssumptions, ScoringPolicy, ValuationEngine,
};

const BASELINE: f64 = 200_000.0;

fn answers() -> IntakeAnswers {
    IntakeAnswers {
        occupancy: "Vacant".to_string(),
        condition_overall: "standard".to_string(),
        kitchen_condition: "average".to_string(),
        bathrooms_condition: "average".to_string(),
        roof_condition: "average".to_string(),
        mechanicals_condition: "average".to_string(),
        electrical: "updated".to_string(),
        plumbing: "serviceable".to_string(),
        foundation: "good".to_string(),
        water_issues: "no".to_string(),
        square_feet: Some(1800.0),
        ..IntakeAnswers::default()
    }
}

#[test]
fn policy_files_replace_the_standard_offer_band() {
    let mut policy = serde_json::to_value(ScoringPolicy::standard()).expect("policy serializes");
    policy["revision"] = serde_json::json!("2025-06-conservative");
    policy["offer_band"] = serde_json::json!({ "low_pct": 0.8, "high_pct": 0.9 });
    let path = std::env::temp_dir().join(format!(
        "offer-desk-policy-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, serde_json::to_vec(&policy).expect("json bytes"))
        .expect("write policy file");

    let loaded = ScoringPolicy::from_path(&path);
    std::fs::remove_file(&path).ok();
    let engine = ValuationEngine::new(loaded.expect("policy file parses"));

    let valuation = engine.compute_answers(BASELINE, &answers());

    assert_eq!(engine.policy().revision, "2025-06-conservative");
    assert_eq!(valuation.cash_offer_low, 115_200);
    assert_eq!(valuation.cash_offer_high, 129_600);
    assert_eq!(valuation.listing_net_estimate, 166_400);
}

#[test]
fn invalid_policy_files_are_rejected() {
    let mut policy = serde_json::to_value(ScoringPolicy::standard()).expect("policy serializes");
    policy["offer_band"] = serde_json::json!({ "low_pct": 0.95, "high_pct": 0.9 });

    let result = ScoringPolicy::from_json(&policy.to_string());

    assert!(result.is_err());
}

#[test]
fn confident_system_risk_photos_reprice_the_whole_band() {
    let engine = ValuationEngine::standard();
    let profile = ConditionProfile::from(&answers());
    let analysis = parse_vision_output(
        r#"{"conditionScore": 40, "confidence": 0.9, "observedSystemRisk": "major",
            "observations": ["Exposed wiring in basement", "Foundation crack along east wall"]}"#,
        "stub-vision-1",
    )
    .expect("vision payload parses");

    let revaluation = revalue_with_photos(&engine, BASELINE, &profile, None, analysis);

    let valuation = &revaluation.valuation;
    assert_eq!(valuation.cash_offer_low, 20_270);
    assert_eq!(valuation.cash_offer_high, 27_666);
    assert_eq!(
        valuation
            .explanation_bullets
            .iter()
            .filter(|line| line.starts_with("Photo evidence flagged major system risk"))
            .count(),
        3
    );
    assert_eq!(
        valuation.explanation_bullets.last().map(String::as_str),
        Some("Photo review adjusted range by -14.4%.")
    );
    assert!(revaluation.overrides_applied.is_empty());
}

#[test]
fn rent_gap_and_photos_stack_on_the_recomputed_band() {
    let engine = ValuationEngine::standard();
    let profile = ConditionProfile::from(&answers());
    let rental = RentalAssumptions {
        current_rent: Some(1400.0),
        market_rent: Some(2000.0),
        ..RentalAssumptions::default()
    };
    let analysis = parse_vision_output(
        r#"{"conditionScore": 70, "confidence": 0.5}"#,
        "stub-vision-1",
    )
    .expect("vision payload parses");

    let revaluation = revalue_with_photos(&engine, BASELINE, &profile, Some(&rental), analysis);

    assert_eq!(revaluation.valuation.cash_offer_low, 130_522);
    let bullets = &revaluation.valuation.explanation_bullets;
    let rent_line = bullets
        .iter()
        .position(|line| line.starts_with("Rent gap:"))
        .expect("rent gap explained");
    let photo_line = bullets
        .iter()
        .position(|line| line.starts_with("Photo review"))
        .expect("photo review explained");
    assert!(rent_line < photo_line);
}

#[test]
fn sqft_model_stands_beside_the_engine_band() {
    let engine = ValuationEngine::standard();
    let valuation = engine.compute_answers(BASELINE, &answers());
    let sqft = compute_sqft_model_offer(BASELINE, Some(1800.0), RehabTier::MidRehab);

    assert_eq!(sqft.rehab_cost, 45_000);
    assert_eq!(sqft.offer, 155_000);
    assert!(sqft.offer > valuation.cash_offer_high);
}

#[test]
fn management_expense_follows_mode_unless_overridden() {
    let third_party = RentalAssumptions {
        mgmt_mode: ManagementMode::ThirdParty,
        ..RentalAssumptions::default()
    };
    let overridden = RentalAssumptions {
        mgmt_pct: Some(8.0),
        ..third_party.clone()
    };

    assert!((management_expense(24_000.0, &third_party) - 2_400.0).abs() < 1e-6);
    assert!((management_expense(24_000.0, &overridden) - 1_920.0).abs() < 1e-6);
    assert!((management_expense(24_000.0, &RentalAssumptions::default()) - 480.0).abs() < 1e-6);
}
