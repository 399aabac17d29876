use std::sync::Arc;

use chrono::Duration;

use super::common::*;
use crate::leads::domain::{LeadId, LeadUpdate, NewPhoto, QuoteRequest, SqftOfferRequest};
use crate::leads::repository::RepositoryError;
use crate::leads::{LeadIntakeService, LeadServiceError, ValidationError};
use crate::photos::AnalysisMode;
use crate::valuation::{IntakeSubmission, RehabTier, ValuationEngine};

#[test]
fn create_stores_trimmed_lead_with_valuation() {
    let (service, repository) = build_service();

    let record = service
        .create_at(submission(), submitted_at())
        .expect("lead stored");

    assert!(record.lead.id.0.starts_with("lead-"));
    assert_eq!(record.lead.address.street, "1418 Grand Ave");
    assert_eq!(record.lead.created_at, submitted_at());
    assert_eq!(record.valuation.cash_offer_low, 126_720);
    assert_eq!(record.valuation.cash_offer_high, 135_360);
    assert_eq!(record.valuation.pursue_score, 65);
    assert_eq!(record.valuation.confidence, 0.62);
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .contains_key(&record.lead.id));
}

#[test]
fn create_rejects_missing_address_fields_before_storing() {
    let (service, repository) = build_service();
    let mut submission = submission();
    submission.street = "   ".to_string();
    submission.zip = String::new();

    match service.create(submission) {
        Err(LeadServiceError::Validation(ValidationError::MissingAddress(fields))) => {
            assert_eq!(fields, "street, zip");
        }
        other => panic!("expected missing address error, got {other:?}"),
    }
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn create_requires_a_positive_baseline() {
    let (service, _) = build_service();

    for baseline in [None, Some(0.0), Some(-10.0), Some(f64::NAN)] {
        let mut submission = submission();
        submission.baseline_market_value = baseline;
        assert!(matches!(
            service.create(submission),
            Err(LeadServiceError::Validation(ValidationError::MissingBaseline))
        ));
    }
}

#[test]
fn create_applies_the_rent_gap_when_rents_are_known() {
    let (service, _) = build_service();
    let mut submission = submission();
    submission.rental = Some(rental());

    let record = service.create(submission).expect("lead stored");

    assert_eq!(record.valuation.cash_offer_low, 130_522);
    assert!(record
        .valuation
        .explanation_bullets
        .last()
        .is_some_and(|line| line.starts_with("Rent gap:")));
}

#[test]
fn update_recomputes_the_valuation_wholesale() {
    let (service, _) = build_service();
    let id = create_lead(&service);
    service.add_photo(&id, jpeg("front.jpg")).expect("photo stored");
    service.analyze_photos(&id).expect("analysis runs");

    let mut answers = intake();
    answers.kitchen_condition = "needs_replaced".to_string();
    let updated = service
        .update(
            &id,
            LeadUpdate {
                intake: Some(IntakeSubmission::Current(answers)),
                ..LeadUpdate::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(updated.valuation.cash_offer_low, 116_160);
    assert!(updated.photo_analysis.is_none());
    assert_eq!(updated.photos.len(), 1);
    assert!(!updated
        .valuation
        .explanation_bullets
        .iter()
        .any(|line| line.starts_with("Photo review")));
}

#[test]
fn update_rejects_unknown_leads() {
    let (service, _) = build_service();

    let result = service.update(&LeadId("lead-missing".to_string()), LeadUpdate::default());

    assert!(matches!(
        result,
        Err(LeadServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn photos_must_be_non_empty_images() {
    let (service, _) = build_service();
    let id = create_lead(&service);

    let pdf = NewPhoto {
        content_type: Some("application/pdf".to_string()),
        ..jpeg("disclosure.pdf")
    };
    let empty = NewPhoto {
        size_bytes: 0,
        ..jpeg("kitchen.jpg")
    };
    let undeclared = NewPhoto {
        content_type: None,
        ..jpeg("porch.png")
    };

    for photo in [pdf, empty, undeclared] {
        assert!(matches!(
            service.add_photo(&id, photo),
            Err(LeadServiceError::Validation(ValidationError::UnsupportedPhoto { .. }))
        ));
    }
    assert!(service.get(&id).expect("lead exists").photos.is_empty());
}

#[test]
fn guessed_content_types_are_accepted() {
    let (service, _) = build_service();
    let service = service.with_content_type_guesser(|name| {
        name.ends_with(".png").then_some(mime::IMAGE_PNG)
    });
    let id = create_lead(&service);

    let stored = service
        .add_photo(
            &id,
            NewPhoto {
                content_type: None,
                ..jpeg("porch.png")
            },
        )
        .expect("photo stored");

    assert_eq!(stored.content_type, "image/png");
    assert!(stored.storage_path.starts_with(&format!("{}/photo-", id)));
    assert!(stored.storage_path.ends_with("-porch.png"));
}

#[test]
fn analysis_requires_photos() {
    let (service, _) = build_service();
    let id = create_lead(&service);

    assert!(matches!(
        service.analyze_photos(&id),
        Err(LeadServiceError::Validation(ValidationError::NoPhotos))
    ));
}

#[test]
fn heuristic_analysis_nudges_the_stored_valuation() {
    let (service, _) = build_service();
    let id = create_lead(&service);
    for name in ["front.jpg", "kitchen.jpg", "bath.jpg"] {
        service.add_photo(&id, jpeg(name)).expect("photo stored");
    }

    let outcome = service.analyze_photos(&id).expect("analysis runs");

    assert_eq!(outcome.mode, AnalysisMode::Heuristic);
    assert_eq!(outcome.analysis.condition_score, 74.0);
    assert!(outcome.overrides_applied.is_empty());
    assert_eq!(outcome.valuation.cash_offer_low, 128_920);
    let stored = service.get(&id).expect("lead exists");
    assert_eq!(stored.valuation, outcome.valuation);
    assert_eq!(stored.photo_analysis.as_ref(), Some(&outcome.analysis));
}

#[test]
fn confident_vision_results_override_intake_answers() {
    let (service, _) = build_service();
    let service = service.with_vision(Arc::new(DatedKitchenVision));
    let id = create_lead(&service);
    for name in ["front.jpg", "kitchen.jpg", "bath.jpg"] {
        service.add_photo(&id, jpeg(name)).expect("photo stored");
    }

    let outcome = service.analyze_photos(&id).expect("analysis runs");

    assert_eq!(outcome.mode, AnalysisMode::Vision);
    assert_eq!(outcome.overrides_applied, vec!["kitchen_condition".to_string()]);
    assert_eq!(
        outcome.analysis.observations[0],
        "Overrides applied: kitchen_condition."
    );
    assert_eq!(
        outcome.analysis.observations[1],
        "Vision model reviewed 3 photo(s)."
    );
    assert_eq!(
        outcome.valuation.explanation_bullets[0],
        "Photo evidence overrode intake kitchen rating: average → dated."
    );
    assert!(outcome.valuation.cash_offer_high < 135_360);
}

#[test]
fn vision_sees_only_the_ten_most_recent_photos() {
    let (service, _) = build_service();
    let service = service.with_vision(Arc::new(DatedKitchenVision));
    let id = create_lead(&service);
    for index in 0..12 {
        service
            .add_photo_at(
                &id,
                jpeg(&format!("room-{index}.jpg")),
                submitted_at() + Duration::minutes(index),
            )
            .expect("photo stored");
    }

    let outcome = service.analyze_photos(&id).expect("analysis runs");

    assert!(outcome
        .analysis
        .observations
        .iter()
        .any(|line| line == "Vision model reviewed 10 photo(s)."));
}

#[test]
fn vision_outages_fall_back_to_the_heuristic() {
    let (service, _) = build_service();
    let service = service.with_vision(Arc::new(OfflineVision));
    let id = create_lead(&service);
    service.add_photo(&id, jpeg("front.jpg")).expect("photo stored");

    let outcome = service.analyze_photos(&id).expect("analysis still succeeds");

    assert_eq!(outcome.mode, AnalysisMode::Heuristic);
    assert_eq!(
        outcome.analysis.observations[0],
        "Vision model unavailable; used fallback heuristic."
    );
}

#[test]
fn repeated_analysis_does_not_compound() {
    let (service, _) = build_service();
    let id = create_lead(&service);
    service.add_photo(&id, jpeg("front.jpg")).expect("photo stored");

    let first = service.analyze_photos(&id).expect("first run");
    let second = service.analyze_photos(&id).expect("second run");

    assert_eq!(first.valuation, second.valuation);
}

#[test]
fn purge_drops_leads_past_the_retention_window() {
    let (service, repository) = build_service();
    create_lead(&service);

    assert_eq!(
        service
            .purge_expired(submitted_at() + Duration::days(6))
            .expect("purge runs"),
        0
    );
    assert_eq!(
        service
            .purge_expired(submitted_at() + Duration::days(8))
            .expect("purge runs"),
        1
    );
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn retention_window_is_configurable() {
    let (service, _) = build_service();
    let service = service.with_retention_days(30);
    create_lead(&service);

    let removed = service
        .purge_expired(submitted_at() + Duration::days(8))
        .expect("purge runs");

    assert_eq!(removed, 0);
}

#[test]
fn oversized_retention_windows_expire_nothing() {
    let (service, repository) = build_service();
    let service = service.with_retention_days(u32::MAX);
    create_lead(&service);

    let removed = service
        .purge_expired(submitted_at() + Duration::days(30))
        .expect("purge runs");

    assert_eq!(removed, 0);
    assert_eq!(
        repository
            .records
            .lock()
            .expect("repository mutex poisoned")
            .len(),
        1
    );
}

#[test]
fn concurrent_photo_uploads_are_all_kept() {
    let repository = Arc::new(LockstepRepository::new(2));
    let service = LeadIntakeService::new(repository.clone(), ValuationEngine::standard());
    let id = service
        .create_at(submission(), submitted_at())
        .expect("lead stored")
        .lead
        .id;

    std::thread::scope(|scope| {
        let front = scope.spawn(|| service.add_photo(&id, jpeg("front.jpg")));
        let kitchen = scope.spawn(|| service.add_photo(&id, jpeg("kitchen.jpg")));
        front.join().expect("front upload thread").expect("front stored");
        kitchen.join().expect("kitchen upload thread").expect("kitchen stored");
    });

    let stored = service.get(&id).expect("lead exists");
    let mut names: Vec<&str> = stored
        .photos
        .iter()
        .map(|photo| photo.file_name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["front.jpg", "kitchen.jpg"]);
}

#[test]
fn analysis_never_overwrites_an_edit_made_while_it_ran() {
    let (service, repository) = build_service();
    let id = create_lead(&service);
    service
        .add_photo_at(&id, jpeg("kitchen.jpg"), submitted_at())
        .expect("photo stored");
    let service = service.with_vision(Arc::new(EditingVision {
        repository: repository.clone(),
        lead: id.clone(),
    }));

    let result = service.analyze_photos(&id);

    assert!(matches!(
        result,
        Err(LeadServiceError::Repository(RepositoryError::Stale))
    ));
    let stored = service.get(&id).expect("lead exists");
    assert_eq!(stored.intake.kitchen_condition, "needs_replaced");
    assert!(stored.photo_analysis.is_none());
    assert_eq!(stored.photos.len(), 1);
}

#[test]
fn list_returns_newest_first() {
    let (service, _) = build_service();
    let older = create_lead(&service);
    let mut later = submission();
    later.street = "22 Locust St".to_string();
    let newer = service
        .create_at(later, submitted_at() + Duration::hours(1))
        .expect("lead stored")
        .lead
        .id;

    let records = service.list(10).expect("list works");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].lead.id, newer);
    assert_eq!(records[1].lead.id, older);
}

#[test]
fn quotes_price_without_storing() {
    let (service, repository) = build_service();

    let quote = service
        .quote(QuoteRequest {
            baseline_market_value: Some(200_000.0),
            intake: IntakeSubmission::Current(intake()),
            rental: None,
        })
        .expect("quote succeeds");

    assert_eq!(quote.valuation.cash_offer_low, 126_720);
    assert_eq!(quote.sqft_model.tier, RehabTier::MidRehab);
    assert_eq!(quote.sqft_model.rehab_cost, 45_000);
    assert_eq!(quote.sqft_model.offer, 155_000);
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn sqft_offers_require_a_positive_arv() {
    let (service, _) = build_service();

    let offer = service
        .sqft_offer(SqftOfferRequest {
            arv: Some(250_000.0),
            square_feet: Some(1200.0),
            tier: Some("gut_job".to_string()),
        })
        .expect("offer computed");
    assert_eq!(offer.offer, 175_600);

    assert!(matches!(
        service.sqft_offer(SqftOfferRequest::default()),
        Err(ValidationError::InvalidArv)
    ));
}

#[test]
fn repository_outages_surface_as_repository_errors() {
    let service = LeadIntakeService::new(Arc::new(UnavailableRepository), ValuationEngine::standard());

    assert!(matches!(
        service.create(submission()),
        Err(LeadServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
