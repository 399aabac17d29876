use crate::infra::build_lead_service;
use clap::Args;
use offer_desk::config::{AppConfig, ValuationConfig};
use offer_desk::error::AppError;
use offer_desk::leads::{
    LeadImporter, LeadServiceError, LeadSubmission, NewPhoto, QuoteRequest, ValidationError,
    DEFAULT_RETENTION_DAYS,
};
use offer_desk::valuation::{
    format_currency, IntakeAnswers, IntakeSubmission, RentalAssumptions, SqftModelOffer,
    Valuation,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Baseline market value (after-repair value) in dollars
    #[arg(long)]
    pub(crate) baseline: f64,
    /// JSON file with intake answers (any supported schema revision)
    #[arg(long)]
    pub(crate) intake: Option<PathBuf>,
    /// Scoring policy JSON; defaults to SCORING_POLICY_PATH or the standard policy
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Current monthly rent, for the rent-gap adjustment
    #[arg(long)]
    pub(crate) current_rent: Option<f64>,
    /// Market monthly rent, for the rent-gap adjustment
    #[arg(long)]
    pub(crate) market_rent: Option<f64>,
    /// Print the quote as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export whose header row uses the intake field names
    pub(crate) csv: PathBuf,
    /// Scoring policy JSON; defaults to SCORING_POLICY_PATH or the standard policy
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Print one JSON lead summary per imported row
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Baseline market value for the sample lead
    #[arg(long, default_value_t = 200_000.0)]
    pub(crate) baseline: f64,
    /// Number of sample photos to register before analysis
    #[arg(long, default_value_t = 6)]
    pub(crate) photos: usize,
    /// Stop after the intake valuation
    #[arg(long)]
    pub(crate) skip_photos: bool,
}

fn valuation_config(policy: Option<PathBuf>) -> Result<ValuationConfig, AppError> {
    let mut config = AppConfig::load()?.valuation;
    if policy.is_some() {
        config.policy_path = policy;
    }
    Ok(config)
}

fn read_intake(path: Option<PathBuf>) -> Result<IntakeSubmission, AppError> {
    let Some(path) = path else {
        return Ok(IntakeSubmission::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let submission = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    Ok(submission)
}

pub(crate) fn render_valuation(valuation: &Valuation, sqft: &SqftModelOffer) {
    println!(
        "- Cash offer range: {} to {}",
        format_currency(valuation.cash_offer_low as f64),
        format_currency(valuation.cash_offer_high as f64)
    );
    println!(
        "- Confidence {:.0}% | pursue score {} | listing net {}",
        valuation.confidence * 100.0,
        valuation.pursue_score,
        format_currency(valuation.listing_net_estimate as f64)
    );
    println!(
        "- Sqft model ({}, ${}/sf): rehab {} -> offer {}",
        sqft.tier.label(),
        sqft.price_per_sqft,
        format_currency(sqft.rehab_cost as f64),
        format_currency(sqft.offer as f64)
    );
    println!("  Explanation:");
    for bullet in &valuation.explanation_bullets {
        println!("    - {}", bullet);
    }
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        baseline,
        intake,
        policy,
        current_rent,
        market_rent,
        json,
    } = args;

    let service = build_lead_service(&valuation_config(policy)?)?;
    let rental = (current_rent.is_some() || market_rent.is_some()).then(|| RentalAssumptions {
        current_rent,
        market_rent,
        ..RentalAssumptions::default()
    });
    let quote = service
        .quote(QuoteRequest {
            baseline_market_value: Some(baseline),
            intake: read_intake(intake)?,
            rental,
        })
        .map_err(LeadServiceError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quote).map_err(std::io::Error::from)?);
    } else {
        println!("Quote for {} baseline", format_currency(baseline));
        render_valuation(&quote.valuation, &quote.sqft_model);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ImportedRow {
    line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<String>,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cash_offer_low: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cash_offer_high: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pursue_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let service = build_lead_service(&valuation_config(args.policy)?)?;
    let rows = LeadImporter::from_path(&args.csv)?;

    let mut accepted = 0usize;
    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let address = format!(
            "{}, {}, {} {}",
            row.submission.street.trim(),
            row.submission.city.trim(),
            row.submission.state.trim(),
            row.submission.zip.trim()
        );
        let summary = match service.create(row.submission) {
            Ok(record) => {
                accepted += 1;
                ImportedRow {
                    line: row.line,
                    lead_id: Some(record.lead.id.to_string()),
                    address,
                    cash_offer_low: Some(record.valuation.cash_offer_low),
                    cash_offer_high: Some(record.valuation.cash_offer_high),
                    pursue_score: Some(record.valuation.pursue_score),
                    rejected: None,
                }
            }
            Err(LeadServiceError::Validation(err)) => ImportedRow {
                line: row.line,
                lead_id: None,
                address,
                cash_offer_low: None,
                cash_offer_high: None,
                pursue_score: None,
                rejected: Some(err.to_string()),
            },
            Err(err) => return Err(err.into()),
        };
        summaries.push(summary);
    }

    if args.json {
        for summary in &summaries {
            println!("{}", serde_json::to_string(summary).map_err(std::io::Error::from)?);
        }
        return Ok(());
    }

    println!(
        "Imported {} of {} rows from {}",
        accepted,
        summaries.len(),
        args.csv.display()
    );
    for summary in &summaries {
        match (&summary.rejected, summary.cash_offer_low, summary.cash_offer_high) {
            (Some(reason), _, _) => {
                println!("- line {}: rejected ({})", summary.line, reason)
            }
            (None, Some(low), Some(high)) => println!(
                "- line {}: {} -> {} to {} (pursue {})",
                summary.line,
                summary.address,
                format_currency(low as f64),
                format_currency(high as f64),
                summary.pursue_score.unwrap_or(0)
            ),
            _ => println!("- line {}: {}", summary.line, summary.address),
        }
    }
    Ok(())
}

fn demo_submission(baseline: f64) -> LeadSubmission {
    LeadSubmission {
        street: "2207 Forest Ave".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50311".to_string(),
        seller_name: Some("Sample Seller".to_string()),
        seller_phone: None,
        seller_email: None,
        created_by: Some("cli-demo".to_string()),
        baseline_market_value: Some(baseline),
        intake: IntakeSubmission::Current(IntakeAnswers {
            occupancy: "tenant".to_string(),
            timeline: "asap".to_string(),
            motivation: "high".to_string(),
            condition_overall: "dated".to_string(),
            kitchen_condition: "dated".to_string(),
            bathrooms_condition: "dated".to_string(),
            roof_condition: "older".to_string(),
            mechanicals_condition: "average".to_string(),
            electrical: "outdated".to_string(),
            plumbing: "serviceable".to_string(),
            foundation: "minor".to_string(),
            water_issues: "no".to_string(),
            square_feet: Some(1650.0),
            beds: Some(3.0),
            baths: Some(2.0),
            roof_age: Some(18.0),
            notes: Some("Long-term tenant, lease ends next month. Basement dry.".to_string()),
            rehab_price_model_tier: Some("full_rehab_interior_cosmetics".to_string()),
            ..IntakeAnswers::default()
        }),
        rental: Some(RentalAssumptions {
            current_rent: Some(1250.0),
            market_rent: Some(1600.0),
            ..RentalAssumptions::default()
        }),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = build_lead_service(&ValuationConfig {
        policy_path: None,
        retention_days: DEFAULT_RETENTION_DAYS,
    })?;

    println!("Offer desk demo");
    let record = match service.create(demo_submission(args.baseline)) {
        Ok(record) => record,
        Err(LeadServiceError::Validation(ValidationError::MissingBaseline)) => {
            println!("  Baseline must be a positive dollar amount");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "\nLead {} at {}",
        record.lead.id,
        record.lead.address.one_line()
    );
    render_valuation(&record.valuation, &record.sqft_model());

    if args.skip_photos || args.photos == 0 {
        return Ok(());
    }

    for index in 1..=args.photos {
        let photo = NewPhoto {
            file_name: format!("walkthrough-{index:02}.jpg"),
            content_type: None,
            size_bytes: 350_000,
            storage_path: None,
        };
        if let Err(err) = service.add_photo(&record.lead.id, photo) {
            println!("  Photo rejected: {}", err);
        }
    }

    let outcome = service.analyze_photos(&record.lead.id)?;
    println!(
        "\nPhoto analysis ({:?}, model {}): score {:.0}, confidence {:.0}%, {} / {}",
        outcome.mode,
        outcome.analysis.flags.model,
        outcome.analysis.condition_score,
        outcome.analysis.confidence * 100.0,
        outcome.analysis.update_level.label(),
        outcome.analysis.rehab_tier.label()
    );
    for observation in &outcome.analysis.observations {
        println!("  - {}", observation);
    }
    println!("\nRevalued lead");
    render_valuation(&outcome.valuation, &record.sqft_model());

    let stored = service.get(&record.lead.id)?;
    match serde_json::to_string_pretty(&stored.summary_view()) {
        Ok(json) => println!("\nSummary payload:\n{}", json),
        Err(err) => println!("\nSummary payload unavailable: {}", err),
    }
    Ok(())
}
