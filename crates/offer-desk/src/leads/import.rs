use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};

use super::domain::LeadSubmission;
use crate::valuation::{IntakeAnswers, IntakeSubmission, RentalAssumptions};

const RENTAL_COLUMNS: [&str; 4] = ["current_rent", "market_rent", "mgmt_mode", "mgmt_pct"];

#[derive(Debug)]
pub enum LeadImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, message: String },
}

impl std::fmt::Display for LeadImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadImportError::Io(err) => write!(f, "failed to read lead export: {}", err),
            LeadImportError::Csv(err) => write!(f, "invalid lead CSV data: {}", err),
            LeadImportError::Row { line, message } => {
                write!(f, "could not map row on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for LeadImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeadImportError::Io(err) => Some(err),
            LeadImportError::Csv(err) => Some(err),
            LeadImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for LeadImportError {
    fn from(value: std::io::Error) -> Self {
        LeadImportError::Io(value)
    }
}

impl From<csv::Error> for LeadImportError {
    fn from(value: csv::Error) -> Self {
        LeadImportError::Csv(value)
    }
}

/// One CSV row mapped onto a lead submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedLead {
    pub line: u64,
    pub submission: LeadSubmission,
}

/// Reads bulk lead spreadsheets whose header row uses the intake field names.
///
/// Address and baseline columns sit beside the intake columns; rental columns are
/// optional. Unknown columns are ignored.
pub struct LeadImporter;

impl LeadImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<ImportedLead>, LeadImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ImportedLead>, LeadImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
            .collect();

        let mut leads = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or(0);
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let row: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .filter(|(_, field)| !field.is_empty())
                .map(|(header, field)| (header.clone(), Value::String(field.to_string())))
                .collect();

            let submission = map_row(row).map_err(|err| LeadImportError::Row {
                line,
                message: err.to_string(),
            })?;
            leads.push(ImportedLead { line, submission });
        }

        Ok(leads)
    }
}

fn map_row(row: Map<String, Value>) -> Result<LeadSubmission, serde_json::Error> {
    let has_rental = RENTAL_COLUMNS.iter().any(|column| row.contains_key(*column));
    let value = Value::Object(row);

    let mut submission: LeadSubmission = serde_json::from_value(value.clone())?;
    let intake: IntakeAnswers = serde_json::from_value(value.clone())?;
    submission.intake = IntakeSubmission::Current(intake);
    submission.rental = if has_rental {
        Some(serde_json::from_value::<RentalAssumptions>(value)?)
    } else {
        None
    };
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\u{feff}street,city,state,zip,baseline_market_value,condition_overall,kitchen_condition,square_feet,market_rent,current_rent,internal_note
12 Elm St,Des Moines,IA,50309,200000,standard,average,1800,2000,1400,call after 5
,,,,,,,,,,
9 Oak Ave,Ames,IA,50010,$150k,dated,dated,,,,
";

    #[test]
    fn maps_rows_onto_submissions() {
        let leads = LeadImporter::from_reader(EXPORT.as_bytes()).expect("export parses");

        assert_eq!(leads.len(), 2);
        let first = &leads[0].submission;
        assert_eq!(first.street, "12 Elm St");
        assert_eq!(first.baseline_market_value, Some(200_000.0));
        let intake = first.intake.clone().into_current();
        assert_eq!(intake.condition_overall, "standard");
        assert_eq!(intake.square_feet, Some(1800.0));
        let rental = first.rental.as_ref().expect("rental columns present");
        assert_eq!(rental.market_rent, Some(2000.0));
        assert_eq!(rental.current_rent, Some(1400.0));
    }

    #[test]
    fn unparseable_numbers_become_missing_values() {
        let leads = LeadImporter::from_reader(EXPORT.as_bytes()).expect("export parses");

        let second = &leads[1].submission;
        assert_eq!(second.city, "Ames");
        assert_eq!(second.baseline_market_value, None);
        assert!(second.rental.is_none());
        assert_eq!(leads[1].line, 4);
    }

    #[test]
    fn missing_files_surface_io_errors() {
        match LeadImporter::from_path("/nonexistent/leads.csv") {
            Err(LeadImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
