use serde::{Deserialize, Deserializer, Serialize};

use super::profile::{
    non_negative_measure, positive_measure, water_flag_from_key, ConditionProfile,
    FinishCondition, FoundationCondition, LifespanCondition, Motivation, Occupancy,
    OverallCondition, SystemCondition, Timeline,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

/// Accepts numbers, numeric strings, empty strings, and null. Anything unparseable is `None`.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match raw {
        Some(LooseValue::Number(value)) => Some(value),
        Some(LooseValue::Text(text)) => text.trim().parse::<f64>().ok(),
        Some(LooseValue::Flag(_)) | None => None,
    }
    .filter(|value| value.is_finite()))
}

/// Accepts any scalar for a categorical answer; null becomes an empty (unknown) answer.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match raw {
        Some(LooseValue::Text(text)) => text,
        Some(LooseValue::Number(value)) => value.to_string(),
        Some(LooseValue::Flag(flag)) => if flag { "yes" } else { "no" }.to_string(),
        None => String::new(),
    })
}

pub(crate) fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_text(deserializer)?;
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Intake answers in the current (revision 3) wire shape.
///
/// Categorical answers travel as raw strings; [`ConditionProfile::from`] resolves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeAnswers {
    #[serde(deserialize_with = "lenient_text")]
    pub occupancy: String,
    #[serde(deserialize_with = "lenient_text")]
    pub timeline: String,
    #[serde(deserialize_with = "lenient_text")]
    pub motivation: String,
    #[serde(deserialize_with = "lenient_text")]
    pub condition_overall: String,
    #[serde(deserialize_with = "lenient_text")]
    pub kitchen_condition: String,
    #[serde(deserialize_with = "lenient_text")]
    pub bathrooms_condition: String,
    #[serde(deserialize_with = "lenient_text")]
    pub roof_condition: String,
    #[serde(deserialize_with = "lenient_text")]
    pub mechanicals_condition: String,
    #[serde(deserialize_with = "lenient_text")]
    pub electrical: String,
    #[serde(deserialize_with = "lenient_text")]
    pub plumbing: String,
    #[serde(deserialize_with = "lenient_text")]
    pub foundation: String,
    #[serde(deserialize_with = "lenient_text")]
    pub water_issues: String,
    #[serde(deserialize_with = "lenient_number")]
    pub square_feet: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub beds: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub baths: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub roof_age: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub hvac_age: Option<f64>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub rehab_price_model_tier: Option<String>,
}

/// Revision 1 wire shape: one kitchen/bath rating and numeric roof/HVAC ages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyIntakeAnswers {
    #[serde(deserialize_with = "lenient_text")]
    pub occupancy: String,
    #[serde(deserialize_with = "lenient_text")]
    pub timeline: String,
    #[serde(deserialize_with = "lenient_text")]
    pub motivation: String,
    #[serde(deserialize_with = "lenient_text")]
    pub condition_overall: String,
    #[serde(deserialize_with = "lenient_text")]
    pub kitchen_baths: String,
    #[serde(deserialize_with = "lenient_number")]
    pub roof_age: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub hvac_age: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub electrical: String,
    #[serde(deserialize_with = "lenient_text")]
    pub plumbing: String,
    #[serde(deserialize_with = "lenient_text")]
    pub foundation: String,
    #[serde(deserialize_with = "lenient_text")]
    pub water_issues: String,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub notes: Option<String>,
}

/// Schema-tagged intake payload.
///
/// Revision 2 is a strict subset of revision 3 (no plumbing, water, or age fields) and
/// therefore shares its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema_version")]
pub enum VersionedIntake {
    #[serde(rename = "v1")]
    V1(LegacyIntakeAnswers),
    #[serde(rename = "v3", alias = "v2")]
    V3(IntakeAnswers),
}

impl VersionedIntake {
    /// Migrates any revision into the canonical wire shape.
    pub fn into_current(self) -> IntakeAnswers {
        match self {
            VersionedIntake::V1(legacy) => IntakeAnswers::from(legacy),
            VersionedIntake::V3(answers) => answers,
        }
    }
}

/// Intake as accepted from clients: schema-tagged, or the current shape untagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntakeSubmission {
    Versioned(VersionedIntake),
    Current(IntakeAnswers),
}

impl Default for IntakeSubmission {
    fn default() -> Self {
        Self::Current(IntakeAnswers::default())
    }
}

impl IntakeSubmission {
    pub fn into_current(self) -> IntakeAnswers {
        match self {
            IntakeSubmission::Versioned(versioned) => versioned.into_current(),
            IntakeSubmission::Current(answers) => answers,
        }
    }
}

fn canonical_or_raw<T>(raw: &str, parse: fn(&str) -> Option<T>, key: fn(T) -> &'static str) -> String {
    parse(raw)
        .map(|value| key(value).to_string())
        .unwrap_or_else(|| raw.to_string())
}

impl From<LegacyIntakeAnswers> for IntakeAnswers {
    fn from(legacy: LegacyIntakeAnswers) -> Self {
        let finish = canonical_or_raw(
            &legacy.kitchen_baths,
            FinishCondition::from_key,
            FinishCondition::key,
        );
        let from_age = |age: Option<f64>| {
            age.and_then(LifespanCondition::from_age_years)
                .map(|rating| rating.key().to_string())
                .unwrap_or_default()
        };

        IntakeAnswers {
            occupancy: canonical_or_raw(&legacy.occupancy, Occupancy::from_key, Occupancy::key),
            timeline: canonical_or_raw(&legacy.timeline, Timeline::from_key, Timeline::key),
            motivation: canonical_or_raw(&legacy.motivation, Motivation::from_key, Motivation::key),
            condition_overall: canonical_or_raw(
                &legacy.condition_overall,
                OverallCondition::from_key,
                OverallCondition::key,
            ),
            kitchen_condition: finish.clone(),
            bathrooms_condition: finish,
            roof_condition: from_age(legacy.roof_age),
            mechanicals_condition: from_age(legacy.hvac_age),
            electrical: canonical_or_raw(
                &legacy.electrical,
                SystemCondition::from_key,
                SystemCondition::key,
            ),
            plumbing: canonical_or_raw(
                &legacy.plumbing,
                SystemCondition::from_key,
                SystemCondition::key,
            ),
            foundation: canonical_or_raw(
                &legacy.foundation,
                FoundationCondition::from_key,
                FoundationCondition::key,
            ),
            water_issues: legacy.water_issues,
            square_feet: None,
            beds: None,
            baths: None,
            roof_age: legacy.roof_age,
            hvac_age: legacy.hvac_age,
            notes: legacy.notes,
            rehab_price_model_tier: None,
        }
    }
}

impl From<&IntakeAnswers> for ConditionProfile {
    fn from(answers: &IntakeAnswers) -> Self {
        let roof_age = non_negative_measure(answers.roof_age);
        let hvac_age = non_negative_measure(answers.hvac_age);

        ConditionProfile {
            occupancy: Occupancy::from_key(&answers.occupancy),
            timeline: Timeline::from_key(&answers.timeline),
            motivation: Motivation::from_key(&answers.motivation),
            overall: OverallCondition::from_key(&answers.condition_overall),
            kitchen: FinishCondition::from_key(&answers.kitchen_condition),
            bathrooms: FinishCondition::from_key(&answers.bathrooms_condition),
            roof: LifespanCondition::from_key(&answers.roof_condition)
                .or_else(|| roof_age.and_then(LifespanCondition::from_age_years)),
            mechanicals: LifespanCondition::from_key(&answers.mechanicals_condition)
                .or_else(|| hvac_age.and_then(LifespanCondition::from_age_years)),
            electrical: SystemCondition::from_key(&answers.electrical),
            plumbing: SystemCondition::from_key(&answers.plumbing),
            foundation: FoundationCondition::from_key(&answers.foundation),
            water_issues: water_flag_from_key(&answers.water_issues),
            square_feet: positive_measure(answers.square_feet),
            beds: non_negative_measure(answers.beds),
            baths: non_negative_measure(answers.baths),
            roof_age,
            hvac_age,
            notes: answers
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
        }
    }
}

impl From<&LegacyIntakeAnswers> for ConditionProfile {
    fn from(legacy: &LegacyIntakeAnswers) -> Self {
        ConditionProfile::from(&IntakeAnswers::from(legacy.clone()))
    }
}
