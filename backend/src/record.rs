use crate::error::PipelineError;
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single survey answer: categorical text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Field values as submitted, keyed by feature name.
pub type RawFields = HashMap<String, FeatureValue>;

/// One row of values laid out in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: Vec<FeatureValue>,
}

impl FeatureRecord {
    /// Reorders `raw` into schema order. Every schema feature must be present
    /// and every submitted field must belong to the schema.
    pub fn assemble(raw: &RawFields, schema: &FeatureSchema) -> Result<Self, PipelineError> {
        let missing: Vec<String> = schema
            .names()
            .iter()
            .filter(|name| !raw.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingFields(missing));
        }

        let mut unknown: Vec<String> = raw
            .keys()
            .filter(|key| !schema.contains(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(PipelineError::UnknownFields(unknown));
        }

        let values = schema
            .names()
            .iter()
            .filter_map(|name| raw.get(name.as_str()).cloned())
            .collect();
        Ok(Self { values })
    }

    pub fn from_values(values: Vec<FeatureValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["Job_Role", "Hours_Worked_Per_Week", "Work_Location"]).unwrap()
    }

    #[test]
    fn values_follow_schema_order() {
        let mut raw = RawFields::new();
        raw.insert("Work_Location".into(), "Hybrid".into());
        raw.insert("Job_Role".into(), "HR".into());
        raw.insert("Hours_Worked_Per_Week".into(), 52.0.into());

        let record = FeatureRecord::assemble(&raw, &schema()).unwrap();
        assert_eq!(
            record.values(),
            &[
                FeatureValue::Text("HR".into()),
                FeatureValue::Number(52.0),
                FeatureValue::Text("Hybrid".into()),
            ]
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let entries: Vec<(String, FeatureValue)> = vec![
            ("Job_Role".into(), "Manager".into()),
            ("Hours_Worked_Per_Week".into(), 61.0.into()),
            ("Work_Location".into(), "Remote".into()),
        ];
        let forward: RawFields = entries.iter().cloned().collect();
        let reversed: RawFields = entries.iter().rev().cloned().collect();

        let schema = schema();
        assert_eq!(
            FeatureRecord::assemble(&forward, &schema).unwrap(),
            FeatureRecord::assemble(&reversed, &schema).unwrap()
        );
    }

    #[test]
    fn missing_fields_are_reported_in_schema_order() {
        let mut raw = RawFields::new();
        raw.insert("Hours_Worked_Per_Week".into(), 40.0.into());

        let err = FeatureRecord::assemble(&raw, &schema()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingFields(vec!["Job_Role".into(), "Work_Location".into()])
        );
    }

    #[test]
    fn fields_outside_the_schema_are_rejected() {
        let mut raw = RawFields::new();
        raw.insert("Job_Role".into(), "HR".into());
        raw.insert("Hours_Worked_Per_Week".into(), 40.0.into());
        raw.insert("Work_Location".into(), "Remote".into());
        raw.insert("Stress_Level".into(), "High".into());
        raw.insert("Sleep_Quality".into(), "Poor".into());

        let err = FeatureRecord::assemble(&raw, &schema()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownFields(vec!["Sleep_Quality".into(), "Stress_Level".into()])
        );
    }

    #[test]
    fn untagged_values_deserialize_from_json() {
        let raw: RawFields =
            serde_json::from_str(r#"{"Job_Role": "HR", "Hours_Worked_Per_Week": 45}"#).unwrap();
        assert_eq!(raw["Job_Role"], FeatureValue::Text("HR".into()));
        assert_eq!(raw["Hours_Worked_Per_Week"], FeatureValue::Number(45.0));
    }
}
