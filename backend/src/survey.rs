//! Answer domains of the burnout questionnaire.

use crate::record::{FeatureValue, RawFields};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Choice { options: &'static [&'static str] },
    Integer { min: i64, max: i64 },
}

#[derive(Debug, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub default: DefaultValue,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(&'static str),
    Integer(i64),
}

pub static FIELDS: [FieldSpec; 11] = [
    FieldSpec {
        name: "Job_Role",
        label: "Job Role",
        kind: FieldKind::Choice {
            options: &["Software Engineer", "Data Analyst", "HR", "Marketing", "Manager"],
        },
        default: DefaultValue::Text("Software Engineer"),
    },
    FieldSpec {
        name: "Industry",
        label: "Industry",
        kind: FieldKind::Choice {
            options: &["Technology", "Healthcare", "Finance", "Education", "Other"],
        },
        default: DefaultValue::Text("Technology"),
    },
    FieldSpec {
        name: "Years_of_Experience",
        label: "Years of Experience",
        kind: FieldKind::Integer { min: 0, max: 40 },
        default: DefaultValue::Integer(3),
    },
    FieldSpec {
        name: "Work_Location",
        label: "Work Location",
        kind: FieldKind::Choice {
            options: &["Remote", "On-site", "Hybrid"],
        },
        default: DefaultValue::Text("Remote"),
    },
    FieldSpec {
        name: "Hours_Worked_Per_Week",
        label: "Hours Worked Per Week",
        kind: FieldKind::Integer { min: 0, max: 100 },
        default: DefaultValue::Integer(40),
    },
    FieldSpec {
        name: "Number_of_Virtual_Meetings",
        label: "Virtual Meetings per Week",
        kind: FieldKind::Integer { min: 0, max: 20 },
        default: DefaultValue::Integer(5),
    },
    FieldSpec {
        name: "Work_Life_Balance_Rating",
        label: "Work-Life Balance Rating (1 = Poor, 5 = Excellent)",
        kind: FieldKind::Integer { min: 1, max: 5 },
        default: DefaultValue::Integer(3),
    },
    FieldSpec {
        name: "Access_to_Mental_Health_Resources",
        label: "Access to Mental Health Resources",
        kind: FieldKind::Choice {
            options: &["Yes", "No"],
        },
        default: DefaultValue::Text("Yes"),
    },
    FieldSpec {
        name: "Social_Isolation_Rating",
        label: "Social Isolation Rating (1 = Low, 5 = High)",
        kind: FieldKind::Integer { min: 1, max: 5 },
        default: DefaultValue::Integer(3),
    },
    FieldSpec {
        name: "Satisfaction_with_Remote_Work",
        label: "Satisfaction with Remote Work",
        kind: FieldKind::Choice {
            options: &["Satisfied", "Neutral", "Dissatisfied"],
        },
        default: DefaultValue::Text("Satisfied"),
    },
    FieldSpec {
        name: "Physical_Activity",
        label: "Physical Activity",
        kind: FieldKind::Choice {
            options: &["Low", "Moderate", "High"],
        },
        default: DefaultValue::Text("Low"),
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl FieldSpec {
    fn check(&self, value: &FeatureValue) -> Result<(), String> {
        match (&self.kind, value) {
            (FieldKind::Choice { options }, FeatureValue::Text(s)) => {
                if options.contains(&s.as_str()) {
                    Ok(())
                } else {
                    Err(format!("'{s}' is not one of: {}", options.join(", ")))
                }
            }
            (FieldKind::Integer { min, max }, FeatureValue::Number(v)) => {
                if v.fract() != 0.0 || !v.is_finite() {
                    Err(format!("{v} is not a whole number"))
                } else if *v < *min as f64 || *v > *max as f64 {
                    Err(format!("{v} must be between {min} and {max}"))
                } else {
                    Ok(())
                }
            }
            (FieldKind::Choice { .. }, FeatureValue::Number(_)) => {
                Err("expected one of the listed options".to_string())
            }
            (FieldKind::Integer { .. }, FeatureValue::Text(_)) => {
                Err("expected a number".to_string())
            }
        }
    }
}

/// Checks the submitted answers against their domains. Absent fields and
/// fields outside the questionnaire are left to the prediction pipeline.
pub fn validate(raw: &RawFields) -> Result<(), Vec<FieldViolation>> {
    let violations: Vec<FieldViolation> = FIELDS
        .iter()
        .filter_map(|spec| {
            let value = raw.get(spec.name)?;
            spec.check(value).err().map(|reason| FieldViolation {
                field: spec.name.to_string(),
                reason,
            })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RawFields {
        FIELDS
            .iter()
            .map(|f| {
                let value = match f.default {
                    DefaultValue::Text(s) => FeatureValue::from(s),
                    DefaultValue::Integer(n) => FeatureValue::from(n),
                };
                (f.name.to_string(), value)
            })
            .collect()
    }

    #[test]
    fn defaults_are_within_their_domains() {
        assert_eq!(validate(&defaults()), Ok(()));
    }

    #[test]
    fn out_of_domain_answers_are_reported() {
        let mut raw = defaults();
        raw.insert("Job_Role".into(), "Astronaut".into());
        raw.insert("Work_Life_Balance_Rating".into(), 6.0.into());
        raw.insert("Hours_Worked_Per_Week".into(), 40.5.into());
        raw.insert("Physical_Activity".into(), 2.0.into());

        let violations = validate(&raw).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "Job_Role",
                "Hours_Worked_Per_Week",
                "Work_Life_Balance_Rating",
                "Physical_Activity"
            ]
        );
        assert_eq!(violations[2].reason, "6 must be between 1 and 5");
    }

    #[test]
    fn absent_and_foreign_fields_are_ignored_here() {
        let mut raw = RawFields::new();
        raw.insert("Industry".into(), "Finance".into());
        raw.insert("Stress_Level".into(), "High".into());
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn integer_field_serializes_its_range() {
        let spec = FIELDS
            .iter()
            .find(|f| f.name == "Number_of_Virtual_Meetings")
            .unwrap();
        let json = serde_json::to_value(spec).unwrap();
        assert_eq!(json["kind"], "integer");
        assert_eq!(json["max"], 20);
        assert_eq!(json["default"], 5);
    }
}
