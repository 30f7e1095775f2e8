//! Insured-person records
//!
//! A [`Record`] is the fixed-shape input shared by training and serving.
//! Numeric and categorical fields are named by closed enums so iteration
//! order is part of the type, not something discovered from the data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CoreError, Result};

/// Numeric fields, in encoded column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Age,
    Bmi,
    Children,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [NumericField::Age, NumericField::Bmi, NumericField::Children];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Age => "age",
            NumericField::Bmi => "bmi",
            NumericField::Children => "children",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical fields, in encoded column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Sex,
    Smoker,
    Region,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::Sex,
        CategoricalField::Smoker,
        CategoricalField::Region,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Sex => "sex",
            CategoricalField::Smoker => "smoker",
            CategoricalField::Region => "region",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Oldest accepted age, in years
pub const MAX_AGE: u32 = 150;
/// Largest accepted body-mass index
pub const MAX_BMI: f64 = 200.0;
/// Most dependents accepted on one policy
pub const MAX_CHILDREN: u32 = 20;

/// One insured individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub age: u32,
    pub sex: String,
    pub bmi: f64,
    pub children: u32,
    pub smoker: String,
    pub region: String,
}

impl Record {
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Age => f64::from(self.age),
            NumericField::Bmi => self.bmi,
            NumericField::Children => f64::from(self.children),
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Sex => &self.sex,
            CategoricalField::Smoker => &self.smoker,
            CategoricalField::Region => &self.region,
        }
    }

    /// Range checks applied at every boundary (CSV rows, forms, JSON bodies)
    pub fn validate(&self) -> Result<()> {
        if self.age > MAX_AGE {
            return Err(CoreError::invalid("age", format!("must be at most {MAX_AGE}, got {}", self.age)));
        }
        if !self.bmi.is_finite() || self.bmi <= 0.0 || self.bmi > MAX_BMI {
            return Err(CoreError::invalid(
                "bmi",
                format!("must be a positive number no greater than {MAX_BMI}, got {}", self.bmi),
            ));
        }
        if self.children > MAX_CHILDREN {
            return Err(CoreError::invalid(
                "children",
                format!("must be at most {MAX_CHILDREN}, got {}", self.children),
            ));
        }

        for field in CategoricalField::ALL {
            if normalize_category(self.categorical(field)).is_empty() {
                return Err(CoreError::invalid(field.name(), "must not be empty"));
            }
        }

        Ok(())
    }
}

/// Canonical spelling of a category value: trimmed and lower-cased
pub fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Untyped field values as they arrive from an HTML form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub age: Option<String>,
    pub sex: Option<String>,
    pub bmi: Option<String>,
    pub children: Option<String>,
    pub smoker: Option<String>,
    pub region: Option<String>,
}

impl TryFrom<RawRecord> for Record {
    type Error = CoreError;

    fn try_from(raw: RawRecord) -> Result<Self> {
        let record = Record {
            age: parse_count("age", raw.age)?,
            sex: required("sex", raw.sex)?,
            bmi: parse_float("bmi", raw.bmi)?,
            children: parse_count("children", raw.children)?,
            smoker: required("smoker", raw.smoker)?,
            region: required("region", raw.region)?,
        };
        record.validate()?;
        Ok(record)
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::MissingField(field)),
    }
}

fn parse_count(field: &'static str, value: Option<String>) -> Result<u32> {
    let text = required(field, value)?;
    text.trim()
        .parse::<u32>()
        .map_err(|_| CoreError::invalid(field, format!("expected a non-negative integer, got {text:?}")))
}

fn parse_float(field: &'static str, value: Option<String>) -> Result<f64> {
    let text = required(field, value)?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| CoreError::invalid(field, format!("expected a number, got {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawRecord {
        RawRecord {
            age: Some("19".into()),
            sex: Some("female".into()),
            bmi: Some("27.9".into()),
            children: Some("0".into()),
            smoker: Some("yes".into()),
            region: Some("southwest".into()),
        }
    }

    #[test]
    fn parses_complete_form() {
        let record = Record::try_from(raw()).unwrap();
        assert_eq!(record.age, 19);
        assert_eq!(record.bmi, 27.9);
        assert_eq!(record.children, 0);
        assert_eq!(record.categorical(CategoricalField::Region), "southwest");
        assert_eq!(record.numeric(NumericField::Age), 19.0);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut form = raw();
        form.smoker = None;
        match Record::try_from(form) {
            Err(CoreError::MissingField(field)) => assert_eq!(field, "smoker"),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut form = raw();
        form.region = Some("   ".into());
        assert!(matches!(Record::try_from(form), Err(CoreError::MissingField("region"))));
    }

    #[test]
    fn unparseable_numbers_are_rejected() {
        let mut form = raw();
        form.age = Some("nineteen".into());
        assert!(matches!(
            Record::try_from(form),
            Err(CoreError::InvalidField { field: "age", .. })
        ));

        let mut form = raw();
        form.children = Some("-1".into());
        assert!(matches!(
            Record::try_from(form),
            Err(CoreError::InvalidField { field: "children", .. })
        ));

        let mut form = raw();
        form.bmi = Some("NaN".into());
        assert!(matches!(
            Record::try_from(form),
            Err(CoreError::InvalidField { field: "bmi", .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            ("age", RawRecord { age: Some("151".into()), ..raw() }),
            ("bmi", RawRecord { bmi: Some("1e308".into()), ..raw() }),
            ("bmi", RawRecord { bmi: Some("200.5".into()), ..raw() }),
            ("children", RawRecord { children: Some("1000".into()), ..raw() }),
        ];
        for (expected, form) in cases {
            match Record::try_from(form) {
                Err(CoreError::InvalidField { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: unexpected result {other:?}"),
            }
        }

        let edge = RawRecord {
            age: Some(MAX_AGE.to_string()),
            bmi: Some(MAX_BMI.to_string()),
            children: Some(MAX_CHILDREN.to_string()),
            ..raw()
        };
        assert!(Record::try_from(edge).is_ok());
    }

    #[test]
    fn category_normalization() {
        assert_eq!(normalize_category("  SouthWest "), "southwest");
        assert_eq!(normalize_category("yes"), "yes");
    }

    #[test]
    fn field_order_is_fixed() {
        let names: Vec<_> = NumericField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["age", "bmi", "children"]);
        let names: Vec<_> = CategoricalField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["sex", "smoker", "region"]);
    }
}
