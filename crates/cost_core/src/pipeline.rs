//! Inference: encode → align → scale → predict

use serde::Serialize;
use tracing::warn;

use crate::artifacts::ArtifactPair;
use crate::errors::{CoreError, Result};
use crate::features::UnseenCategory;
use crate::record::Record;

/// A point prediction plus the categories that fell back to the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub value: f64,
    pub unseen_categories: Vec<UnseenCategory>,
}

impl Prediction {
    pub fn formatted(&self) -> String {
        format_prediction(self.value)
    }
}

impl ArtifactPair {
    /// Feature vector exactly as the regressor sees it
    pub fn prepare(&self, record: &Record) -> Result<Vec<f64>> {
        record.validate()?;
        let aligned = self.schema().encode_aligned(record);
        self.scaler().transform_row(aligned.columns(), aligned.values())
    }

    pub fn predict(&self, record: &Record) -> Result<Prediction> {
        let features = self.prepare(record)?;
        let value = self.regressor().predict(&features);
        if !value.is_finite() {
            return Err(CoreError::Model(format!("regressor produced {value}")));
        }

        let unseen_categories = self.schema().unseen_categories(record);
        for unseen in &unseen_categories {
            warn!(field = %unseen.field, value = %unseen.value, "unseen category, using baseline");
        }

        Ok(Prediction {
            value,
            unseen_categories,
        })
    }
}

/// Two fractional digits, no grouping
pub fn format_prediction(value: f64) -> String {
    format!("{value:.2}")
}

/// Insert `,` thousands separators into an already formatted decimal
pub fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_fractional_digits() {
        assert_eq!(format_prediction(16884.924), "16884.92");
        assert_eq!(format_prediction(0.5), "0.50");
        assert_eq!(format_prediction(-3.0), "-3.00");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands("16884.92"), "16,884.92");
        assert_eq!(group_thousands("1234567.00"), "1,234,567.00");
        assert_eq!(group_thousands("999.99"), "999.99");
        assert_eq!(group_thousands("-1000.00"), "-1,000.00");
        assert_eq!(group_thousands("100000"), "100,000");
    }
}
