//! One-hot encoding and column alignment
//!
//! Encoding turns a [`Record`] into named columns: numeric fields pass through
//! and every categorical field becomes a `{field}_{value}` indicator. The
//! [`FeatureSchema`] fixed at training time decides which indicators exist
//! (sorted category values, first one dropped as the baseline) and in which
//! order. Alignment forces any encoded record onto that exact column list,
//! zero-filling missing columns and discarding extra ones.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::errors::{CoreError, Result};
use crate::record::{normalize_category, CategoricalField, NumericField, Record};

/// Name of the indicator column for `field == value`
pub fn indicator_column(field: CategoricalField, value: &str) -> String {
    format!("{}_{}", field.name(), value)
}

/// Category values observed for one field at training time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLevels {
    pub field: CategoricalField,
    /// Sorted, de-duplicated values; `levels[0]` is the baseline
    pub levels: Vec<String>,
}

impl CategoryLevels {
    pub fn baseline(&self) -> Option<&str> {
        self.levels.first().map(String::as_str)
    }

    /// Values that get their own indicator column
    pub fn indicator_levels(&self) -> &[String] {
        self.levels.get(1..).unwrap_or(&[])
    }

    pub fn contains(&self, value: &str) -> bool {
        self.levels.binary_search_by(|level| level.as_str().cmp(value)).is_ok()
    }
}

/// A categorical value the schema has never seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnseenCategory {
    pub field: CategoricalField,
    pub value: String,
}

/// Training-time column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    numeric: Vec<NumericField>,
    categorical: Vec<CategoryLevels>,
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Learn category levels from a batch of training records
    pub fn fit(records: &[Record]) -> Result<Self> {
        if records.is_empty() {
            return Err(CoreError::Schema(
                "cannot fit a feature schema on an empty dataset".to_string(),
            ));
        }

        let categorical = CategoricalField::ALL
            .iter()
            .map(|&field| {
                let levels: BTreeSet<String> = records
                    .iter()
                    .map(|r| normalize_category(r.categorical(field)))
                    .collect();
                CategoryLevels {
                    field,
                    levels: levels.into_iter().collect(),
                }
            })
            .collect();

        Self::from_levels(categorical)
    }

    /// Build a schema from explicit category levels
    pub fn from_levels(categorical: Vec<CategoryLevels>) -> Result<Self> {
        let numeric = NumericField::ALL.to_vec();
        let columns = derive_columns(&numeric, &categorical);
        let schema = Self {
            numeric,
            categorical,
            columns,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Check that levels are well formed and the stored column list matches them
    pub fn validate(&self) -> Result<()> {
        if self.numeric != NumericField::ALL {
            return Err(CoreError::Schema(format!(
                "numeric columns must be {:?}, found {:?}",
                NumericField::ALL,
                self.numeric
            )));
        }

        let fields: Vec<_> = self.categorical.iter().map(|c| c.field).collect();
        if fields != CategoricalField::ALL {
            return Err(CoreError::Schema(format!(
                "categorical fields must be {:?}, found {:?}",
                CategoricalField::ALL,
                fields
            )));
        }

        for levels in &self.categorical {
            if levels.levels.is_empty() {
                return Err(CoreError::Schema(format!("no categories for {}", levels.field)));
            }
            if levels.levels.windows(2).any(|w| w[0] >= w[1]) {
                return Err(CoreError::Schema(format!(
                    "categories for {} are not sorted and unique",
                    levels.field
                )));
            }
        }

        let expected = derive_columns(&self.numeric, &self.categorical);
        if expected != self.columns {
            return Err(CoreError::Schema(format!(
                "column list {:?} does not match category levels (expected {:?})",
                self.columns, expected
            )));
        }

        Ok(())
    }

    /// Ordered training-time column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.numeric.iter().map(|f| f.name().to_string()).collect()
    }

    pub fn categorical(&self) -> &[CategoryLevels] {
        &self.categorical
    }

    pub fn levels(&self, field: CategoricalField) -> Option<&CategoryLevels> {
        self.categorical.iter().find(|c| c.field == field)
    }

    /// Encode and align one record
    pub fn encode_aligned(&self, record: &Record) -> AlignedRow<'_> {
        align(&encode_record(record), &self.columns)
    }

    /// Encode and align a batch into a dense row-major matrix
    pub fn encode_batch(&self, records: &[Record]) -> Vec<Vec<f64>> {
        records
            .iter()
            .map(|record| self.encode_aligned(record).into_values())
            .collect()
    }

    /// Categorical values in `record` that were absent from the training data
    pub fn unseen_categories(&self, record: &Record) -> Vec<UnseenCategory> {
        self.categorical
            .iter()
            .filter_map(|levels| {
                let value = normalize_category(record.categorical(levels.field));
                (!levels.contains(&value)).then_some(UnseenCategory {
                    field: levels.field,
                    value,
                })
            })
            .collect()
    }
}

fn derive_columns(numeric: &[NumericField], categorical: &[CategoryLevels]) -> Vec<String> {
    let mut columns: Vec<String> = numeric.iter().map(|f| f.name().to_string()).collect();
    for levels in categorical {
        columns.extend(
            levels
                .indicator_levels()
                .iter()
                .map(|value| indicator_column(levels.field, value)),
        );
    }
    columns
}

/// Named columns produced from a single record, before alignment
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    columns: Vec<(String, f64)>,
}

impl EncodedRecord {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Encode a record without reference to any schema.
///
/// Emits the numeric columns plus one indicator per categorical field for the
/// value the record carries, which is exactly what a one-row dummy encoding
/// produces.
pub fn encode_record(record: &Record) -> EncodedRecord {
    let mut columns = Vec::with_capacity(NumericField::ALL.len() + CategoricalField::ALL.len());
    for field in NumericField::ALL {
        columns.push((field.name().to_string(), record.numeric(field)));
    }
    for field in CategoricalField::ALL {
        let value = normalize_category(record.categorical(field));
        columns.push((indicator_column(field, &value), 1.0));
    }
    EncodedRecord { columns }
}

/// A feature vector laid out exactly as `columns`
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow<'a> {
    columns: &'a [String],
    values: Vec<f64>,
    discarded: Vec<String>,
}

impl<'a> AlignedRow<'a> {
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Encoded columns that had no place in the layout
    pub fn discarded(&self) -> &[String] {
        &self.discarded
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|idx| self.values[idx])
    }
}

/// Reindex `encoded` onto `columns`: missing columns become 0, extra columns are dropped
pub fn align<'a>(encoded: &EncodedRecord, columns: &'a [String]) -> AlignedRow<'a> {
    let lookup: HashMap<&str, f64> = encoded
        .columns
        .iter()
        .map(|(name, value)| (name.as_str(), *value))
        .collect();

    let values = columns
        .iter()
        .map(|column| lookup.get(column.as_str()).copied().unwrap_or(0.0))
        .collect();

    let discarded = encoded
        .names()
        .filter(|name| !columns.iter().any(|column| column == name))
        .map(str::to_string)
        .collect();

    AlignedRow {
        columns,
        values,
        discarded,
    }
}
