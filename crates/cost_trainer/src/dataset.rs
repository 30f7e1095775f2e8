//! CSV dataset loading and splitting
//!
//! Reads the insurance table (`age,sex,bmi,children,smoker,region,charges`,
//! columns located by header name) and provides seeded shuffling and a
//! train/test split.

use anyhow::{bail, Context, Result};
use insurance_core::Record;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::deterministic::permutation;

/// Header names the loader requires
pub const CSV_COLUMNS: [&str; 7] = ["age", "sex", "bmi", "children", "smoker", "region", "charges"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    age: u32,
    sex: String,
    bmi: f64,
    children: u32,
    smoker: String,
    region: String,
    charges: f64,
}

/// Records and their charges, index-aligned
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub targets: Vec<f64>,
}

/// Min, max and mean of the target column
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Dataset {
    pub fn new(records: Vec<Record>, targets: Vec<f64>) -> Result<Self> {
        if records.len() != targets.len() {
            bail!(
                "{} records but {} targets",
                records.len(),
                targets.len()
            );
        }
        Ok(Self { records, targets })
    }

    /// Load dataset from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().context("Failed to read CSV header")?.clone();
        for column in CSV_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                bail!("CSV header is missing column {column:?}");
            }
        }

        let mut records = Vec::new();
        let mut targets = Vec::new();

        for raw in reader.records() {
            let raw = raw.context("Failed to read CSV row")?;
            let line = raw.position().map(|p| p.line()).unwrap_or_default();
            let row: CsvRow = raw
                .deserialize(Some(&headers))
                .with_context(|| format!("Line {line}: malformed row"))?;

            if !row.charges.is_finite() {
                bail!("Line {line}: charges must be finite");
            }

            let record = Record {
                age: row.age,
                sex: row.sex,
                bmi: row.bmi,
                children: row.children,
                smoker: row.smoker,
                region: row.region,
            };
            record
                .validate()
                .with_context(|| format!("Line {line}: invalid record"))?;

            records.push(record);
            targets.push(row.charges);
        }

        if records.is_empty() {
            bail!("Dataset is empty");
        }

        Ok(Self { records, targets })
    }

    /// Deterministically shuffle rows using `seed`
    pub fn shuffle(&mut self, seed: u64) {
        let order = permutation(self.len(), seed);
        self.records = order.iter().map(|&i| self.records[i].clone()).collect();
        self.targets = order.iter().map(|&i| self.targets[i]).collect();
    }

    /// Split into `(train, test)`; the last `round(len * test_ratio)` rows form the test set
    pub fn split(&self, test_ratio: f64) -> Result<(Dataset, Dataset)> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            bail!("test ratio must be in (0, 1), got {test_ratio}");
        }

        let n = self.len();
        let test_len = ((n as f64) * test_ratio).round() as usize;
        if test_len == 0 || test_len >= n {
            bail!("cannot split {n} rows with test ratio {test_ratio}");
        }

        let cut = n - test_len;
        let train = Dataset {
            records: self.records[..cut].to_vec(),
            targets: self.targets[..cut].to_vec(),
        };
        let test = Dataset {
            records: self.records[cut..].to_vec(),
            targets: self.targets[cut..].to_vec(),
        };
        Ok((train, test))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn target_summary(&self) -> Option<TargetSummary> {
        if self.targets.is_empty() {
            return None;
        }
        let (min, max, sum) = self.targets.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &t| (min.min(t), max.max(t), sum + t),
        );
        Some(TargetSummary {
            min,
            max,
            mean: sum / self.targets.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
age,sex,bmi,children,smoker,region,charges
19,female,27.9,0,yes,southwest,16884.924
18,male,33.77,1,no,southeast,1725.5523

28,male,33,3,no,southeast,4449.462
33,male,22.705,0,no,northwest,21984.47061
";

    fn create_test_csv(contents: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv(SAMPLE)?;
        let dataset = Dataset::from_csv(file.path())?;

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.records[0].age, 19);
        assert_eq!(dataset.records[0].smoker, "yes");
        assert_eq!(dataset.records[2].bmi, 33.0);
        assert_eq!(dataset.targets[1], 1725.5523);
        Ok(())
    }

    #[test]
    fn test_columns_located_by_header() -> Result<()> {
        let csv = "charges,region,smoker,children,bmi,sex,age\n100.5,northeast,no,2,30.1,male,40\n";
        let dataset = Dataset::from_reader(csv.as_bytes())?;
        assert_eq!(dataset.records[0].age, 40);
        assert_eq!(dataset.records[0].region, "northeast");
        assert_eq!(dataset.targets[0], 100.5);
        Ok(())
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = "age,sex,bmi,children,smoker,charges\n19,female,27.9,0,yes,1.0\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("region"));
    }

    #[test]
    fn test_bad_row_reports_line() {
        let csv = "age,sex,bmi,children,smoker,region,charges\n19,female,abc,0,yes,southwest,1.0\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let csv = "age,sex,bmi,children,smoker,region,charges\n";
        assert!(Dataset::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_shuffle_determinism() -> Result<()> {
        let file = create_test_csv(SAMPLE)?;
        let mut ds1 = Dataset::from_csv(file.path())?;
        let mut ds2 = ds1.clone();

        ds1.shuffle(42);
        ds2.shuffle(42);
        assert_eq!(ds1, ds2);

        // rows keep their targets
        for (record, target) in ds1.records.iter().zip(&ds1.targets) {
            if record.age == 19 {
                assert_eq!(*target, 16884.924);
            }
        }
        Ok(())
    }

    #[test]
    fn test_split_sizes() -> Result<()> {
        let file = create_test_csv(SAMPLE)?;
        let dataset = Dataset::from_csv(file.path())?;
        let (train, test) = dataset.split(0.25)?;
        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 1);
        assert_eq!(test.records[0].age, 33);

        assert!(dataset.split(0.0).is_err());
        assert!(dataset.split(0.01).is_err());
        Ok(())
    }

    #[test]
    fn test_target_summary() -> Result<()> {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes())?;
        let summary = dataset.target_summary().unwrap();
        assert_eq!(summary.min, 1725.5523);
        assert_eq!(summary.max, 21984.47061);
        Ok(())
    }
}
