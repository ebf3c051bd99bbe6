//! Dataset model and CSV loader.
//!
//! A dataset is an ordered, immutable collection of price listing records. It is
//! loaded once at process startup and shared read-only across all queries; no
//! query ever mutates a row.
//!
//! Dataset identity is deliberately not stored on the data itself. Callers pass
//! a [`DatasetId`] alongside the dataset wherever identity matters (cache keys,
//! API routes), keeping identity metadata separate from the rows.

use crate::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identifier for a loaded dataset, passed alongside the data rather than
/// attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of a price dataset: a billable service offered by one hospital at
/// one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Billable service name.
    pub item_name: String,
    /// Hospital offering the service.
    pub hospital_name: String,
    /// Listed price in KRW. Never negative.
    pub price: f64,
    /// Optional non-covered item code (`npay_code` column). `None` when the
    /// column is absent from the source file or the cell is blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
}

/// Raw CSV row before validation. `npay_code` is tolerated as missing so that
/// sources without the identifier column still load; the code scope is then
/// simply unavailable.
#[derive(Debug, Deserialize)]
struct RawRecord {
    item_name: String,
    hospital_name: String,
    price: f64,
    #[serde(default)]
    npay_code: Option<String>,
}

/// An ordered, immutable collection of [`Record`]s.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already-validated records, preserving their order.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load a dataset from a CSV file with an `item_name,hospital_name,price[,npay_code]`
    /// header.
    ///
    /// Item codes are normalised to trimmed strings; blank cells become `None`.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::DatasetFileMissing`] if the file does not exist.
    /// * [`AnalysisError::DatasetRead`] for other I/O failures.
    /// * [`AnalysisError::DatasetParse`] if a row cannot be deserialised.
    /// * [`AnalysisError::NegativePrice`] if any row carries a negative price.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AnalysisError::DatasetFileMissing {
                    path: path.to_path_buf(),
                }
            } else {
                AnalysisError::DatasetRead(e)
            }
        })?;

        let mut reader = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for row in reader.deserialize::<RawRecord>() {
            let raw = row?;
            if raw.price < 0.0 || !raw.price.is_finite() {
                return Err(AnalysisError::NegativePrice {
                    item_name: raw.item_name,
                    hospital_name: raw.hospital_name,
                    price: raw.price,
                });
            }
            let item_code = raw
                .npay_code
                .map(|code| code.trim().to_owned())
                .filter(|code| !code.is_empty());
            records.push(Record {
                item_name: raw.item_name,
                hospital_name: raw.hospital_name,
                price: raw.price,
                item_code,
            });
        }

        tracing::debug!(rows = records.len(), path = %path.display(), "loaded dataset");
        Ok(Self { records })
    }

    /// All records in original file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any row carries an item code. When false, the code scope is
    /// unavailable for this dataset.
    pub fn has_item_codes(&self) -> bool {
        self.records.iter().any(|r| r.item_code.is_some())
    }

    /// Sorted, de-duplicated item names whose lowercase form contains the
    /// given keyword (case-insensitive). An empty keyword yields an empty
    /// list: the drill-down selector only offers items after a search.
    pub fn item_names_matching(&self, keyword: &str) -> Vec<String> {
        if keyword.trim().is_empty() {
            return Vec::new();
        }
        let needle = keyword.to_lowercase();
        let mut names: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.item_name.to_lowercase().contains(&needle))
            .map(|r| r.item_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// All rows for an exact item name, in original order.
    pub fn item_rows(&self, item_name: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.item_name == item_name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_parses_rows_in_order() {
        let file = write_csv(
            "item_name,hospital_name,price,npay_code\n\
             도수치료,A병원,100000,N001\n\
             도수치료,B병원,80000,N001\n\
             MRI,A병원,450000,N002\n",
        );
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records()[0].hospital_name, "A병원");
        assert_eq!(dataset.records()[1].price, 80000.0);
        assert_eq!(dataset.records()[2].item_code.as_deref(), Some("N002"));
    }

    #[test]
    fn test_load_missing_file_is_distinguished() {
        let result = Dataset::load(Path::new("definitely/not/here.csv"));
        assert!(matches!(
            result,
            Err(AnalysisError::DatasetFileMissing { .. })
        ));
    }

    #[test]
    fn test_load_without_code_column_leaves_scope_unavailable() {
        let file = write_csv(
            "item_name,hospital_name,price\n\
             도수치료,A병원,100000\n",
        );
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.records()[0].item_code, None);
        assert!(!dataset.has_item_codes());
    }

    #[test]
    fn test_load_blank_code_cell_becomes_none() {
        let file = write_csv(
            "item_name,hospital_name,price,npay_code\n\
             도수치료,A병원,100000,\n\
             도수치료,B병원,90000, N001 \n",
        );
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.records()[0].item_code, None);
        assert_eq!(dataset.records()[1].item_code.as_deref(), Some("N001"));
    }

    #[test]
    fn test_load_rejects_negative_price() {
        let file = write_csv(
            "item_name,hospital_name,price\n\
             도수치료,A병원,-5\n",
        );
        assert!(matches!(
            Dataset::load(file.path()),
            Err(AnalysisError::NegativePrice { .. })
        ));
    }

    #[test]
    fn test_item_names_matching_is_sorted_and_case_insensitive() {
        let file = write_csv(
            "item_name,hospital_name,price\n\
             MRI 검사,A병원,450000\n\
             mri 특수촬영,B병원,500000\n\
             도수치료,A병원,100000\n\
             MRI 검사,C병원,400000\n",
        );
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(
            dataset.item_names_matching("mri"),
            vec!["MRI 검사".to_owned(), "mri 특수촬영".to_owned()]
        );
        assert!(dataset.item_names_matching("  ").is_empty());
    }

    #[test]
    fn test_item_rows_preserves_original_order() {
        let file = write_csv(
            "item_name,hospital_name,price\n\
             도수치료,C병원,100000\n\
             MRI,A병원,450000\n\
             도수치료,A병원,120000\n",
        );
        let dataset = Dataset::load(file.path()).unwrap();
        let rows = dataset.item_rows("도수치료");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hospital_name, "C병원");
        assert_eq!(rows[1].hospital_name, "A병원");
    }
}
