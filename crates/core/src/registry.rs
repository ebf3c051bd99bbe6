//! Startup dataset registry.
//!
//! The service analyses two data sources: the public open-data listing and the
//! crawled hospital-website listing. Both are loaded exactly once per process
//! lifetime and never refreshed. The public dataset is required; without it
//! startup fails. The crawled dataset is optional: when its file is missing the
//! entry stays registered but disabled, carrying a user-facing warning, and the
//! rest of the service keeps working.

use crate::config::CoreConfig;
use crate::constants::{
    CRAWLED_DATASET_ID, CRAWLED_DATASET_TITLE, PUBLIC_DATASET_ID, PUBLIC_DATASET_TITLE,
};
use crate::dataset::{Dataset, DatasetId};
use crate::{AnalysisError, AnalysisResult};
use std::path::Path;
use std::sync::Arc;

/// One registered data source, loaded or disabled.
#[derive(Debug, Clone)]
pub struct DatasetEntry {
    pub id: DatasetId,
    pub title: String,
    /// `None` when the source file was absent at startup.
    pub dataset: Option<Arc<Dataset>>,
    /// User-facing explanation when the entry is disabled.
    pub warning: Option<String>,
}

impl DatasetEntry {
    pub fn is_available(&self) -> bool {
        self.dataset.is_some()
    }
}

/// All data sources known to the process, resolved once at startup.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    entries: Vec<DatasetEntry>,
}

impl DatasetRegistry {
    /// Load both data sources.
    ///
    /// # Errors
    ///
    /// Fails if the public dataset cannot be loaded; a missing crawled dataset
    /// only disables its entry.
    pub fn load(cfg: &CoreConfig) -> AnalysisResult<Self> {
        let public = Dataset::load(cfg.public_dataset_path())?;

        let crawled_entry = match Dataset::load(cfg.crawled_dataset_path()) {
            Ok(dataset) => DatasetEntry {
                id: DatasetId::new(CRAWLED_DATASET_ID),
                title: CRAWLED_DATASET_TITLE.into(),
                dataset: Some(Arc::new(dataset)),
                warning: None,
            },
            Err(AnalysisError::DatasetFileMissing { path }) => {
                tracing::warn!(path = %path.display(), "crawled dataset missing; tab disabled");
                DatasetEntry {
                    id: DatasetId::new(CRAWLED_DATASET_ID),
                    title: CRAWLED_DATASET_TITLE.into(),
                    dataset: None,
                    warning: Some(format!(
                        "크롤링 데이터 파일('{}')을 찾을 수 없습니다. 파일을 추가하면 기능이 활성화됩니다.",
                        path.display()
                    )),
                }
            }
            Err(other) => return Err(other),
        };

        Ok(Self {
            entries: vec![
                DatasetEntry {
                    id: DatasetId::new(PUBLIC_DATASET_ID),
                    title: PUBLIC_DATASET_TITLE.into(),
                    dataset: Some(Arc::new(public)),
                    warning: None,
                },
                crawled_entry,
            ],
        })
    }

    /// Build a registry from a single already-loaded dataset. Used by the CLI,
    /// which analyses one source at a time.
    pub fn single(id: DatasetId, title: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            entries: vec![DatasetEntry {
                id,
                title: title.into(),
                dataset: Some(Arc::new(dataset)),
                warning: None,
            }],
        }
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    /// Look up an available dataset by id.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::UnknownDataset`] for an id never registered.
    /// * [`AnalysisError::DatasetUnavailable`] for a registered but disabled
    ///   entry, carrying its warning.
    pub fn get(&self, id: &str) -> AnalysisResult<Arc<Dataset>> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id.as_str() == id)
            .ok_or_else(|| AnalysisError::UnknownDataset(id.to_owned()))?;
        entry
            .dataset
            .clone()
            .ok_or_else(|| AnalysisError::DatasetUnavailable {
                id: id.to_owned(),
                reason: entry
                    .warning
                    .clone()
                    .unwrap_or_else(|| "dataset disabled".into()),
            })
    }
}

/// Load the registry for the single-dataset variant: only the public source,
/// and a missing file is fatal.
pub fn load_single_dataset(path: &Path) -> AnalysisResult<DatasetRegistry> {
    let dataset = Dataset::load(path)?;
    Ok(DatasetRegistry::single(
        DatasetId::new(PUBLIC_DATASET_ID),
        PUBLIC_DATASET_TITLE,
        dataset,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const CSV: &str = "item_name,hospital_name,price\n도수치료,A병원,100000\n";

    fn cfg_with(public: PathBuf, crawled: PathBuf, dir: &Path) -> CoreConfig {
        CoreConfig::new(
            public,
            crawled,
            dir.join("feedback.csv"),
            "삼성서울병원".into(),
            dir.join("fonts/NanumGothic.ttf"),
        )
        .unwrap()
    }

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_public_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let crawled = write_file(dir.path(), "crawled.csv");
        let cfg = cfg_with(dir.path().join("missing.csv"), crawled, dir.path());
        assert!(matches!(
            DatasetRegistry::load(&cfg),
            Err(AnalysisError::DatasetFileMissing { .. })
        ));
    }

    #[test]
    fn test_missing_crawled_dataset_only_disables_entry() {
        let dir = tempfile::tempdir().unwrap();
        let public = write_file(dir.path(), "data.csv");
        let cfg = cfg_with(public, dir.path().join("missing.csv"), dir.path());

        let registry = DatasetRegistry::load(&cfg).unwrap();
        assert_eq!(registry.entries().len(), 2);
        assert!(registry.entries()[0].is_available());
        assert!(!registry.entries()[1].is_available());
        assert!(registry.entries()[1].warning.is_some());

        assert!(registry.get("public").is_ok());
        assert!(matches!(
            registry.get("crawled"),
            Err(AnalysisError::DatasetUnavailable { .. })
        ));
    }

    #[test]
    fn test_unknown_dataset_id() {
        let dir = tempfile::tempdir().unwrap();
        let public = write_file(dir.path(), "data.csv");
        let crawled = write_file(dir.path(), "crawled.csv");
        let cfg = cfg_with(public, crawled, dir.path());

        let registry = DatasetRegistry::load(&cfg).unwrap();
        assert!(matches!(
            registry.get("nope"),
            Err(AnalysisError::UnknownDataset(_))
        ));
    }
}
