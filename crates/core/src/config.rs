//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{
    DEFAULT_CRAWLED_DATASET_FILE, DEFAULT_DOCUMENT_FONT_FILE, DEFAULT_FEEDBACK_FILE,
    DEFAULT_OUR_HOSPITAL, DEFAULT_PUBLIC_DATASET_FILE,
};
use crate::{AnalysisError, AnalysisResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    public_dataset_path: PathBuf,
    crawled_dataset_path: PathBuf,
    feedback_path: PathBuf,
    our_hospital: String,
    document_font_path: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        public_dataset_path: PathBuf,
        crawled_dataset_path: PathBuf,
        feedback_path: PathBuf,
        our_hospital: String,
        document_font_path: PathBuf,
    ) -> AnalysisResult<Self> {
        if our_hospital.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "our_hospital cannot be empty".into(),
            ));
        }

        Ok(Self {
            public_dataset_path,
            crawled_dataset_path,
            feedback_path,
            our_hospital,
            document_font_path,
        })
    }

    /// Resolve configuration from environment variables, falling back to the
    /// conventional defaults next to the process working directory.
    ///
    /// Recognised variables: `NPAY_DATA_FILE`, `NPAY_CRAWLED_DATA_FILE`,
    /// `NPAY_FEEDBACK_FILE`, `NPAY_OUR_HOSPITAL`, `NPAY_DOCUMENT_FONT`.
    pub fn from_env() -> AnalysisResult<Self> {
        let var = |name: &str, default: &str| -> String {
            std::env::var(name).unwrap_or_else(|_| default.to_owned())
        };

        Self::new(
            PathBuf::from(var("NPAY_DATA_FILE", DEFAULT_PUBLIC_DATASET_FILE)),
            PathBuf::from(var("NPAY_CRAWLED_DATA_FILE", DEFAULT_CRAWLED_DATASET_FILE)),
            PathBuf::from(var("NPAY_FEEDBACK_FILE", DEFAULT_FEEDBACK_FILE)),
            var("NPAY_OUR_HOSPITAL", DEFAULT_OUR_HOSPITAL),
            PathBuf::from(var("NPAY_DOCUMENT_FONT", DEFAULT_DOCUMENT_FONT_FILE)),
        )
    }

    pub fn public_dataset_path(&self) -> &Path {
        &self.public_dataset_path
    }

    pub fn crawled_dataset_path(&self) -> &Path {
        &self.crawled_dataset_path
    }

    pub fn feedback_path(&self) -> &Path {
        &self.feedback_path
    }

    pub fn our_hospital(&self) -> &str {
        &self.our_hospital
    }

    pub fn document_font_path(&self) -> &Path {
        &self.document_font_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_rejects_blank_hospital() {
        let result = CoreConfig::new(
            PathBuf::from("data.csv"),
            PathBuf::from("crawled_data.csv"),
            PathBuf::from("feedback.csv"),
            "   ".into(),
            PathBuf::from("fonts/NanumGothic.ttf"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_exposes_paths() {
        let cfg = CoreConfig::new(
            PathBuf::from("data.csv"),
            PathBuf::from("crawled_data.csv"),
            PathBuf::from("feedback.csv"),
            "삼성서울병원".into(),
            PathBuf::from("fonts/NanumGothic.ttf"),
        )
        .unwrap();
        assert_eq!(cfg.public_dataset_path(), Path::new("data.csv"));
        assert_eq!(cfg.our_hospital(), "삼성서울병원");
    }
}
