#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("dataset file not found: {path}", path = path.display())]
    DatasetFileMissing { path: std::path::PathBuf },
    #[error("failed to read dataset file: {0}")]
    DatasetRead(std::io::Error),
    #[error("failed to parse dataset row: {0}")]
    DatasetParse(#[from] csv::Error),
    #[error("negative price {price} for item '{item_name}' at hospital '{hospital_name}'")]
    NegativePrice {
        item_name: String,
        hospital_name: String,
        price: f64,
    },
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("dataset '{id}' is unavailable: {reason}")]
    DatasetUnavailable { id: String, reason: String },
    #[error("feedback text cannot be empty")]
    EmptyFeedback,
    #[error("failed to open feedback log: {0}")]
    FeedbackOpen(std::io::Error),
    #[error("failed to append to feedback log: {0}")]
    FeedbackWrite(std::io::Error),
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
