//! Constants used throughout the npay core crate.
//!
//! This module contains all path, filename, and label constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default path of the public (government open data) price dataset.
pub const DEFAULT_PUBLIC_DATASET_FILE: &str = "data.csv";

/// Default path of the crawled (hospital website) price dataset.
pub const DEFAULT_CRAWLED_DATASET_FILE: &str = "crawled_data.csv";

/// Default path of the append-only feedback log.
pub const DEFAULT_FEEDBACK_FILE: &str = "feedback.csv";

/// The distinguished hospital whose rank is highlighted in every drill-down.
pub const DEFAULT_OUR_HOSPITAL: &str = "삼성서울병원";

/// Relative path of the Hangul-capable font used by the document export.
pub const DEFAULT_DOCUMENT_FONT_FILE: &str = "fonts/NanumGothic.ttf";

/// Dataset identifier for the public data source.
pub const PUBLIC_DATASET_ID: &str = "public";

/// Dataset identifier for the crawled data source.
pub const CRAWLED_DATASET_ID: &str = "crawled";

/// Display title for the public data source.
pub const PUBLIC_DATASET_TITLE: &str = "공공 데이터 분석";

/// Display title for the crawled data source.
pub const CRAWLED_DATASET_TITLE: &str = "웹사이트 비급여 항목 분석";

/// Header row written when the feedback log is first created.
pub const FEEDBACK_HEADER: [&str; 2] = ["timestamp", "feedback"];

/// Timestamp format used for feedback rows (local process clock).
pub const FEEDBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of characters a hospital name is truncated to in the document table.
pub const DOCUMENT_HOSPITAL_NAME_WIDTH: usize = 30;
