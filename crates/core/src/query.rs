//! Filtering, aggregation, and ranking over a loaded dataset.
//!
//! Every operation here is a pure function of its inputs: nothing suspends,
//! retries, or keeps state between calls. The shared immutable [`Dataset`] is
//! the only thing two queries ever have in common.
//!
//! Ordering contract: filtering preserves original dataset order, and the
//! report projection sorts by price descending with a stable sort, so rows with
//! equal prices keep their original relative order. The projection order is
//! shared byte-for-byte between the on-screen table and every export.

use crate::dataset::{Dataset, Record};
use serde::{Deserialize, Serialize};

/// A field eligible for keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    ItemName,
    HospitalName,
    ItemCode,
}

impl Scope {
    /// The record field this scope matches against. `None` when the record has
    /// no value for the field (a missing value never matches).
    fn field<'a>(&self, record: &'a Record) -> Option<&'a str> {
        match self {
            Scope::ItemName => Some(&record.item_name),
            Scope::HospitalName => Some(&record.hospital_name),
            Scope::ItemCode => record.item_code.as_deref(),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scope::ItemName => "item_name",
            Scope::HospitalName => "hospital_name",
            Scope::ItemCode => "item_code",
        };
        write!(f, "{name}")
    }
}

/// A transient, request-scoped search query. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    /// Fields to match the keyword against.
    pub scopes: Vec<Scope>,
    /// Case-insensitive substring to look for.
    pub keyword: String,
    /// Exact item name selected for detail drill-down, if any.
    pub selected_item: Option<String>,
}

/// Result of [`filter`]. A keyword with no scopes is a user-input problem and
/// is kept distinct from a search that simply matched nothing, so callers can
/// render a "select a scope" warning instead of "zero results".
#[derive(Debug, PartialEq)]
pub enum FilterOutcome<'a> {
    /// Matching rows in original dataset order. With an empty keyword this is
    /// the full dataset.
    Rows(Vec<&'a Record>),
    /// Non-empty keyword but no scope selected.
    MissingScope,
}

/// Filter a dataset by the query's keyword over its selected scopes.
///
/// An empty keyword returns every row unchanged. Otherwise a row is included
/// if ANY selected scope's field contains the keyword, compared
/// case-insensitively. Rows without a value for a scope (e.g. no item code)
/// never match that scope.
pub fn filter<'a>(dataset: &'a Dataset, query: &Query) -> FilterOutcome<'a> {
    if query.keyword.is_empty() {
        return FilterOutcome::Rows(dataset.records().iter().collect());
    }
    if query.scopes.is_empty() {
        return FilterOutcome::MissingScope;
    }

    let needle = query.keyword.to_lowercase();
    let rows = dataset
        .records()
        .iter()
        .filter(|record| {
            query.scopes.iter().any(|scope| {
                scope
                    .field(record)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            })
        })
        .collect();
    FilterOutcome::Rows(rows)
}

/// Aggregate price statistics for one item's rows.
///
/// `count` is the number of rows, duplicate hospital entries included. The
/// floating values are displayed truncated toward zero, never rounded; see
/// [`crate::format::format_won`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Compute [`ItemStats`] over an item-restricted subset.
///
/// Returns `None` for an empty subset. Callers derive selectable items from
/// values present in the dataset, so in practice the subset is never empty.
pub fn aggregate(rows: &[&Record]) -> Option<ItemStats> {
    if rows.is_empty() {
        return None;
    }

    let mut prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
    prices.sort_by(f64::total_cmp);

    let count = prices.len();
    let sum: f64 = prices.iter().sum();
    let median = if count % 2 == 1 {
        prices[count / 2]
    } else {
        (prices[count / 2 - 1] + prices[count / 2]) / 2.0
    };

    Some(ItemStats {
        count,
        mean: sum / count as f64,
        min: prices[0],
        max: prices[count - 1],
        median,
    })
}

/// Where the distinguished hospital sits in one item's price distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RankOutcome {
    /// 1-based position in the price-descending order, the hospital's listed
    /// price, and the number of hospitals ranked.
    Ranked {
        rank: usize,
        price: f64,
        total: usize,
    },
    /// The hospital has no row for this item. An expected, informational
    /// outcome rather than an error.
    NotFound,
}

/// Rank the distinguished hospital within an item subset.
///
/// Rows are ordered by price descending; equal prices keep their original
/// dataset order. When the hospital appears more than once for the item, the
/// first row in that order is reported.
pub fn rank(rows: &[&Record], our_hospital: &str) -> RankOutcome {
    let projected = report_projection(rows);
    let total = projected.len();
    match projected
        .iter()
        .position(|r| r.hospital_name == our_hospital)
    {
        Some(index) => RankOutcome::Ranked {
            rank: index + 1,
            price: projected[index].price,
            total,
        },
        None => RankOutcome::NotFound,
    }
}

/// The report projection: an item subset sorted by price descending, stable on
/// ties. Used identically for on-screen display and for every export.
pub fn report_projection<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.price.total_cmp(&a.price));
    sorted
}
