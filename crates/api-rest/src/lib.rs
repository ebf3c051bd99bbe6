//! # npay REST API
//!
//! REST surface of the non-covered price analysis service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, download headers)
//!
//! All analysis work is delegated to `npay-core`; exports to `npay-export`.
//! Handlers are thin: map request parameters to a query, call the engine, map
//! outcomes (including the informational ones) to wire types.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query as AxumQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use npay_core::{
    aggregate, filter, rank, report_projection, AnalysisError, CoreConfig, DatasetRegistry,
    FeedbackLog, FilterOutcome, ItemStats, Query, RankOutcome, Record, Scope,
};
use npay_export::DocumentReport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
///
/// Everything here is resolved once at startup: the loaded dataset registry,
/// the feedback log, and the core configuration.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DatasetRegistry>,
    pub feedback: Arc<FeedbackLog>,
    pub cfg: Arc<CoreConfig>,
}

impl AppState {
    pub fn new(registry: DatasetRegistry, cfg: CoreConfig) -> Self {
        let feedback = FeedbackLog::new(cfg.feedback_path());
        Self {
            registry: Arc::new(registry),
            feedback: Arc::new(feedback),
            cfg: Arc::new(cfg),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One registered data source and whether it can be queried.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetInfo {
    pub id: String,
    pub title: String,
    pub available: bool,
    /// User-facing explanation when the source is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetListRes {
    pub datasets: Vec<DatasetInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordDto {
    pub item_name: String,
    pub hospital_name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npay_code: Option<String>,
}

impl From<&Record> for RecordDto {
    fn from(record: &Record) -> Self {
        Self {
            item_name: record.item_name.clone(),
            hospital_name: record.hospital_name.clone(),
            price: record.price,
            npay_code: record.item_code.clone(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring to search for.
    #[serde(default)]
    pub keyword: String,
    /// Comma-separated scopes: `item_name`, `hospital_name`, `item_code`.
    #[serde(default)]
    pub scopes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchRes {
    pub rows: Vec<RecordDto>,
    pub total: usize,
    /// True when a keyword was given without any scope. Kept distinct from
    /// `total == 0` so the client renders "select a scope" instead of "no
    /// matches".
    pub missing_scope: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemSearchParams {
    /// Substring to search item names for. Empty yields an empty list.
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemListRes {
    pub items: Vec<String>,
}

/// Aggregate statistics, raw and display-formatted. The formatted values are
/// truncated toward zero, matching the exported reports.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsDto {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean_display: String,
    pub median_display: String,
    pub min_display: String,
    pub max_display: String,
    pub count_display: String,
}

impl From<&ItemStats> for StatsDto {
    fn from(stats: &ItemStats) -> Self {
        use npay_core::format::{format_count, format_won};
        Self {
            count: stats.count,
            mean: stats.mean,
            min: stats.min,
            max: stats.max,
            median: stats.median,
            mean_display: format_won(stats.mean),
            median_display: format_won(stats.median),
            min_display: format_won(stats.min),
            max_display: format_won(stats.max),
            count_display: format_count(stats.count),
        }
    }
}

/// The distinguished hospital's rank, or an informational not-found message.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankDto {
    pub hospital: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisRes {
    pub item_name: String,
    pub stats: StatsDto,
    pub rank: RankDto,
    /// Report projection: price descending, stable on ties. Exactly the row
    /// order of every export.
    pub report: Vec<RecordDto>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackReq {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_datasets,
        search_dataset,
        list_items,
        analyse_item,
        export_spreadsheet,
        export_document,
        submit_feedback,
    ),
    components(schemas(
        HealthRes,
        DatasetListRes,
        DatasetInfo,
        RecordDto,
        SearchRes,
        ItemListRes,
        StatsDto,
        RankDto,
        AnalysisRes,
        FeedbackReq,
        FeedbackRes
    ))
)]
pub struct ApiDoc;

/// Build the REST router with all analysis routes, Swagger UI, and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/datasets", get(list_datasets))
        .route("/datasets/:id/search", get(search_dataset))
        .route("/datasets/:id/items", get(list_items))
        .route("/datasets/:id/items/:item/analysis", get(analyse_item))
        .route(
            "/datasets/:id/items/:item/report.xlsx",
            get(export_spreadsheet),
        )
        .route("/datasets/:id/items/:item/report.pdf", get(export_document))
        .route("/feedback", post(submit_feedback))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error onto an HTTP status and user-facing message.
fn error_response(error: AnalysisError) -> (StatusCode, String) {
    match &error {
        AnalysisError::UnknownDataset(id) => {
            (StatusCode::NOT_FOUND, format!("unknown dataset: {id}"))
        }
        AnalysisError::DatasetUnavailable { reason, .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, reason.clone())
        }
        AnalysisError::EmptyFeedback => (
            StatusCode::BAD_REQUEST,
            "피드백 내용이 비어있습니다. 내용을 입력해주세요.".into(),
        ),
        _ => {
            tracing::error!("request failed: {error:?}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        }
    }
}

/// Parse the comma-separated `scopes` query parameter.
fn parse_scopes(raw: &str) -> Result<Vec<Scope>, (StatusCode, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "item_name" => Ok(Scope::ItemName),
            "hospital_name" => Ok(Scope::HospitalName),
            "item_code" => Ok(Scope::ItemCode),
            other => Err((
                StatusCode::BAD_REQUEST,
                format!("unknown scope: {other}"),
            )),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the analysis service. This endpoint is
/// used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "npay analysis API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/datasets",
    responses(
        (status = 200, description = "Registered data sources", body = DatasetListRes)
    )
)]
/// List the registered data sources
///
/// Includes disabled sources (e.g. the crawled dataset when its file was
/// absent at startup) together with their warnings, so a client can render a
/// disabled tab instead of hiding it.
#[axum::debug_handler]
async fn list_datasets(State(state): State<AppState>) -> Json<DatasetListRes> {
    let datasets = state
        .registry
        .entries()
        .iter()
        .map(|entry| DatasetInfo {
            id: entry.id.to_string(),
            title: entry.title.clone(),
            available: entry.is_available(),
            warning: entry.warning.clone(),
            rows: entry.dataset.as_ref().map(|d| d.len()),
        })
        .collect();
    Json(DatasetListRes { datasets })
}

#[utoipa::path(
    get,
    path = "/datasets/{id}/search",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        SearchParams
    ),
    responses(
        (status = 200, description = "Filtered rows in original dataset order", body = SearchRes),
        (status = 400, description = "Unknown scope name"),
        (status = 404, description = "Unknown dataset"),
        (status = 503, description = "Dataset disabled")
    )
)]
/// Filter a dataset by keyword over the selected scopes
///
/// An empty keyword returns the full dataset. A keyword without any scope is
/// flagged as `missing_scope` with a warning rather than returned as zero
/// matches.
#[axum::debug_handler]
async fn search_dataset(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    AxumQuery(params): AxumQuery<SearchParams>,
) -> Result<Json<SearchRes>, (StatusCode, String)> {
    let dataset = state.registry.get(&id).map_err(error_response)?;
    let query = Query {
        scopes: parse_scopes(&params.scopes)?,
        keyword: params.keyword,
        selected_item: None,
    };

    let res = match filter(&dataset, &query) {
        FilterOutcome::Rows(rows) => SearchRes {
            total: rows.len(),
            rows: rows.iter().map(|r| RecordDto::from(*r)).collect(),
            missing_scope: false,
            warning: None,
        },
        FilterOutcome::MissingScope => SearchRes {
            rows: Vec::new(),
            total: 0,
            missing_scope: true,
            warning: Some("검색할 범위를 1개 이상 선택해주세요.".into()),
        },
    };
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/datasets/{id}/items",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ItemSearchParams
    ),
    responses(
        (status = 200, description = "Sorted item names containing the keyword", body = ItemListRes),
        (status = 404, description = "Unknown dataset"),
        (status = 503, description = "Dataset disabled")
    )
)]
/// Search item names for the drill-down selector
///
/// Returns the sorted, de-duplicated item names whose lowercase form contains
/// the keyword. An empty keyword yields an empty list: the selector only
/// offers items after a search.
#[axum::debug_handler]
async fn list_items(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    AxumQuery(params): AxumQuery<ItemSearchParams>,
) -> Result<Json<ItemListRes>, (StatusCode, String)> {
    let dataset = state.registry.get(&id).map_err(error_response)?;
    Ok(Json(ItemListRes {
        items: dataset.item_names_matching(&params.keyword),
    }))
}

/// Shared drill-down assembly for the analysis and export handlers.
fn analyse(
    state: &AppState,
    dataset_id: &str,
    item_name: &str,
) -> Result<(ItemStats, Vec<RecordDto>, RankDto), (StatusCode, String)> {
    let dataset = state.registry.get(dataset_id).map_err(error_response)?;
    let rows = dataset.item_rows(item_name);
    let Some(stats) = aggregate(&rows) else {
        return Err((
            StatusCode::NOT_FOUND,
            format!("no rows for item: {item_name}"),
        ));
    };

    let our_hospital = state.cfg.our_hospital();
    let rank_dto = match rank(&rows, our_hospital) {
        RankOutcome::Ranked { rank, price, total } => RankDto {
            hospital: our_hospital.to_owned(),
            found: true,
            rank: Some(rank),
            price: Some(price),
            total,
            message: format!("{our_hospital} 순위: {rank} 위 / {total} 곳"),
        },
        RankOutcome::NotFound => RankDto {
            hospital: our_hospital.to_owned(),
            found: false,
            rank: None,
            price: None,
            total: rows.len(),
            message: format!(
                "'{item_name}' 항목에 대한 {our_hospital} 데이터를 찾을 수 없습니다."
            ),
        },
    };

    let report = report_projection(&rows)
        .into_iter()
        .map(RecordDto::from)
        .collect();
    Ok((stats, report, rank_dto))
}

#[utoipa::path(
    get,
    path = "/datasets/{id}/items/{item}/analysis",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ("item" = String, Path, description = "Exact item name")
    ),
    responses(
        (status = 200, description = "Statistics, rank, and report projection", body = AnalysisRes),
        (status = 404, description = "Unknown dataset or item"),
        (status = 503, description = "Dataset disabled")
    )
)]
/// Drill-down analysis for one item
///
/// Returns the aggregate statistics, the distinguished hospital's rank within
/// the item's price distribution (not-found is informational, carried in the
/// body), and the price-sorted report projection.
#[axum::debug_handler]
async fn analyse_item(
    State(state): State<AppState>,
    AxumPath((id, item)): AxumPath<(String, String)>,
) -> Result<Json<AnalysisRes>, (StatusCode, String)> {
    let (stats, report, rank) = analyse(&state, &id, &item)?;
    Ok(Json(AnalysisRes {
        item_name: item,
        stats: StatsDto::from(&stats),
        rank,
        report,
    }))
}

#[utoipa::path(
    get,
    path = "/datasets/{id}/items/{item}/report.xlsx",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ("item" = String, Path, description = "Exact item name")
    ),
    responses(
        (status = 200, description = "xlsx report download"),
        (status = 404, description = "Unknown dataset or item"),
        (status = 500, description = "Report generation failed"),
        (status = 503, description = "Dataset disabled")
    )
)]
/// Download the spreadsheet report for one item
///
/// Generation failures are contained here: the endpoint answers 500 and the
/// rest of the service stays usable.
#[axum::debug_handler]
async fn export_spreadsheet(
    State(state): State<AppState>,
    AxumPath((id, item)): AxumPath<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    let dataset = state.registry.get(&id).map_err(error_response)?;
    let rows = dataset.item_rows(&item);
    let Some(stats) = aggregate(&rows) else {
        return Err((StatusCode::NOT_FOUND, format!("no rows for item: {item}")));
    };
    let projected = report_projection(&rows);

    let bytes = npay_export::spreadsheet::render(&item, &stats, &projected).map_err(|e| {
        tracing::error!("spreadsheet export failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Excel 파일 생성 중 오류가 발생했습니다: {e}"),
        )
    })?;

    Ok(download_response(
        bytes,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &format!("{item}_report.xlsx"),
    ))
}

#[utoipa::path(
    get,
    path = "/datasets/{id}/items/{item}/report.pdf",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ("item" = String, Path, description = "Exact item name")
    ),
    responses(
        (status = 200, description = "PDF report download"),
        (status = 404, description = "Unknown dataset or item"),
        (status = 500, description = "Report generation failed"),
        (status = 503, description = "Dataset disabled or document export unavailable")
    )
)]
/// Download the document (PDF) report for one item
///
/// When the document writer was not compiled in, the capability flag is off
/// and this endpoint answers 503 up front; the export is never attempted.
#[axum::debug_handler]
async fn export_document(
    State(state): State<AppState>,
    AxumPath((id, item)): AxumPath<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    if !npay_export::document_export_available() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "document export is disabled in this build".into(),
        ));
    }

    let dataset = state.registry.get(&id).map_err(error_response)?;
    let rows = dataset.item_rows(&item);
    let Some(stats) = aggregate(&rows) else {
        return Err((StatusCode::NOT_FOUND, format!("no rows for item: {item}")));
    };
    let projected = report_projection(&rows);

    let report = DocumentReport {
        item_name: &item,
        stats: &stats,
        rows: &projected,
        font_path: state.cfg.document_font_path(),
    };
    let bytes = npay_export::document::render(&report).map_err(|e| {
        tracing::error!("document export failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("document generation failed: {e}"),
        )
    })?;

    Ok(download_response(
        bytes,
        "application/pdf",
        &format!("{item}_report.pdf"),
    ))
}

fn download_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/feedback",
    request_body = FeedbackReq,
    responses(
        (status = 201, description = "Feedback appended", body = FeedbackRes),
        (status = 400, description = "Empty feedback text"),
        (status = 500, description = "Internal server error")
    )
)]
/// Append one feedback entry to the local log
///
/// Empty text is rejected with a warning and nothing is written. The log is
/// created with a header row on first use.
#[axum::debug_handler]
async fn submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackReq>,
) -> Result<(StatusCode, Json<FeedbackRes>), (StatusCode, String)> {
    state.feedback.append(&req.text).map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackRes {
            ok: true,
            message: "소중한 의견 감사합니다! 피드백이 성공적으로 제출되었습니다.".into(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use npay_core::{constants::PUBLIC_DATASET_ID, Dataset, DatasetId};
    use std::path::PathBuf;

    fn record(item: &str, hospital: &str, price: f64) -> Record {
        Record {
            item_name: item.into(),
            hospital_name: hospital.into(),
            price,
            item_code: None,
        }
    }

    fn test_state(dir: &std::path::Path) -> AppState {
        let dataset = Dataset::from_records(vec![
            record("도수치료", "A병원", 100_000.0),
            record("도수치료", "삼성서울병원", 150_000.0),
            record("MRI 검사", "B병원", 450_000.0),
        ]);
        let registry = DatasetRegistry::single(
            DatasetId::new(PUBLIC_DATASET_ID),
            "공공 데이터 분석",
            dataset,
        );
        let cfg = CoreConfig::new(
            dir.join("data.csv"),
            dir.join("crawled_data.csv"),
            dir.join("feedback.csv"),
            "삼성서울병원".into(),
            PathBuf::from("fonts/NanumGothic.ttf"),
        )
        .unwrap();
        AppState::new(registry, cfg)
    }

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            parse_scopes("item_name, hospital_name").unwrap(),
            vec![Scope::ItemName, Scope::HospitalName]
        );
        assert!(parse_scopes("").unwrap().is_empty());
        assert!(parse_scopes("bogus").is_err());
    }

    #[test]
    fn test_analyse_assembles_rank_and_projection() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (stats, report, rank) = analyse(&state, "public", "도수치료").unwrap();
        assert_eq!(stats.count, 2);
        assert!(rank.found);
        assert_eq!(rank.rank, Some(1));
        assert_eq!(report[0].hospital_name, "삼성서울병원");
        assert_eq!(report[1].hospital_name, "A병원");
    }

    #[test]
    fn test_analyse_not_found_rank_is_informational() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (_, _, rank) = analyse(&state, "public", "MRI 검사").unwrap();
        assert!(!rank.found);
        assert!(rank.message.contains("찾을 수 없습니다"));
    }

    #[test]
    fn test_analyse_unknown_item_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = analyse(&state, "public", "없는 항목").unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unknown_dataset_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let err = analyse(&state, "nope", "도수치료").unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
