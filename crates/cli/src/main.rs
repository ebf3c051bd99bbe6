use clap::{Parser, Subcommand, ValueEnum};
use npay_core::{
    aggregate, constants::PUBLIC_DATASET_ID, filter, format::format_count, format::format_won,
    load_single_dataset, rank, report_projection, CoreConfig, FeedbackLog, FilterOutcome, Query,
    RankOutcome, Scope,
};
use npay_export::DocumentReport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "npay")]
#[command(about = "Non-covered medical price analysis CLI")]
struct Cli {
    /// Dataset CSV file (defaults to NPAY_DATA_FILE or data.csv)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Xlsx,
    Pdf,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter rows by keyword over one or more scopes
    Search {
        /// Keyword to look for (case-insensitive substring)
        keyword: String,
        /// Scope to match: item_name, hospital_name, item_code (repeatable)
        #[arg(long = "scope", value_enum)]
        scopes: Vec<CliScope>,
    },
    /// List item names containing a keyword
    Items {
        /// Keyword to search item names for
        keyword: String,
    },
    /// Show statistics, our hospital's rank, and the price list for one item
    Analyse {
        /// Exact item name
        item: String,
    },
    /// Write the item report to a file
    Export {
        /// Exact item name
        item: String,
        /// Report format
        #[arg(long, value_enum, default_value = "xlsx")]
        format: ExportFormat,
        /// Output path (defaults to "<item>_report.<ext>")
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Append feedback to the local log
    Feedback {
        /// Feedback text
        text: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum CliScope {
    ItemName,
    HospitalName,
    ItemCode,
}

impl From<CliScope> for Scope {
    fn from(scope: CliScope) -> Self {
        match scope {
            CliScope::ItemName => Scope::ItemName,
            CliScope::HospitalName => Scope::HospitalName,
            CliScope::ItemCode => Scope::ItemCode,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = CoreConfig::from_env()?;
    let data_path = cli
        .data
        .unwrap_or_else(|| cfg.public_dataset_path().to_path_buf());

    match cli.command {
        Some(Commands::Search { keyword, scopes }) => {
            // Single-dataset variant: a missing file is fatal here.
            let registry = load_single_dataset(&data_path)?;
            let dataset = registry.get(PUBLIC_DATASET_ID)?;
            let query = Query {
                scopes: scopes.into_iter().map(Scope::from).collect(),
                keyword,
                selected_item: None,
            };
            match filter(&dataset, &query) {
                FilterOutcome::MissingScope => {
                    eprintln!("검색할 범위를 1개 이상 선택해주세요.");
                }
                FilterOutcome::Rows(rows) => {
                    for row in &rows {
                        match &row.item_code {
                            Some(code) => println!(
                                "{} | {} | {} | {}",
                                row.item_name,
                                row.hospital_name,
                                format_won(row.price),
                                code
                            ),
                            None => println!(
                                "{} | {} | {}",
                                row.item_name,
                                row.hospital_name,
                                format_won(row.price)
                            ),
                        }
                    }
                    println!("조회된 항목 수: {} 건", rows.len());
                }
            }
        }
        Some(Commands::Items { keyword }) => {
            let registry = load_single_dataset(&data_path)?;
            let dataset = registry.get(PUBLIC_DATASET_ID)?;
            let items = dataset.item_names_matching(&keyword);
            if items.is_empty() {
                println!("No matching items.");
            } else {
                for item in items {
                    println!("{item}");
                }
            }
        }
        Some(Commands::Analyse { item }) => {
            let registry = load_single_dataset(&data_path)?;
            let dataset = registry.get(PUBLIC_DATASET_ID)?;
            let rows = dataset.item_rows(&item);
            let Some(stats) = aggregate(&rows) else {
                eprintln!("No rows for item: {item}");
                std::process::exit(1);
            };

            println!("'{item}' 상세 분석");
            println!("평균 가격: {}", format_won(stats.mean));
            println!("중앙값: {}", format_won(stats.median));
            println!("최저가: {}", format_won(stats.min));
            println!("최고가: {}", format_won(stats.max));
            println!("취급 병원 수: {}", format_count(stats.count));

            match rank(&rows, cfg.our_hospital()) {
                RankOutcome::Ranked {
                    rank,
                    price,
                    total,
                } => {
                    println!("{} 순위: {} 위 / {} 곳", cfg.our_hospital(), rank, total);
                    println!("가격: {}", format_won(price));
                }
                RankOutcome::NotFound => println!(
                    "'{}' 항목에 대한 {} 데이터를 찾을 수 없습니다.",
                    item,
                    cfg.our_hospital()
                ),
            }

            println!();
            for row in report_projection(&rows) {
                println!("{} | {}", row.hospital_name, format_won(row.price));
            }
        }
        Some(Commands::Export {
            item,
            format,
            output,
        }) => {
            let registry = load_single_dataset(&data_path)?;
            let dataset = registry.get(PUBLIC_DATASET_ID)?;
            let rows = dataset.item_rows(&item);
            let Some(stats) = aggregate(&rows) else {
                eprintln!("No rows for item: {item}");
                std::process::exit(1);
            };
            let projected = report_projection(&rows);

            let (bytes, extension) = match format {
                ExportFormat::Xlsx => (
                    npay_export::spreadsheet::render(&item, &stats, &projected)?,
                    "xlsx",
                ),
                ExportFormat::Pdf => {
                    if !npay_export::document_export_available() {
                        eprintln!("document export is disabled in this build");
                        std::process::exit(1);
                    }
                    let report = DocumentReport {
                        item_name: &item,
                        stats: &stats,
                        rows: &projected,
                        font_path: cfg.document_font_path(),
                    };
                    (npay_export::document::render(&report)?, "pdf")
                }
            };

            let path =
                output.unwrap_or_else(|| PathBuf::from(format!("{item}_report.{extension}")));
            std::fs::write(&path, bytes)?;
            println!("Report written to {}", path.display());
        }
        Some(Commands::Feedback { text }) => {
            let log = FeedbackLog::new(cfg.feedback_path());
            match log.append(&text) {
                Ok(()) => println!("피드백이 성공적으로 제출되었습니다."),
                Err(e) => eprintln!("{e}"),
            }
        }
        None => {
            println!("No command given. Try `npay --help`.");
        }
    }

    Ok(())
}
