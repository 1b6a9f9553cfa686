//! # finreport-cli
//!
//! Command-line interface for generating PDF reports from Excel files.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use finreport_core::{
    FilterOperator, FilterSpec, Notification, ReportOptions, Session, SortDirection, SortSpec,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// finreport - Turn Excel sheets into PDF financial reports
#[derive(Parser)]
#[command(name = "finreport")]
#[command(author, version, about = "Generate PDF financial reports from Excel files", long_about = None)]
struct Cli {
    /// Excel file to load (.xlsx or .xls)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Report file name, without extension
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    output: Option<String>,

    /// Directory the report is written to
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Row filter; may be repeated
    #[arg(short = 'f', long = "filter", value_name = "COL:OP:VALUE", long_help = filter_help())]
    filters: Vec<String>,

    /// Sort column, optionally followed by :asc or :desc
    #[arg(short = 's', long = "sort", value_name = "COL[:asc|desc]")]
    sort: Option<String>,

    /// Report title
    #[arg(short = 't', long = "title")]
    title: Option<String>,

    /// JSON file with report options
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the distinct values of a column and exit
    #[arg(long = "list-values", value_name = "COL")]
    list_values: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let mut options = match &cli.config {
        Some(path) => load_options(path)?,
        None => ReportOptions::default(),
    };
    if let Some(title) = &cli.title {
        options.title.clone_from(title);
    }

    let mut session = Session::new(options);
    let notification = session.upload(&cli.file).await;
    if !notification.is_success() {
        return fail(&notification);
    }
    print_notification(&notification);

    if let Some(column) = &cli.list_values {
        let values = session
            .unique_values(column)
            .with_context(|| format!("Cannot list values of '{column}'"))?;
        for value in values {
            println!("{value}");
        }
        return Ok(());
    }

    for raw in &cli.filters {
        let filter = parse_filter(raw)?;
        if !session.headers().contains(&filter.column) {
            println!(
                "{} no column named '{}'; the filter matches nothing",
                "Warning:".yellow().bold(),
                filter.column
            );
        }
        tracing::debug!(?filter, "Parsed filter");
        session.push_filter(filter);
    }
    if let Some(raw) = &cli.sort {
        let sort = parse_sort(raw);
        tracing::debug!(?sort, "Parsed sort");
        session.set_sort(sort);
    }
    if let Some(name) = &cli.output {
        session.set_output_name(name.as_str());
    }

    if let Some(view) = session.view() {
        let total = session.table().map_or(0, |t| t.row_count());
        println!("Rendering {} of {} rows", view.len().to_string().cyan(), total);
    }

    let notification = session.generate(&cli.out_dir).await;
    if !notification.is_success() {
        return fail(&notification);
    }
    print_notification(&notification);
    Ok(())
}

/// Read report options from a JSON file.
fn load_options(path: &Path) -> Result<ReportOptions> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Operator names accepted in `--filter`, comma separated.
fn operator_names() -> String {
    FilterOperator::ALL
        .iter()
        .map(|(operator, _)| operator.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn filter_help() -> String {
    format!(
        "Row filter; may be repeated. Operators: {}",
        operator_names()
    )
}

/// Parse `COL:OP:VALUE`. The value may itself contain colons.
fn parse_filter(raw: &str) -> Result<FilterSpec> {
    let mut parts = raw.splitn(3, ':');
    let (Some(column), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!("Invalid filter: '{raw}'. Expected COL:OP:VALUE format");
    };
    let operator = FilterOperator::from(operator.to_string());
    if let FilterOperator::Unrecognized(op) = &operator {
        println!(
            "{} unknown operator '{op}'; the filter matches every row (known: {})",
            "Warning:".yellow().bold(),
            operator_names()
        );
    }
    Ok(FilterSpec::new(column, operator, value))
}

/// Parse `COL`, `COL:asc` or `COL:desc`.
fn parse_sort(raw: &str) -> SortSpec {
    match raw.rsplit_once(':') {
        Some((column, direction)) if direction.eq_ignore_ascii_case("asc") => {
            SortSpec::new(column, SortDirection::Ascending)
        }
        Some((column, direction)) if direction.eq_ignore_ascii_case("desc") => {
            SortSpec::new(column, SortDirection::Descending)
        }
        _ => SortSpec::ascending(raw),
    }
}

fn print_notification(notification: &Notification) {
    println!(
        "{} {}",
        notification.title.green().bold(),
        notification.description
    );
}

fn fail(notification: &Notification) -> Result<()> {
    eprintln!(
        "{} {}",
        notification.title.red().bold(),
        notification.description
    );
    bail!(
        "{}",
        notification
            .detail
            .as_deref()
            .unwrap_or(&notification.description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::PageSize;
    use std::io::Write;

    // ========================================================================
    // Argument parsing
    // ========================================================================

    #[test]
    fn test_cli_parse_file() {
        let cli = Cli::parse_from(["finreport", "ledger.xlsx"]);
        assert_eq!(cli.file, PathBuf::from("ledger.xlsx"));
        assert_eq!(cli.out_dir, PathBuf::from("."));
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_repeated_filters() {
        let cli = Cli::parse_from([
            "finreport",
            "ledger.xlsx",
            "--filter",
            "amount:greater:100",
            "-f",
            "category:equals:Food",
            "--sort",
            "date:desc",
            "-o",
            "march",
            "-v",
        ]);
        assert_eq!(cli.filters, ["amount:greater:100", "category:equals:Food"]);
        assert_eq!(cli.sort.as_deref(), Some("date:desc"));
        assert_eq!(cli.output.as_deref(), Some("march"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_requires_file() {
        assert!(Cli::try_parse_from(["finreport"]).is_err());
    }

    // ========================================================================
    // Filter and sort arguments
    // ========================================================================

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter("amount:greater:100").unwrap();
        assert_eq!(filter, FilterSpec::new("amount", FilterOperator::Greater, "100"));

        let filter = parse_filter("time:startsWith:09:30").unwrap();
        assert_eq!(filter.operator, FilterOperator::StartsWith);
        assert_eq!(filter.value, "09:30");

        let filter = parse_filter("description:contains:").unwrap();
        assert_eq!(filter.value, "");
    }

    #[test]
    fn test_parse_filter_unknown_operator_kept() {
        let filter = parse_filter("amount:between:1").unwrap();
        assert_eq!(
            filter.operator,
            FilterOperator::Unrecognized("between".to_string())
        );
    }

    #[test]
    fn test_operator_names() {
        let names = operator_names();
        assert_eq!(names.split(", ").count(), 6);
        assert!(names.starts_with("contains, equals"));
        assert!(names.ends_with("startsWith, endsWith"));
        for name in names.split(", ") {
            assert!(!matches!(
                FilterOperator::from(name.to_string()),
                FilterOperator::Unrecognized(_)
            ));
        }
    }

    #[test]
    fn test_filter_long_help_lists_operators() {
        use clap::CommandFactory;
        let mut command = Cli::command();
        let help = command.render_long_help().to_string();
        assert!(help.contains("Operators: contains"));
        assert!(help.contains("startsWith, endsWith"));
    }

    #[test]
    fn test_parse_filter_invalid() {
        assert!(parse_filter("amount").is_err());
        assert!(parse_filter("amount:greater").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("amount"), SortSpec::ascending("amount"));
        assert_eq!(parse_sort("amount:desc"), SortSpec::descending("amount"));
        assert_eq!(parse_sort("amount:ASC"), SortSpec::ascending("amount"));
        assert_eq!(parse_sort("a:b"), SortSpec::ascending("a:b"));
    }

    // ========================================================================
    // Config
    // ========================================================================

    #[test]
    fn test_load_options() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"title": "Q1 Expenses", "page_size": "letter"}}"#).unwrap();

        let options = load_options(file.path()).unwrap();
        assert_eq!(options.title, "Q1 Expenses");
        assert_eq!(options.page_size, PageSize::Letter);
        assert_eq!(options.output_name, "financial-report");
    }

    #[test]
    fn test_load_options_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_options(file.path()).is_err());
        assert!(load_options(Path::new("/no/such/config.json")).is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_excel() {
        let mut session = Session::default();
        let notification = session.upload("report.csv").await;
        assert!(!notification.is_success());
        assert!(fail(&notification).is_err());
    }
}
