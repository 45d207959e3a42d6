use crate::console;
use crate::infra::{load_dataset, resolve_today};
use crate::server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use food_share::config::{AppConfig, DataConfig};
use food_share::error::AppError;
use food_share::exchange::report::{self, ReportKind, ReportTable};
use food_share::exchange::{Dataset, DayWindow, FilterPredicates, ReceiverId};
use food_share::telemetry::{self, LogSink};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Food Share",
    about = "Filter surplus food listings and run exchange reports from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Narrow listings and their claims with the filter cascade
    Filter(FilterArgs),
    /// Run one report from the catalog
    Report(ReportArgs),
    /// List the report catalog
    Reports,
    /// Print KPIs, top providers and the filtered listing table
    Dashboard(FilterArgs),
    /// Aggregate donations, providers, receivers or wastage
    Insights(InsightsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding the four CSV exports
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DatasetArgs {
    /// Directory holding the four CSV exports (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FilterArgs {
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
    /// Listing location or provider city, case-insensitive
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Exact provider name
    #[arg(long)]
    pub(crate) provider: Option<String>,
    /// Allowed food type; repeat for several
    #[arg(long = "food-type")]
    pub(crate) food_types: Vec<String>,
    /// Allowed meal type; repeat for several
    #[arg(long = "meal-type")]
    pub(crate) meal_types: Vec<String>,
    /// Lower bound of the days-to-expiry window
    #[arg(long)]
    pub(crate) min_days: Option<u32>,
    /// Upper bound of the days-to-expiry window
    #[arg(long)]
    pub(crate) max_days: Option<u32>,
    /// Keep listings without an expiry date while a window is active
    #[arg(long)]
    pub(crate) include_unknown: bool,
    /// Drop listings that have already expired
    #[arg(long)]
    pub(crate) upcoming: bool,
    /// Keep only claims by this receiver id; repeat for several
    #[arg(long = "receiver")]
    pub(crate) receivers: Vec<u32>,
    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

impl FilterArgs {
    pub(crate) fn predicates(&self) -> FilterPredicates {
        let days_window = match (self.min_days, self.max_days) {
            (None, None) => None,
            (min, max) => Some(DayWindow::new(min.unwrap_or(0), max.unwrap_or(u32::MAX))),
        };

        FilterPredicates {
            city: self.city.clone(),
            provider_name: self.provider.clone(),
            food_types: self.food_types.clone(),
            meal_types: self.meal_types.clone(),
            days_window,
            include_unknown_expiry: self.include_unknown,
            only_upcoming: self.upcoming,
            receiver_ids: self.receivers.iter().copied().map(ReceiverId).collect(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Report slug or catalog position (e.g. `expired-listings`, `q14`)
    pub(crate) report: String,
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
    /// City parameter for reports that need one
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Write the table as CSV to stdout
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum InsightView {
    Donations,
    Providers,
    Receivers,
    /// Honours the filter flags
    Wastage,
}

#[derive(Args, Debug)]
pub(crate) struct InsightsArgs {
    #[arg(value_enum)]
    pub(crate) view: InsightView,
    #[command(flatten)]
    pub(crate) filter: FilterArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Filter(args) => run_filter(args),
        Command::Report(args) => run_report(args),
        Command::Reports => {
            print!("{}", console::render_catalog(&ReportKind::catalog()));
            Ok(())
        }
        Command::Dashboard(args) => run_dashboard(args),
        Command::Insights(args) => run_insights(args),
    }
}

/// Logs go to stderr so tables and CSV on stdout stay pipeable.
fn prepare(args: &DatasetArgs) -> Result<(Dataset, NaiveDate), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let data = args
        .data_dir
        .as_ref()
        .map(DataConfig::with_dir)
        .unwrap_or(config.data);
    let dataset = load_dataset(&data)?;
    Ok((dataset, resolve_today(args.today)))
}

fn run_filter(args: FilterArgs) -> Result<(), AppError> {
    let (dataset, today) = prepare(&args.dataset)?;
    let outcome = dataset.filter(&args.predicates(), today);

    if args.json {
        let payload = serde_json::json!({
            "today": today,
            "listings": outcome.annotated(today),
            "claims": outcome.claims,
        });
        print_json(&payload)?;
    } else {
        print!("{}", console::render_outcome(&dataset, &outcome, today));
    }
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let (dataset, today) = prepare(&args.dataset)?;
    let table = report::run_report(&args.report, &dataset, args.city.as_deref(), today)?;

    if args.csv {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        table.write_csv(&mut handle)?;
        handle.flush()?;
    } else {
        print!("{}", console::render_table(&table));
    }
    Ok(())
}

fn run_dashboard(args: FilterArgs) -> Result<(), AppError> {
    let (dataset, today) = prepare(&args.dataset)?;
    let summary = report::dashboard(&dataset, &args.predicates(), today);

    if args.json {
        print_json(&summary)?;
    } else {
        print!("{}", console::render_dashboard(&dataset, &summary));
    }
    Ok(())
}

fn run_insights(args: InsightsArgs) -> Result<(), AppError> {
    let (dataset, today) = prepare(&args.filter.dataset)?;
    let json = args.filter.json;

    match args.view {
        InsightView::Donations => {
            let analysis = report::donations_analysis(&dataset);
            print_insight(&analysis, analysis.tables(), json)
        }
        InsightView::Providers => {
            let insights = report::provider_insights(&dataset);
            print_insight(&insights, insights.tables(), json)
        }
        InsightView::Receivers => {
            let insights = report::receiver_insights(&dataset);
            print_insight(&insights, insights.tables(), json)
        }
        InsightView::Wastage => {
            let wastage = report::wastage(&dataset, &args.filter.predicates(), today);
            print_insight(&wastage, wastage.tables(), json)
        }
    }
}

fn print_insight<T: Serialize>(
    value: &T,
    tables: Vec<ReportTable>,
    json: bool,
) -> Result<(), AppError> {
    if json {
        return print_json(value);
    }
    for table in &tables {
        println!("{}", console::render_table(table));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    write_json(std::io::stdout().lock(), value)
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
