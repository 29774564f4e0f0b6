use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use tycg_stats::app::App;
use tycg_stats::catalog::Catalog;
use tycg_stats::client::{StatsClient, TycgHttpClient};
use tycg_stats::config::{ConfigLoader, ResolvedConfig};
use tycg_stats::dataset::Dataset;
use tycg_stats::domain::{SeriesKey, TimeRange};
use tycg_stats::error::StatsError;
use tycg_stats::output::JsonOutput;

#[derive(Parser)]
#[command(name = "tycg-stats")]
#[command(about = "Search, fetch and analyze Taoyuan City statistical series")]
#[command(version, author)]
struct Cli {
    /// JSON config file (default: ./tycg-stats.json if present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Series catalog CSV
    #[arg(long, global = true)]
    catalog: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Search the series catalog by keyword")]
    Search(SearchArgs),
    #[command(about = "Fetch a series; large series are returned as a preview")]
    Fetch(SeriesArgs),
    #[command(about = "Fetch a series and print a statistical report")]
    Analyze(SeriesArgs),
}

#[derive(Args)]
struct SearchArgs {
    keyword: String,
}

#[derive(Args)]
struct SeriesArgs {
    /// Series as tid-cid-sid, e.g. 0001-0002-000005
    series: SeriesKey,

    /// First year (YYYY); needs --end as well
    #[arg(long)]
    begin: Option<String>,

    /// Last year (YYYY); needs --begin as well
    #[arg(long)]
    end: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<StatsError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &StatsError) -> u8 {
    match error {
        StatsError::CatalogUnavailable
        | StatsError::CatalogRead(_)
        | StatsError::MissingConfig(_) => 2,
        StatsError::FetchFailed | StatsError::HttpClient(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Search(args) => {
            let catalog_path = cli.catalog.or_else(|| config.catalog.clone());
            run_search(args, catalog_path)
        }
        Command::Fetch(args) => run_fetch(args, &config),
        Command::Analyze(args) => run_analyze(args, &config),
    }
}

fn run_search(args: SearchArgs, catalog_path: Option<Utf8PathBuf>) -> miette::Result<()> {
    let catalog = Catalog::install(Catalog::discover(catalog_path.as_deref())?)?;
    let app = App::new(NopClient, Some(catalog));
    let outcome = app.search_catalog(&args.keyword)?;
    JsonOutput::print_search(&outcome).into_diagnostic()
}

fn run_fetch(args: SeriesArgs, config: &ResolvedConfig) -> miette::Result<()> {
    let app = build_app(config)?;
    let payload =
        app.statistics_data(&args.series, args.begin.as_deref(), args.end.as_deref())?;
    JsonOutput::print_payload(&payload).into_diagnostic()
}

fn run_analyze(args: SeriesArgs, config: &ResolvedConfig) -> miette::Result<()> {
    let app = build_app(config)?;
    let report = app.analyze(&args.series, args.begin.as_deref(), args.end.as_deref())?;
    JsonOutput::print_report(&report).into_diagnostic()
}

fn build_app(config: &ResolvedConfig) -> miette::Result<App<'static, TycgHttpClient>> {
    let client = TycgHttpClient::new(config)?;
    Ok(App::new(client, None).with_aggregate_label(config.aggregate_label.clone()))
}

/// Search never touches the network.
struct NopClient;

impl StatsClient for NopClient {
    fn fetch_series(&self, _key: &SeriesKey, _range: &TimeRange) -> Result<Dataset, StatsError> {
        Err(StatsError::FetchFailed)
    }
}
