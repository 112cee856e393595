//! spotistat - Analyze exported Spotify streaming history

use spotistat::{
    aggregation::Aggregator,
    cli::Cli,
    data_loader::DataLoader,
    error::Result,
    filters::{AvailableDates, WindowFilter},
    output::{OutputFormatter, get_formatter},
    selector::{DateRangeSelector, Selection},
    timezone::TimezoneConfig,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Helper function to create an aggregator with timezone configuration
fn create_aggregator(cli: &Cli) -> Result<Aggregator> {
    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.local)?;
    info!("Using timezone: {}", tz_config.display_name());

    Ok(Aggregator::new(tz_config)
        .with_top(cli.top)
        .with_history_top(cli.history_top))
}

/// Build the loader from explicit files or by searching the data directory
fn create_loader(cli: &Cli, show_progress: bool) -> Result<DataLoader> {
    let loader = if cli.files.is_empty() {
        info!("Searching {} for history files", cli.data_dir.display());
        DataLoader::discover(&cli.data_dir, &cli.prefix)?
    } else {
        DataLoader::from_files(cli.files.clone())
    };

    Ok(loader.with_progress(show_progress))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first to check for quiet flag
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        let default_level = if cli.verbose {
            "spotistat=info"
        } else {
            "spotistat=warn"
        };
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli.validate()?;

    let is_tty = is_terminal::is_terminal(std::io::stdout());
    let show_progress = !cli.json && is_tty;
    let colored = is_tty && std::env::var("NO_COLOR").is_err();

    let aggregator = create_aggregator(&cli)?;
    let loader = create_loader(&cli, show_progress)?;
    let events = loader.load_events().await?;
    let formatter = get_formatter(cli.json, colored);
    let tz = aggregator.timezone_config().tz;

    if let Some(requested) = cli.window_request()? {
        info!("Running single report for {}", requested);

        let window = AvailableDates::from_events(&events, &tz).validate(requested)?;
        let selected = WindowFilter::new(window).with_timezone(tz).apply(&events);
        print_report(formatter.as_ref(), &aggregator, &selected, &window.label());
        return Ok(());
    }

    info!("Starting interactive session");
    let stdin = std::io::stdin();
    let mut selector = DateRangeSelector::new(stdin.lock(), std::io::stdout()).with_timezone(tz);

    loop {
        match selector.run(&events)? {
            Selection::Window { events, label, .. } => {
                print_report(formatter.as_ref(), &aggregator, &events, &label);
            }
            Selection::Exit => break,
        }
    }

    Ok(())
}

fn print_report(
    formatter: &dyn OutputFormatter,
    aggregator: &Aggregator,
    events: &[spotistat::StreamEvent],
    label: &str,
) {
    let report = aggregator.report(events, label);
    println!("{}", formatter.format_report(&report));
}
