//! CLI argument definitions, routing, and tracing setup.

use chrono::{Duration, Local, NaiveDateTime};
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use conftrack_report::RenderOptions;
use conftrack_shared::{AppConfig, load_config, resolve_date_phrase};
use conftrack_store::Storage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// conftrack — a local conference tracker.
#[derive(Parser)]
#[command(
    name = "conftrack",
    version,
    about = "Track conference listings from the remote listings page in a local database.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Update the local database from the remote listings page.
    #[arg(short, long)]
    pub update: bool,

    /// Earliest date when listing, as a date phrase (default: now).
    #[arg(short = 'f', long = "from", num_args = 1.., value_name = "PHRASE")]
    pub from: Option<Vec<String>>,

    /// Latest date when listing, as a date phrase.
    #[arg(short = 't', long = "to", num_args = 1.., value_name = "PHRASE")]
    pub to: Option<Vec<String>>,

    /// Do not print conferences.
    #[arg(short, long)]
    pub silent: bool,

    /// Write a default config file and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "conftrack=info",
        1 => "conftrack=debug",
        _ => "conftrack=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if cli.init_config {
        let path = conftrack_shared::init_config()?;
        println!("Config initialized at: {}", path.display());
        return Ok(());
    }

    // One consistent "now" for the whole invocation: date_added assignment,
    // recency flags, and the --from default all derive from this instant.
    let run_timestamp = Local::now().naive_local();

    let config = load_config()?;
    let opts = render_options(&config);

    if cli.update {
        cmd_update(&cli, &config, &opts, run_timestamp).await?;
    }

    if !cli.silent && !cli.update {
        cmd_list(&cli, &config, &opts, run_timestamp).await?;
    }

    Ok(())
}

fn render_options(config: &AppConfig) -> RenderOptions {
    RenderOptions {
        title_width: config.display.title_width,
        recency_window: Duration::hours(config.display.recency_hours),
    }
}

/// Join a multi-word phrase and resolve it through the date-phrase resolver.
fn resolve_bound(phrase: &[String], now: NaiveDateTime) -> Result<NaiveDateTime> {
    let joined = phrase.join(" ");
    Ok(resolve_date_phrase(&joined, now)?)
}

async fn cmd_update(
    cli: &Cli,
    config: &AppConfig,
    opts: &RenderOptions,
    run_timestamp: NaiveDateTime,
) -> Result<()> {
    let listing_url = Url::parse(&config.source.listing_url)
        .map_err(|e| eyre!("invalid listing URL '{}': {e}", config.source.listing_url))?;

    let storage = Storage::open(&config.resolved_db_path()?).await?;

    info!(url = %listing_url, "updating conference database");
    println!("Getting conference data from {listing_url}");

    let spinner = update_spinner();
    let summary = conftrack_core::update_from_source(&storage, &listing_url, run_timestamp).await;
    spinner.finish_and_clear();
    let summary = summary?;

    // --silent suppresses all presentation after the update, banner included.
    for line in update_report_lines(&summary, run_timestamp, opts, cli.silent) {
        println!("{line}");
    }

    Ok(())
}

/// Lines printed after an update: the boxed banner plus the new-additions
/// presentation, or nothing at all in silent mode.
fn update_report_lines(
    summary: &conftrack_core::UpdateSummary,
    run_timestamp: NaiveDateTime,
    opts: &RenderOptions,
    silent: bool,
) -> Vec<String> {
    if silent {
        return Vec::new();
    }

    let mut lines = conftrack_report::boxed_header(&format!(
        "{} NEW CONFERENCES ADDED",
        summary.inserted.len()
    ));
    lines.extend(conftrack_report::render_new_additions(
        &summary.inserted,
        run_timestamp,
        opts,
    ));
    lines
}

async fn cmd_list(
    cli: &Cli,
    config: &AppConfig,
    opts: &RenderOptions,
    run_timestamp: NaiveDateTime,
) -> Result<()> {
    let storage = Storage::open(&config.resolved_db_path()?).await?;

    // --from defaults to the run timestamp; --to is unbounded by default.
    let start = match &cli.from {
        Some(phrase) => Some(resolve_bound(phrase, run_timestamp)?),
        None => Some(run_timestamp),
    };
    let end = match &cli.to {
        Some(phrase) => Some(resolve_bound(phrase, run_timestamp)?),
        None => None,
    };

    let results = conftrack_core::query(&storage, start, end, run_timestamp).await?;
    for line in conftrack_report::render_by_year(&results, run_timestamp, opts) {
        println!("{line}");
    }

    Ok(())
}

/// Spinner shown while the listings page is fetched and reconciled.
fn update_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message("Fetching and reconciling conference listings");
    spinner
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use conftrack_core::UpdateSummary;
    use conftrack_shared::{Conference, StoredConference};

    use super::*;

    fn dt(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn summary_with_one_insert(run_ts: NaiveDateTime) -> UpdateSummary {
        UpdateSummary {
            extracted: 1,
            inserted: vec![StoredConference {
                conference: Conference {
                    remote_id: 7,
                    title: "GR24".to_string(),
                    abstract_text: String::new(),
                    location: "Glasgow, UK".to_string(),
                    start: dt(2026, 9, 1),
                    end: dt(2026, 9, 5),
                    url: "https://example.org/gr24".to_string(),
                },
                date_added: run_ts,
            }],
            updated: 0,
        }
    }

    #[test]
    fn silent_update_prints_nothing() {
        let run_ts = dt(2026, 8, 27);
        let summary = summary_with_one_insert(run_ts);

        let lines = update_report_lines(&summary, run_ts, &RenderOptions::default(), true);
        assert!(lines.is_empty());
    }

    #[test]
    fn update_report_leads_with_banner_then_new_additions() {
        let run_ts = dt(2026, 8, 27);
        let summary = summary_with_one_insert(run_ts);

        let lines = update_report_lines(&summary, run_ts, &RenderOptions::default(), false);
        assert!(lines[0].starts_with('╔'));
        assert!(lines.iter().any(|l| l.contains("1 NEW CONFERENCES ADDED")));
        assert!(lines.iter().any(|l| l == "NEW ADDITIONS:"));
        assert!(lines.iter().any(|l| l.contains("GR24")));
    }
}
