use std::{fs::write, io::stdout, io::Write, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ncc_core::{calendar_client, CalendarView, Client, ClientConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Ten years, far more than the API serves.
const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Parser)]
#[command(version, about = "Print the NYC 311 calendar as JSON")]
pub struct Arguments {
    /// the API key of the NYC API portal
    #[arg(long, env = "NYC_CALENDAR_API_KEY", hide_env_values = true)]
    pub api_key: String,
    /// the views to print, all of them if not given
    #[arg(long = "view", value_enum)]
    pub views: Vec<View>,
    /// remove "(Observed)" and the year from exception names
    #[arg(long)]
    pub scrub: bool,
    /// the number of days to fetch
    #[arg(
        long,
        default_value_t = calendar_client::DEFAULT_WINDOW_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS)
    )]
    pub days: u32,
    /// the calendar endpoint
    #[arg(long, env = "NYC_CALENDAR_URL", default_value = calendar_client::URL)]
    pub base_url: String,
    /// the request timeout in seconds
    #[arg(long, default_value_t = calendar_client::DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,
    /// write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// log debug output
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    ByDate,
    DaysAhead,
    NextExceptions,
}

impl From<View> for CalendarView {
    fn from(value: View) -> Self {
        match value {
            View::ByDate => CalendarView::ByDate,
            View::DaysAhead => CalendarView::DaysAhead,
            View::NextExceptions => CalendarView::NextExceptions,
        }
    }
}

impl From<&Arguments> for CalendarView {
    fn from(value: &Arguments) -> Self {
        let mut calendar_view = CalendarView::none();
        for view in &value.views {
            calendar_view |= CalendarView::from(*view);
        }
        calendar_view
    }
}

impl From<&Arguments> for ClientConfig {
    fn from(value: &Arguments) -> Self {
        ClientConfig::new(&value.api_key)
            .with_base_url(&value.base_url)
            .with_timeout(Duration::from_secs(value.timeout))
            .with_window_days(value.days)
    }
}

/// Log to stderr so stdout stays valid JSON.
fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "ncc=debug,ncc_core=debug"
    } else {
        "ncc=info,ncc_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    init_logger(args.verbose);
    let client = Client::new(ClientConfig::from(&args));
    let calendar = client
        .get_calendar(CalendarView::from(&args), args.scrub)
        .await
        .context("could not get the calendar")?;
    let json = serde_json::to_string_pretty(&calendar)?;
    match &args.output {
        Some(path) => {
            write(path, json).with_context(|| format!("could not write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote calendar");
        }
        None => writeln!(stdout(), "{json}")?,
    }
    Ok(())
}
