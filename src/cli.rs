//! CLI interface for spotistat
//!
//! This module defines the command-line interface using clap. Without a
//! window flag the binary runs the interactive date-range menu in a loop;
//! with one of `--all`, `--since/--until`, `--year` or `--month` it prints a
//! single report and exits.
//!
//! # Example
//!
//! ```bash
//! # Interactive menu over the exports in the current directory
//! spotistat
//!
//! # One report for March 2024, as JSON
//! spotistat --data-dir ~/my_spotify_data --month 2024-03 --json
//!
//! # Explicit files, dates in the local timezone
//! spotistat --local --year 2023 Streaming_History_Audio_2023.json
//! ```

use crate::aggregation::{DEFAULT_HISTORY_TOP, DEFAULT_TOP_N};
use crate::data_loader::DEFAULT_FILE_PREFIX;
use crate::error::{Result, SpotistatError};
use crate::filters::DateWindow;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Analyze exported Spotify streaming history
#[derive(Parser, Debug, Clone)]
#[command(name = "spotistat")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("window").args(["all", "since", "year", "month"])))]
pub struct Cli {
    /// History files to load (skips discovery)
    pub files: Vec<PathBuf>,

    /// Directory searched for history exports
    #[arg(long, short = 'd', env = "SPOTISTAT_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// File-name prefix of history exports
    #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
    pub prefix: String,

    /// Rows in the top artists, top tracks and day coverage views
    #[arg(long, short = 'n', default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Artists shown in the history view
    #[arg(long, default_value_t = DEFAULT_HISTORY_TOP)]
    pub history_top: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Timezone for calendar dates (e.g. "Europe/Berlin", "UTC")
    /// If not specified, dates are taken in UTC as exported
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Use the system's local timezone for calendar dates
    #[arg(long)]
    pub local: bool,

    /// Report the full history and exit
    #[arg(long)]
    pub all: bool,

    /// First day of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "until")]
    pub since: Option<String>,

    /// Last day of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "since")]
    pub until: Option<String>,

    /// Report one year (YYYY) and exit
    #[arg(long)]
    pub year: Option<String>,

    /// Report one month (YYYY-MM) and exit
    #[arg(long)]
    pub month: Option<String>,

    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors, even if RUST_LOG is set
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Check option values clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.top == 0 {
            return Err(SpotistatError::InvalidArgument(
                "--top must be at least 1".to_string(),
            ));
        }
        if self.history_top == 0 {
            return Err(SpotistatError::InvalidArgument(
                "--history-top must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The window requested on the command line, if any
    ///
    /// `None` means the interactive menu should run.
    pub fn window_request(&self) -> Result<Option<DateWindow>> {
        if self.all {
            return Ok(Some(DateWindow::All));
        }

        if let (Some(since), Some(until)) = (&self.since, &self.until) {
            return Ok(Some(DateWindow::Range {
                start: parse_date_filter(since)?,
                end: parse_date_filter(until)?,
            }));
        }

        if let Some(year) = &self.year {
            return Ok(Some(DateWindow::Year(parse_year_filter(year)?)));
        }

        if let Some(month) = &self.month {
            let (year, month) = parse_month_filter(month)?;
            return Ok(Some(DateWindow::Month { year, month }));
        }

        Ok(None)
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form
///
/// # Examples
/// ```
/// use spotistat::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2024-01-15").unwrap();
/// assert_eq!(date.year(), 2024);
/// assert_eq!(date.day(), 15);
///
/// assert!(parse_date_filter("2024-01").is_err());
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    let date_str = date_str.trim();
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        SpotistatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD"
        ))
    })
}

/// Parse a four-digit year
pub fn parse_year_filter(year_str: &str) -> Result<i32> {
    let year_str = year_str.trim();
    if year_str.len() != 4 || !year_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SpotistatError::InvalidDate(format!(
            "Invalid year '{year_str}', expected YYYY"
        )));
    }

    year_str
        .parse::<i32>()
        .map_err(|_| SpotistatError::InvalidDate(format!("Invalid year '{year_str}'")))
}

/// Parse a month number given as `3` or `03`
pub fn parse_month_number(month_str: &str) -> Result<u32> {
    let month_str = month_str.trim();
    let month = month_str
        .parse::<u32>()
        .ok()
        .filter(|_| (1..=2).contains(&month_str.len()))
        .ok_or_else(|| {
            SpotistatError::InvalidDate(format!("Invalid month '{month_str}', expected MM"))
        })?;

    if !(1..=12).contains(&month) {
        return Err(SpotistatError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }
    Ok(month)
}

/// Parse a year-month in `YYYY-MM` form
///
/// # Examples
/// ```
/// use spotistat::cli::parse_month_filter;
///
/// assert_eq!(parse_month_filter("2024-03").unwrap(), (2024, 3));
/// assert!(parse_month_filter("2024-13").is_err());
/// ```
pub fn parse_month_filter(month_str: &str) -> Result<(i32, u32)> {
    let month_str = month_str.trim();
    let (year, month) = month_str.split_once('-').ok_or_else(|| {
        SpotistatError::InvalidDate(format!(
            "Invalid month format '{month_str}', expected YYYY-MM"
        ))
    })?;

    Ok((parse_year_filter(year)?, parse_month_number(month)?))
}
