//! Output formatting module for spotistat
//!
//! This module provides formatters for displaying listening reports in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use spotistat::aggregation::Aggregator;
//! use spotistat::output::get_formatter;
//! use spotistat::timezone::TimezoneConfig;
//! use spotistat::types::{ListenTimestamp, StreamEvent};
//!
//! let events = vec![StreamEvent {
//!     timestamp: ListenTimestamp::parse("2024-01-01T10:00:00Z").unwrap(),
//!     artist: Some("Nils Frahm".to_string()),
//!     track: Some("Says".to_string()),
//!     ms_played: 540_000,
//! }];
//! let report = Aggregator::new(TimezoneConfig::default()).report(&events, "Full History");
//!
//! // Get table formatter for human-readable output
//! let formatter = get_formatter(false, false);
//! println!("{}", formatter.format_report(&report));
//!
//! // Get JSON formatter for machine-readable output
//! let json_formatter = get_formatter(true, false);
//! println!("{}", json_formatter.format_report(&report));
//! ```

use crate::aggregation::{
    ArtistDayCoverage, ArtistHistory, ArtistRank, DailyListening, ListeningReport, Totals,
    TrackRank, WeekdayProfile,
};
use colored::Colorize;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
///
/// One method per aggregation view plus [`format_report`](Self::format_report),
/// which renders every view of a [`ListeningReport`] in one document.
pub trait OutputFormatter {
    /// Format daily totals with a totals row
    fn format_daily(&self, data: &[DailyListening], totals: &Totals) -> String;

    /// Format the weekday profile
    fn format_weekdays(&self, data: &[WeekdayProfile]) -> String;

    /// Format the top artists
    fn format_top_artists(&self, data: &[ArtistRank]) -> String;

    /// Format the top tracks
    fn format_top_tracks(&self, data: &[TrackRank]) -> String;

    /// Format the daily history of the top artists
    fn format_artist_history(&self, data: &[ArtistHistory]) -> String;

    /// Format the per-artist day coverage
    fn format_day_coverage(&self, data: &[ArtistDayCoverage]) -> String;

    /// Format a complete report
    fn format_report(&self, report: &ListeningReport) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display. Counts are formatted
/// with thousands separators and durations are shown in hours.
pub struct TableFormatter {
    /// Whether section headings are colored
    pub colored: bool,
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn format_hours(hours: f64) -> String {
        format!("{hours:.2}")
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn heading(&self, text: &str) -> String {
        if self.colored {
            format!("\n{}\n", text.bold().cyan())
        } else {
            format!("\n{text}\n")
        }
    }

    fn format_totals_row(totals: &Totals) -> Row {
        row![
            b -> "TOTAL",
            br -> Self::format_number(totals.streams),
            br -> Self::format_hours(totals.hours_played)
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_daily(&self, data: &[DailyListening], totals: &Totals) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Date", b -> "Streams", b -> "Hours"]);

        for day in data {
            table.add_row(row![
                day.date.format("%Y-%m-%d"),
                r -> Self::format_number(day.streams),
                r -> Self::format_hours(day.hours_played)
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 3]));
        table.add_row(Self::format_totals_row(totals));
        table.to_string()
    }

    fn format_weekdays(&self, data: &[WeekdayProfile]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Weekday",
            b -> "Days",
            b -> "Avg Hours",
            b -> "Avg Streams",
            b -> "Avg Length (min)"
        ]);

        for profile in data {
            let avg_length = profile
                .stream_length_avg_min
                .map_or_else(|| "-".to_string(), |minutes| format!("{minutes:.2}"));
            table.add_row(row![
                profile.weekday,
                r -> profile.day_count,
                r -> Self::format_hours(profile.hours_played_avg),
                r -> format!("{:.1}", profile.streams_avg),
                r -> avg_length
            ]);
        }

        table.to_string()
    }

    fn format_top_artists(&self, data: &[ArtistRank]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> "Artist", b -> "Streams", b -> "Hours"]);

        for (rank, artist) in data.iter().enumerate() {
            table.add_row(row![
                r -> rank + 1,
                artist.artist,
                r -> Self::format_number(artist.streams),
                r -> Self::format_hours(artist.hours_played)
            ]);
        }

        table.to_string()
    }

    fn format_top_tracks(&self, data: &[TrackRank]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> "Track", b -> "Streams", b -> "Hours"]);

        for (rank, track) in data.iter().enumerate() {
            table.add_row(row![
                r -> rank + 1,
                track.label(),
                r -> Self::format_number(track.streams),
                r -> Self::format_hours(track.hours_played)
            ]);
        }

        table.to_string()
    }

    fn format_artist_history(&self, data: &[ArtistHistory]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Artist",
            b -> "Active Days",
            b -> "Streams",
            b -> "First",
            b -> "Last",
            b -> "Peak Day"
        ]);

        for history in data {
            let streams: u64 = history.points.iter().map(|p| p.streams).sum();
            let first = history
                .points
                .first()
                .map_or_else(|| "-".to_string(), |p| p.date.to_string());
            let last = history
                .points
                .last()
                .map_or_else(|| "-".to_string(), |p| p.date.to_string());
            // earliest day wins a tie for the peak
            let peak = history
                .points
                .iter()
                .rev()
                .max_by_key(|p| p.streams)
                .map_or_else(|| "-".to_string(), |p| format!("{} ({})", p.date, p.streams));

            table.add_row(row![
                history.artist,
                r -> history.points.len(),
                r -> Self::format_number(streams),
                first,
                last,
                peak
            ]);
        }

        table.to_string()
    }

    fn format_day_coverage(&self, data: &[ArtistDayCoverage]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> "Artist", b -> "Days Played"]);

        for (rank, coverage) in data.iter().enumerate() {
            table.add_row(row![
                r -> rank + 1,
                coverage.artist,
                r -> Self::format_number(coverage.days)
            ]);
        }

        table.to_string()
    }

    fn format_report(&self, report: &ListeningReport) -> String {
        let mut output = String::new();
        let totals = &report.totals;

        let title = format!("Listening report: {} ({})", report.label, report.timezone);
        output.push_str(&self.heading(&title));

        if totals.streams == 0 {
            output.push_str("No streams in this period.\n");
            return output;
        }

        if let (Some(first), Some(last)) = (totals.first_date, totals.last_date) {
            output.push_str(&format!(
                "{} streams, {} hours over {} active days ({} to {})\n",
                Self::format_number(totals.streams),
                Self::format_hours(totals.hours_played),
                totals.active_days,
                first,
                last
            ));
        }

        output.push_str(&self.heading("Daily listening"));
        output.push_str(&self.format_daily(&report.daily, totals));
        output.push_str(&self.heading("Average listening by weekday"));
        output.push_str(&self.format_weekdays(&report.weekdays));
        output.push_str(&self.heading("Top artists"));
        output.push_str(&self.format_top_artists(&report.top_artists));
        output.push_str(&self.heading("Top tracks"));
        output.push_str(&self.format_top_tracks(&report.top_tracks));
        output.push_str(&self.heading("Top artist history"));
        output.push_str(&self.format_artist_history(&report.artist_history));
        output.push_str(&self.heading("Artists by days played"));
        output.push_str(&self.format_day_coverage(&report.day_coverage));
        output
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_daily(&self, data: &[DailyListening], totals: &Totals) -> String {
        let output = json!({
            "daily": data,
            "totals": totals,
        });
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_weekdays(&self, data: &[WeekdayProfile]) -> String {
        serde_json::to_string_pretty(&json!({ "weekdays": data })).unwrap_or_default()
    }

    fn format_top_artists(&self, data: &[ArtistRank]) -> String {
        serde_json::to_string_pretty(&json!({ "top_artists": data })).unwrap_or_default()
    }

    fn format_top_tracks(&self, data: &[TrackRank]) -> String {
        let output = json!({
            "top_tracks": data.iter().map(|t| json!({
                "label": t.label(),
                "artist": t.artist,
                "track": t.track,
                "streams": t.streams,
                "ms_played": t.ms_played,
                "hours_played": t.hours_played,
            })).collect::<Vec<_>>()
        });
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_artist_history(&self, data: &[ArtistHistory]) -> String {
        serde_json::to_string_pretty(&json!({ "artist_history": data })).unwrap_or_default()
    }

    fn format_day_coverage(&self, data: &[ArtistDayCoverage]) -> String {
        serde_json::to_string_pretty(&json!({ "day_coverage": data })).unwrap_or_default()
    }

    fn format_report(&self, report: &ListeningReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_default()
    }
}

/// Get appropriate formatter based on JSON flag
///
/// # Arguments
///
/// * `json` - If true, returns a JSON formatter; otherwise returns a table formatter
/// * `colored` - Whether table headings use terminal colors (ignored for JSON)
///
/// # Examples
///
/// ```
/// use spotistat::aggregation::Totals;
/// use spotistat::output::get_formatter;
///
/// let formatter = get_formatter(true, false);
/// let output = formatter.format_daily(&[], &Totals::default());
/// assert!(output.contains("\"daily\""));
/// ```
pub fn get_formatter(json: bool, colored: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(colored))
    }
}
