//! Date windows and window filtering
//!
//! A [`DateWindow`] names the slice of history a report covers. Windows are
//! checked against [`AvailableDates`] before use so that a report is never
//! produced for a period the loaded files do not cover, then applied with a
//! [`WindowFilter`], which returns a new event collection and leaves the
//! source untouched.
//!
//! # Examples
//!
//! ```
//! use spotistat_core::filters::{AvailableDates, DateWindow, WindowFilter};
//! use spotistat_core::types::{ListenTimestamp, StreamEvent};
//! use chrono_tz::Tz;
//!
//! let events = vec![StreamEvent {
//!     timestamp: ListenTimestamp::parse("2023-05-04T10:00:00Z").unwrap(),
//!     artist: Some("Low".to_string()),
//!     track: Some("Lullaby".to_string()),
//!     ms_played: 120_000,
//! }];
//!
//! let available = AvailableDates::from_events(&events, &Tz::UTC);
//! assert!(available.validate(DateWindow::Year(2024)).is_err());
//!
//! let window = available.validate(DateWindow::Year(2023)).unwrap();
//! let filtered = WindowFilter::new(window).with_timezone(Tz::UTC).apply(&events);
//! assert_eq!(filtered.len(), 1);
//! ```

use crate::error::{Result, SpotistatError};
use crate::types::{DailyDate, StreamEvent};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// The period a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    /// Every loaded event
    All,
    /// Inclusive date range
    Range { start: NaiveDate, end: NaiveDate },
    /// One calendar year
    Year(i32),
    /// One calendar month of one year
    Month { year: i32, month: u32 },
}

impl DateWindow {
    /// Check whether a calendar date falls inside the window
    pub fn contains(&self, date: &DailyDate) -> bool {
        match *self {
            Self::All => true,
            Self::Range { start, end } => start <= *date.inner() && *date.inner() <= end,
            Self::Year(year) => date.year() == year,
            Self::Month { year, month } => date.year() == year && date.month() == month,
        }
    }

    /// Human readable label used in report headers
    pub fn label(&self) -> String {
        match *self {
            Self::All => "Full History".to_string(),
            Self::Range { start, end } => format!(
                "{} to {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            Self::Year(year) => year.to_string(),
            Self::Month { year, month } => format!("{year}-{month:02}"),
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Filter that applies a window using a specific timezone for calendar dates
#[derive(Debug, Clone)]
pub struct WindowFilter {
    /// Window to keep
    pub window: DateWindow,
    /// Timezone used to derive each event's date
    pub tz: Tz,
}

impl WindowFilter {
    /// Create a filter for a window, dating events in UTC
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            tz: Tz::UTC,
        }
    }

    /// Set the timezone used to derive calendar dates
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Check if an event passes the filter
    pub fn matches(&self, event: &StreamEvent) -> bool {
        self.window.contains(&event.date(&self.tz))
    }

    /// Return a new collection holding the matching events in source order
    pub fn apply(&self, events: &[StreamEvent]) -> Vec<StreamEvent> {
        if self.window == DateWindow::All {
            return events.to_vec();
        }

        let filtered: Vec<StreamEvent> = events
            .iter()
            .filter(|event| self.matches(event))
            .cloned()
            .collect();
        debug!(
            "Window {} kept {} of {} events",
            self.window,
            filtered.len(),
            events.len()
        );
        filtered
    }
}

/// Distinct calendar dates present in a loaded event set
///
/// Used to validate user-chosen windows: explicit range endpoints must be
/// dates with at least one stream, and years/months must contain at least
/// one stream.
#[derive(Debug, Clone, Default)]
pub struct AvailableDates {
    dates: BTreeSet<DailyDate>,
}

impl AvailableDates {
    /// Collect the distinct dates of `events` in timezone `tz`
    pub fn from_events(events: &[StreamEvent], tz: &Tz) -> Self {
        Self {
            dates: events.iter().map(|event| event.date(tz)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Earliest date with a stream
    pub fn first(&self) -> Option<DailyDate> {
        self.dates.first().copied()
    }

    /// Latest date with a stream
    pub fn last(&self) -> Option<DailyDate> {
        self.dates.last().copied()
    }

    pub fn contains_date(&self, date: &NaiveDate) -> bool {
        self.dates.contains(&DailyDate::new(*date))
    }

    /// Years with at least one stream, ascending
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.dates.iter().map(DailyDate::year).collect();
        years.into_iter().collect()
    }

    /// Months of `year` with at least one stream, ascending
    pub fn months_in(&self, year: i32) -> Vec<u32> {
        let months: BTreeSet<u32> = self
            .dates
            .iter()
            .filter(|date| date.year() == year)
            .map(DailyDate::month)
            .collect();
        months.into_iter().collect()
    }

    /// Check that a year has at least one stream
    pub fn check_year(&self, year: i32) -> Result<()> {
        if self.dates.iter().any(|date| date.year() == year) {
            return Ok(());
        }

        let years = self
            .years()
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(SpotistatError::Validation(format!(
            "no streams in {year} (years with data: {years})"
        )))
    }

    /// Check that a month of a year has at least one stream
    pub fn check_month(&self, year: i32, month: u32) -> Result<()> {
        self.check_year(year)?;
        let months = self.months_in(year);
        if months.contains(&month) {
            return Ok(());
        }

        let months = months
            .iter()
            .map(|m| format!("{m:02}"))
            .collect::<Vec<_>>()
            .join(", ");
        Err(SpotistatError::Validation(format!(
            "no streams in {year}-{month:02} (months with data in {year}: {months})"
        )))
    }

    /// Check a window against the loaded data
    ///
    /// # Errors
    ///
    /// Returns [`SpotistatError::Validation`] when a range endpoint is not a
    /// date with streams, when `start > end`, or when a year/month has no
    /// streams.
    pub fn validate(&self, window: DateWindow) -> Result<DateWindow> {
        match window {
            DateWindow::All => {}
            DateWindow::Range { start, end } => {
                for endpoint in [start, end] {
                    if !self.contains_date(&endpoint) {
                        return Err(SpotistatError::Validation(format!(
                            "no streams on {}{}",
                            endpoint.format("%Y-%m-%d"),
                            self.span_hint()
                        )));
                    }
                }
                if start > end {
                    return Err(SpotistatError::Validation(format!(
                        "start date {} is after end date {}",
                        start.format("%Y-%m-%d"),
                        end.format("%Y-%m-%d")
                    )));
                }
            }
            DateWindow::Year(year) => self.check_year(year)?,
            DateWindow::Month { year, month } => self.check_month(year, month)?,
        }
        Ok(window)
    }

    fn span_hint(&self) -> String {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => format!(" (data covers {first} to {last})"),
            _ => " (no data loaded)".to_string(),
        }
    }
}
