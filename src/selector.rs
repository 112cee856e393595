//! Interactive date-range selection
//!
//! [`DateRangeSelector`] drives the console menu that picks the window for
//! the next report:
//!
//! ```text
//! 1) Full history
//! 2) Date range
//! 3) Year
//! 4) Year and month
//! 5) Exit
//! ```
//!
//! The menu is a small state machine over [`State`]. Bad input never ends
//! the session: unparseable text and windows outside the loaded data print a
//! message and return to the menu. End of input is treated as exit.
//!
//! The selector reads from any [`BufRead`] and writes to any [`Write`], so
//! tests drive it with in-memory buffers.
//!
//! # Examples
//!
//! ```
//! use spotistat::selector::{DateRangeSelector, Selection};
//! use spotistat::types::{ListenTimestamp, StreamEvent};
//! use std::io::Cursor;
//!
//! let events = vec![StreamEvent {
//!     timestamp: ListenTimestamp::parse("2023-05-04T10:00:00Z").unwrap(),
//!     artist: Some("Low".to_string()),
//!     track: Some("Lullaby".to_string()),
//!     ms_played: 120_000,
//! }];
//!
//! let mut selector = DateRangeSelector::new(Cursor::new("3\n2023\n"), Vec::new());
//! match selector.run(&events).unwrap() {
//!     Selection::Window { label, events, .. } => {
//!         assert_eq!(label, "2023");
//!         assert_eq!(events.len(), 1);
//!     }
//!     Selection::Exit => unreachable!(),
//! }
//! ```

use crate::cli::{parse_date_filter, parse_month_number, parse_year_filter};
use crate::error::Result;
use crate::filters::{AvailableDates, DateWindow, WindowFilter};
use crate::types::StreamEvent;
use chrono_tz::Tz;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Outcome of one pass through the menu
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The user chose to stop
    Exit,
    /// A validated window and the events inside it
    Window {
        window: DateWindow,
        events: Vec<StreamEvent>,
        label: String,
    },
}

/// Menu states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Menu,
    Range,
    Year,
    Month,
    Exit,
}

/// Result of handling one state
enum Step {
    Next(State),
    Done(Selection),
}

/// Answer to a single prompt
enum Reply<T> {
    Value(T),
    Rejected,
    Closed,
}

impl<T> Reply<T> {
    /// The parsed value, or the step to take when there is none
    fn or_step(self) -> std::result::Result<T, Step> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Rejected => Err(Step::Next(State::Menu)),
            Self::Closed => Err(Step::Next(State::Exit)),
        }
    }
}

const MENU: &str = "\
1) Full history
2) Date range
3) Year
4) Year and month
5) Exit";

/// Console menu for choosing a report window
pub struct DateRangeSelector<R, W> {
    input: R,
    output: W,
    tz: Tz,
}

impl<R: BufRead, W: Write> DateRangeSelector<R, W> {
    /// Create a selector that dates events in UTC
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            tz: Tz::UTC,
        }
    }

    /// Set the timezone used to derive calendar dates
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Consume the selector and return its output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu until a window is accepted or the user exits
    ///
    /// `events` is never modified; an accepted window comes back with a new,
    /// filtered collection.
    ///
    /// # Errors
    ///
    /// Only console IO failures are returned. Invalid dates and windows
    /// outside the data are reported to the user and the menu is shown again.
    pub fn run(&mut self, events: &[StreamEvent]) -> Result<Selection> {
        let available = AvailableDates::from_events(events, &self.tz);
        let mut state = State::Menu;

        loop {
            let step = match state {
                State::Menu => self.menu(&available, events)?,
                State::Range => self.range(&available, events)?,
                State::Year => self.year(&available, events)?,
                State::Month => self.month(&available, events)?,
                State::Exit => return Ok(Selection::Exit),
            };

            match step {
                Step::Next(next) => state = next,
                Step::Done(selection) => return Ok(selection),
            }
        }
    }

    fn menu(&mut self, available: &AvailableDates, events: &[StreamEvent]) -> Result<Step> {
        if let (Some(first), Some(last)) = (available.first(), available.last()) {
            writeln!(self.output, "\nHistory covers {first} to {last}")?;
        }
        writeln!(self.output, "{MENU}")?;

        let Some(choice) = self.read_line("Choose an option [1-5]: ")? else {
            return Ok(Step::Next(State::Exit));
        };

        let next = match choice.as_str() {
            "1" => return self.accept(available, DateWindow::All, events),
            "2" => State::Range,
            "3" => State::Year,
            "4" => State::Month,
            "5" => State::Exit,
            other => {
                debug!("Unrecognised menu choice '{}'", other);
                writeln!(self.output, "Invalid choice '{other}', enter a number from 1 to 5")?;
                State::Menu
            }
        };
        Ok(Step::Next(next))
    }

    fn range(&mut self, available: &AvailableDates, events: &[StreamEvent]) -> Result<Step> {
        let start = match self.ask("Start date (YYYY-MM-DD): ", parse_date_filter)?.or_step() {
            Ok(start) => start,
            Err(step) => return Ok(step),
        };
        let end = match self.ask("End date (YYYY-MM-DD): ", parse_date_filter)?.or_step() {
            Ok(end) => end,
            Err(step) => return Ok(step),
        };

        self.accept(available, DateWindow::Range { start, end }, events)
    }

    fn year(&mut self, available: &AvailableDates, events: &[StreamEvent]) -> Result<Step> {
        let year = match self.ask("Year (YYYY): ", parse_year_filter)?.or_step() {
            Ok(year) => year,
            Err(step) => return Ok(step),
        };

        self.accept(available, DateWindow::Year(year), events)
    }

    fn month(&mut self, available: &AvailableDates, events: &[StreamEvent]) -> Result<Step> {
        let year = match self.ask("Year (YYYY): ", parse_year_filter)?.or_step() {
            Ok(year) => year,
            Err(step) => return Ok(step),
        };
        if let Err(e) = available.check_year(year) {
            debug!("Rejected year {}: {}", year, e);
            writeln!(self.output, "{e}")?;
            return Ok(Step::Next(State::Menu));
        }

        let month = match self.ask("Month (MM): ", parse_month_number)?.or_step() {
            Ok(month) => month,
            Err(step) => return Ok(step),
        };

        self.accept(available, DateWindow::Month { year, month }, events)
    }

    /// Validate a window and, when it holds, filter the events into it
    fn accept(
        &mut self,
        available: &AvailableDates,
        window: DateWindow,
        events: &[StreamEvent],
    ) -> Result<Step> {
        match available.validate(window) {
            Ok(window) => Ok(self.select(window, events)),
            Err(e) if e.is_recoverable() => {
                debug!("Rejected window {}: {}", window, e);
                writeln!(self.output, "{e}")?;
                Ok(Step::Next(State::Menu))
            }
            Err(e) => Err(e),
        }
    }

    fn select(&self, window: DateWindow, events: &[StreamEvent]) -> Step {
        let events = WindowFilter::new(window)
            .with_timezone(self.tz)
            .apply(events);
        info!("Selected {} ({} streams)", window, events.len());

        Step::Done(Selection::Window {
            window,
            label: window.label(),
            events,
        })
    }

    /// Prompt for a value; parse failures are reported and rejected
    fn ask<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Result<T>) -> Result<Reply<T>> {
        let Some(line) = self.read_line(prompt)? else {
            return Ok(Reply::Closed);
        };

        match parse(&line) {
            Ok(value) => Ok(Reply::Value(value)),
            Err(e) if e.is_recoverable() => {
                debug!("Rejected input '{}': {}", line, e);
                writeln!(self.output, "{e}")?;
                Ok(Reply::Rejected)
            }
            Err(e) => Err(e),
        }
    }

    /// Print a prompt and read one trimmed line, `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
