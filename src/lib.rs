//! spotistat - Analyze exported Spotify streaming history
//!
//! This library provides functionality to:
//! - Discover and parse the JSON history files of a Spotify data export
//! - Narrow the history to a full, ranged, yearly or monthly window
//! - Aggregate listening by day, weekday, artist and track
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use spotistat::{
//!     aggregation::Aggregator,
//!     data_loader::{DataLoader, DEFAULT_FILE_PREFIX},
//!     filters::{DateWindow, WindowFilter},
//!     output::get_formatter,
//!     timezone::TimezoneConfig,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> spotistat::Result<()> {
//!     let loader = DataLoader::discover(Path::new("."), DEFAULT_FILE_PREFIX)?;
//!     let events = loader.load_events().await?;
//!
//!     let window = DateWindow::Year(2024);
//!     let selected = WindowFilter::new(window).apply(&events);
//!
//!     let report = Aggregator::new(TimezoneConfig::default()).report(&selected, window.label());
//!     println!("{}", get_formatter(false, false).format_report(&report));
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod data_loader;
pub mod output;
pub mod selector;

pub use spotistat_core::{error, filters, timezone, types};

// Re-export commonly used types
pub use error::{Result, SpotistatError};
pub use filters::DateWindow;
pub use types::{DailyDate, ListenTimestamp, StreamEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
