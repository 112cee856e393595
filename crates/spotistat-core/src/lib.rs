//! Core types, errors, and date windows for spotistat
//!
//! This crate provides the canonical stream record, the error type, the
//! date-window filters and timezone configuration shared by the loader,
//! selector and aggregation engine.

pub mod error;
pub mod filters;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SpotistatError};
pub use filters::{AvailableDates, DateWindow, WindowFilter};
pub use types::{DailyDate, ListenTimestamp, StreamEvent};
