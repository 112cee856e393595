//! Core domain types for spotistat
//!
//! This module contains the canonical [`StreamEvent`] record, the raw export
//! shape it is normalized from, and small strongly-typed wrappers for
//! timestamps and calendar dates.
//!
//! Spotify has shipped two export formats. The account-data export writes
//! `endTime`/`artistName`/`trackName`/`msPlayed`; the extended streaming
//! history writes `ts`/`master_metadata_album_artist_name`/
//! `master_metadata_track_name`/`ms_played`. [`RawStreamRecord`] accepts both.

use crate::error::{Result, SpotistatError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Milliseconds in one hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Milliseconds in one minute
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Convert a millisecond duration to hours
pub fn ms_to_hours(ms: u64) -> f64 {
    ms as f64 / MS_PER_HOUR
}

/// Timestamp of a playback event, always stored in UTC
///
/// # Examples
/// ```
/// use spotistat_core::types::ListenTimestamp;
///
/// let ts = ListenTimestamp::parse("2024-01-15T10:30:00Z").unwrap();
/// assert_eq!(ts.to_daily_date().format("%Y-%m-%d"), "2024-01-15");
///
/// // Legacy exports use minute precision without a zone marker
/// let legacy = ListenTimestamp::parse("2024-01-15 23:59").unwrap();
/// assert_eq!(legacy.to_daily_date().format("%Y-%m-%d"), "2024-01-15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenTimestamp(DateTime<Utc>);

impl ListenTimestamp {
    /// Create a new ListenTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse either export format
    ///
    /// Accepts RFC 3339 (`2024-01-15T10:30:00Z`) and the legacy
    /// `YYYY-MM-DD HH:MM[:SS]` form, which Spotify writes in UTC.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }

        ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|naive| Self(naive.and_utc()))
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Convert to DailyDate in UTC
    pub fn to_daily_date(&self) -> DailyDate {
        DailyDate::new(self.0.date_naive())
    }

    /// Convert to DailyDate using specified timezone
    pub fn to_daily_date_with_tz(&self, tz: &Tz) -> DailyDate {
        DailyDate::new(self.0.with_timezone(tz).date_naive())
    }
}

/// Calendar date used as the grouping key of every aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// The following calendar day, `None` at the end of chrono's range
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One record as it appears in an export file
///
/// Every field is optional here; [`StreamEvent::from_raw`] decides which
/// absences are fatal. Unknown fields (platform, conn_country, ...) are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStreamRecord {
    /// Playback end instant (`ts` in extended exports, `endTime` in legacy ones)
    #[serde(alias = "endTime", default)]
    pub ts: Option<String>,
    /// Milliseconds played
    #[serde(alias = "msPlayed", default)]
    pub ms_played: Option<u64>,
    /// Album artist name
    #[serde(alias = "artistName", default)]
    pub master_metadata_album_artist_name: Option<String>,
    /// Track name
    #[serde(alias = "trackName", default)]
    pub master_metadata_track_name: Option<String>,
}

/// One normalized playback record
///
/// # Examples
/// ```
/// use spotistat_core::types::{ListenTimestamp, StreamEvent};
///
/// let event = StreamEvent {
///     timestamp: ListenTimestamp::parse("2024-03-01T08:00:00Z").unwrap(),
///     artist: Some("Radiohead".to_string()),
///     track: Some("Reckoner".to_string()),
///     ms_played: 290_000,
/// };
/// assert!(event.hours_played() > 0.08);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// When the playback ended
    pub timestamp: ListenTimestamp,
    /// Album artist, absent for podcasts and unknown entries
    pub artist: Option<String>,
    /// Track title, absent for podcasts and unknown entries
    pub track: Option<String>,
    /// Milliseconds played
    pub ms_played: u64,
}

impl StreamEvent {
    /// Normalize a raw record
    ///
    /// `file` and `record` only feed error context.
    ///
    /// # Errors
    ///
    /// - [`SpotistatError::Schema`] when neither timestamp nor duration field
    ///   variant is present
    /// - [`SpotistatError::Parse`] when the timestamp text cannot be parsed
    pub fn from_raw(raw: RawStreamRecord, file: &Path, record: usize) -> Result<Self> {
        let ts = raw.ts.ok_or_else(|| SpotistatError::Schema {
            file: file.to_path_buf(),
            record,
            error: "missing timestamp field (expected `ts` or `endTime`)".to_string(),
        })?;

        let ms_played = raw.ms_played.ok_or_else(|| SpotistatError::Schema {
            file: file.to_path_buf(),
            record,
            error: "missing duration field (expected `ms_played` or `msPlayed`)".to_string(),
        })?;

        let timestamp = ListenTimestamp::parse(&ts).ok_or_else(|| SpotistatError::Parse {
            file: file.to_path_buf(),
            error: format!("record {record}: unparseable timestamp '{ts}'"),
        })?;

        Ok(Self {
            timestamp,
            artist: raw.master_metadata_album_artist_name,
            track: raw.master_metadata_track_name,
            ms_played,
        })
    }

    /// Calendar date of the event in the given timezone
    pub fn date(&self, tz: &Tz) -> DailyDate {
        self.timestamp.to_daily_date_with_tz(tz)
    }

    pub fn hours_played(&self) -> f64 {
        ms_to_hours(self.ms_played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn raw_from(json: &str) -> RawStreamRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = ListenTimestamp::parse("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(
            *rfc.inner(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );

        let legacy = ListenTimestamp::parse("2024-01-15 10:30").unwrap();
        assert_eq!(rfc, legacy);

        let with_seconds = ListenTimestamp::parse("2024-01-15 10:30:00").unwrap();
        assert_eq!(rfc, with_seconds);

        assert!(ListenTimestamp::parse("15/01/2024").is_none());
        assert!(ListenTimestamp::parse("").is_none());
    }

    #[test]
    fn test_daily_date_with_timezone() {
        let ts = ListenTimestamp::parse("2024-01-15T02:00:00Z").unwrap();
        assert_eq!(ts.to_daily_date().to_string(), "2024-01-15");

        let new_york: Tz = "America/New_York".parse().unwrap();
        assert_eq!(ts.to_daily_date_with_tz(&new_york).to_string(), "2024-01-14");
    }

    #[test]
    fn test_extended_export_record() {
        let raw = raw_from(
            r#"{"ts":"2024-02-01T12:00:00Z","platform":"android","ms_played":215000,
                "master_metadata_track_name":"Paranoid Android",
                "master_metadata_album_artist_name":"Radiohead",
                "master_metadata_album_album_name":"OK Computer"}"#,
        );
        let event = StreamEvent::from_raw(raw, Path::new("a.json"), 0).unwrap();
        assert_eq!(event.artist.as_deref(), Some("Radiohead"));
        assert_eq!(event.track.as_deref(), Some("Paranoid Android"));
        assert_eq!(event.ms_played, 215_000);
    }

    #[test]
    fn test_legacy_export_record() {
        let raw = raw_from(
            r#"{"endTime":"2021-06-01 21:14","artistName":"Bonobo","trackName":"Kerala","msPlayed":240000}"#,
        );
        let event = StreamEvent::from_raw(raw, Path::new("StreamingHistory0.json"), 0).unwrap();
        assert_eq!(event.artist.as_deref(), Some("Bonobo"));
        assert_eq!(event.timestamp.to_daily_date().to_string(), "2021-06-01");
    }

    #[test]
    fn test_podcast_record_keeps_missing_metadata() {
        let raw = raw_from(
            r#"{"ts":"2024-02-01T12:00:00Z","ms_played":1000,
                "master_metadata_track_name":null,
                "master_metadata_album_artist_name":null,
                "episode_name":"Episode 1"}"#,
        );
        let event = StreamEvent::from_raw(raw, Path::new("a.json"), 0).unwrap();
        assert!(event.artist.is_none());
        assert!(event.track.is_none());
    }

    #[test]
    fn test_missing_fields_are_schema_errors() {
        let raw = raw_from(r#"{"ms_played":1000}"#);
        let err = StreamEvent::from_raw(raw, Path::new("a.json"), 4).unwrap_err();
        assert!(matches!(err, SpotistatError::Schema { record: 4, .. }));

        let raw = raw_from(r#"{"ts":"2024-02-01T12:00:00Z"}"#);
        let err = StreamEvent::from_raw(raw, Path::new("a.json"), 0).unwrap_err();
        assert!(matches!(err, SpotistatError::Schema { .. }));
    }

    #[test]
    fn test_bad_timestamp_is_parse_error() {
        let raw = raw_from(r#"{"ts":"yesterday","ms_played":1000}"#);
        let err = StreamEvent::from_raw(raw, Path::new("a.json"), 0).unwrap_err();
        match err {
            SpotistatError::Parse { file, error } => {
                assert_eq!(file, PathBuf::from("a.json"));
                assert!(error.contains("yesterday"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result = serde_json::from_str::<RawStreamRecord>(
            r#"{"ts":"2024-02-01T12:00:00Z","ms_played":-5}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_hours_conversion() {
        assert_eq!(ms_to_hours(3_600_000), 1.0);
        assert!((ms_to_hours(180_000) - 0.05).abs() < 1e-12);
    }
}
