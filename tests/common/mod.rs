//! Common test utilities and helpers for spotistat tests
//!
//! This module provides a builder for stream events, JSON renderers for both
//! Spotify export formats and helpers that lay out export files on disk.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use spotistat::types::{ListenTimestamp, StreamEvent};
use std::path::PathBuf;
use tempfile::TempDir;

/// Artists used by generated data
pub const TEST_ARTISTS: &[&str] = &["Radiohead", "Björk", "Aphex Twin", "Massive Attack"];

/// Tracks used by generated data
pub const TEST_TRACKS: &[&str] = &["Reckoner", "Hyperballad", "Xtal", "Teardrop"];

/// Builder for creating test StreamEvent instances
#[derive(Clone)]
pub struct StreamEventBuilder {
    timestamp: DateTime<Utc>,
    artist: Option<String>,
    track: Option<String>,
    ms_played: u64,
}

#[allow(dead_code)]
impl StreamEventBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            artist: Some(TEST_ARTISTS[0].to_string()),
            track: Some(TEST_TRACKS[0].to_string()),
            ms_played: 180_000,
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn with_date(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.timestamp = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
        self
    }

    pub fn with_artist(mut self, artist: &str) -> Self {
        self.artist = Some(artist.to_string());
        self
    }

    pub fn with_track(mut self, track: &str) -> Self {
        self.track = Some(track.to_string());
        self
    }

    /// Drop artist and track, as podcast episodes do
    pub fn podcast(mut self) -> Self {
        self.artist = None;
        self.track = None;
        self
    }

    pub fn with_ms(mut self, ms_played: u64) -> Self {
        self.ms_played = ms_played;
        self
    }

    /// Build the StreamEvent
    pub fn build(self) -> StreamEvent {
        StreamEvent {
            timestamp: ListenTimestamp::new(self.timestamp),
            artist: self.artist,
            track: self.track,
            ms_played: self.ms_played,
        }
    }

    /// Render as an extended streaming history record
    #[allow(clippy::wrong_self_convention)]
    pub fn to_extended_json(self) -> serde_json::Value {
        serde_json::json!({
            "ts": self.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "platform": "linux",
            "ms_played": self.ms_played,
            "conn_country": "SE",
            "master_metadata_track_name": self.track,
            "master_metadata_album_artist_name": self.artist,
            "master_metadata_album_album_name": null,
            "spotify_track_uri": null,
            "shuffle": false,
            "skipped": null,
        })
    }

    /// Render as an account-data export record
    #[allow(clippy::wrong_self_convention)]
    pub fn to_legacy_json(self) -> serde_json::Value {
        serde_json::json!({
            "endTime": self.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            "artistName": self.artist,
            "trackName": self.track,
            "msPlayed": self.ms_played,
        })
    }
}

impl Default for StreamEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a JSON array of records to `dir/name` and return the path
#[allow(dead_code)]
pub fn write_history_file(
    dir: &std::path::Path,
    name: &str,
    records: Vec<serde_json::Value>,
) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let contents = serde_json::to_string_pretty(&serde_json::Value::Array(records)).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Create a temp directory laid out like an extended history export
#[allow(dead_code)]
pub fn create_export_dir(files: Vec<(&str, Vec<serde_json::Value>)>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let history_dir = temp_dir.path().join("Spotify Extended Streaming History");
    for (name, records) in files {
        write_history_file(&history_dir, name, records);
    }
    temp_dir
}

/// Generate `streams_per_day` events for every day in a date range
#[allow(dead_code)]
pub fn generate_date_range_events(
    start_date: NaiveDate,
    end_date: NaiveDate,
    streams_per_day: usize,
) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let mut current_date = start_date;

    while current_date <= end_date {
        for stream in 0..streams_per_day {
            let hour = (8 + stream * 3) % 24;
            let index = (stream + current_date.day() as usize) % TEST_ARTISTS.len();
            events.push(
                StreamEventBuilder::new()
                    .with_date(
                        current_date.year(),
                        current_date.month(),
                        current_date.day(),
                        hour as u32,
                    )
                    .with_artist(TEST_ARTISTS[index])
                    .with_track(TEST_TRACKS[index])
                    .with_ms(60_000 + stream as u64 * 15_000)
                    .build(),
            );
        }
        current_date = current_date.succ_opt().unwrap();
    }

    events
}
