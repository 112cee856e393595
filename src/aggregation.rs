//! Aggregation module for summarizing listening history
//!
//! This module turns a filtered slice of [`StreamEvent`]s into the summary
//! views printed by the CLI: daily totals, a weekday profile, top artists,
//! top tracks, the day-by-day history of the top artists and how many
//! distinct days each artist was played on.
//!
//! Every view collapses timestamps to calendar dates in the configured
//! timezone before grouping. Views are recomputed from scratch for each
//! selection and never mutate their input.
//!
//! # Ordering
//!
//! Groups are collected in `BTreeMap`s, so ties in the ranked views keep
//! name order: the sort by stream count is stable and runs over groups
//! already sorted by artist (and track) name.
//!
//! # Examples
//!
//! ```no_run
//! use spotistat::{aggregation::Aggregator, data_loader::DataLoader, timezone::TimezoneConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> spotistat::Result<()> {
//! let loader = DataLoader::from_files(vec![PathBuf::from("Streaming_History_Audio_2024.json")]);
//! let events = loader.load_events().await?;
//!
//! let aggregator = Aggregator::new(TimezoneConfig::default()).with_top(5);
//! for artist in aggregator.top_artists(&events) {
//!     println!("{}: {} streams", artist.artist, artist.streams);
//! }
//! # Ok(())
//! # }
//! ```

use crate::timezone::TimezoneConfig;
use crate::types::{DailyDate, MS_PER_MINUTE, StreamEvent, ms_to_hours};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Default number of rows in the ranked views
pub const DEFAULT_TOP_N: usize = 10;

/// Default number of artists in the history view
pub const DEFAULT_HISTORY_TOP: usize = 5;

/// Listening summed over one calendar day
///
/// # Examples
/// ```
/// use spotistat::aggregation::DailyListening;
/// use spotistat::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyListening {
///     date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
///     streams: 12,
///     ms_played: 2_700_000,
///     hours_played: 0.75,
/// };
/// assert_eq!(daily.date.to_string(), "2024-01-15");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyListening {
    /// Calendar date
    pub date: DailyDate,
    /// Number of streams that day
    pub streams: u64,
    /// Milliseconds played that day
    pub ms_played: u64,
    /// Hours played that day
    pub hours_played: f64,
}

/// Average listening for one day of the week
///
/// Averages are taken over every calendar day with that weekday in the
/// selected span, including days without any streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayProfile {
    /// Full weekday name, e.g. `Monday`
    pub weekday: String,
    /// Calendar days with this weekday in the span
    pub day_count: u64,
    /// Streams on those days
    pub total_streams: u64,
    /// Milliseconds played on those days
    pub total_ms: u64,
    /// Mean hours played per day
    pub hours_played_avg: f64,
    /// Mean streams per day
    pub streams_avg: f64,
    /// Mean stream length in minutes, `None` without any streams
    pub stream_length_avg_min: Option<f64>,
}

/// One artist's rank by stream count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRank {
    pub artist: String,
    pub streams: u64,
    pub ms_played: u64,
    pub hours_played: f64,
}

/// One track's rank by stream count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRank {
    pub artist: String,
    pub track: String,
    pub streams: u64,
    pub ms_played: u64,
    pub hours_played: f64,
}

impl TrackRank {
    /// Display label, `"{artist} - {track}"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.track)
    }
}

/// Streams of one artist on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: DailyDate,
    pub streams: u64,
}

/// Daily stream counts for one artist, in chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistHistory {
    pub artist: String,
    pub points: Vec<HistoryPoint>,
}

/// Number of distinct days an artist was played on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDayCoverage {
    pub artist: String,
    pub days: u64,
}

/// Totals over a filtered selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub streams: u64,
    pub ms_played: u64,
    pub hours_played: f64,
    /// Days with at least one stream
    pub active_days: usize,
    pub first_date: Option<DailyDate>,
    pub last_date: Option<DailyDate>,
}

impl Totals {
    /// Compute totals from ascending daily totals
    pub fn from_daily(daily: &[DailyListening]) -> Self {
        let mut totals = Self::default();
        for day in daily {
            totals.streams += day.streams;
            totals.ms_played += day.ms_played;
        }
        totals.hours_played = ms_to_hours(totals.ms_played);
        totals.active_days = daily.len();
        totals.first_date = daily.first().map(|day| day.date);
        totals.last_date = daily.last().map(|day| day.date);
        totals
    }
}

/// Every view for one selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListeningReport {
    /// Human label of the selected window
    pub label: String,
    /// Timezone used for calendar dates
    pub timezone: String,
    pub totals: Totals,
    pub daily: Vec<DailyListening>,
    pub weekdays: Vec<WeekdayProfile>,
    pub top_artists: Vec<ArtistRank>,
    pub top_tracks: Vec<TrackRank>,
    pub artist_history: Vec<ArtistHistory>,
    pub day_coverage: Vec<ArtistDayCoverage>,
}

/// Accumulator for stream count and play time
#[derive(Debug, Default, Clone, Copy)]
struct PlayAccumulator {
    streams: u64,
    ms: u64,
}

impl PlayAccumulator {
    fn add(&mut self, ms_played: u64) {
        self.streams += 1;
        self.ms += ms_played;
    }
}

/// Accumulator for one weekday of the calendar span
#[derive(Debug, Default, Clone, Copy)]
struct WeekdayAccumulator {
    days: u64,
    plays: PlayAccumulator,
}

impl WeekdayAccumulator {
    fn into_profile(self, weekday: Weekday) -> WeekdayProfile {
        let (hours_played_avg, streams_avg) = if self.days == 0 {
            (0.0, 0.0)
        } else {
            (
                ms_to_hours(self.plays.ms) / self.days as f64,
                self.plays.streams as f64 / self.days as f64,
            )
        };
        let stream_length_avg_min = (self.plays.streams > 0)
            .then(|| self.plays.ms as f64 / self.plays.streams as f64 / MS_PER_MINUTE);

        WeekdayProfile {
            weekday: weekday_name(weekday).to_string(),
            day_count: self.days,
            total_streams: self.plays.streams,
            total_ms: self.plays.ms,
            hours_played_avg,
            streams_avg,
            stream_length_avg_min,
        }
    }
}

/// Full English name of a weekday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Main aggregation engine
pub struct Aggregator {
    timezone_config: TimezoneConfig,
    top_n: usize,
    history_top: usize,
}

impl Aggregator {
    /// Create a new Aggregator with default row limits
    pub fn new(timezone_config: TimezoneConfig) -> Self {
        Self {
            timezone_config,
            top_n: DEFAULT_TOP_N,
            history_top: DEFAULT_HISTORY_TOP,
        }
    }

    /// Set the row limit of the ranked views
    pub fn with_top(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the number of artists in the history view
    pub fn with_history_top(mut self, history_top: usize) -> Self {
        self.history_top = history_top;
        self
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.timezone_config
    }

    fn date_of(&self, event: &StreamEvent) -> DailyDate {
        event.date(&self.timezone_config.tz)
    }

    fn plays_by_date(&self, events: &[StreamEvent]) -> BTreeMap<DailyDate, PlayAccumulator> {
        let mut by_date: BTreeMap<DailyDate, PlayAccumulator> = BTreeMap::new();
        for event in events {
            by_date
                .entry(self.date_of(event))
                .or_default()
                .add(event.ms_played);
        }
        by_date
    }

    /// Stream count and play time per date with streams, ascending
    pub fn daily_totals(&self, events: &[StreamEvent]) -> Vec<DailyListening> {
        self.plays_by_date(events)
            .into_iter()
            .map(|(date, plays)| DailyListening {
                date,
                streams: plays.streams,
                ms_played: plays.ms,
                hours_played: ms_to_hours(plays.ms),
            })
            .collect()
    }

    /// Average listening per weekday, Monday first
    ///
    /// The daily series is first extended to every date between the first
    /// and last stream, so quiet days pull the averages down.
    pub fn weekday_profile(&self, events: &[StreamEvent]) -> Vec<WeekdayProfile> {
        let by_date = self.plays_by_date(events);
        let (Some(first), Some(last)) = (
            by_date.keys().next().copied(),
            by_date.keys().next_back().copied(),
        ) else {
            return Vec::new();
        };

        let mut weekdays = [WeekdayAccumulator::default(); 7];
        let mut cursor = Some(first);
        while let Some(date) = cursor
            && date <= last
        {
            let slot = &mut weekdays[date.weekday().num_days_from_monday() as usize];
            slot.days += 1;
            if let Some(plays) = by_date.get(&date) {
                slot.plays.streams += plays.streams;
                slot.plays.ms += plays.ms;
            }
            cursor = date.succ();
        }

        WEEK.iter()
            .zip(weekdays)
            .map(|(weekday, acc)| acc.into_profile(*weekday))
            .collect()
    }

    /// Rank artists by stream count and keep the first `limit`
    ///
    /// Streams without an artist are skipped.
    pub fn rank_artists(events: &[StreamEvent], limit: usize) -> Vec<ArtistRank> {
        let mut by_artist: BTreeMap<&str, PlayAccumulator> = BTreeMap::new();
        for event in events {
            if let Some(artist) = event.artist.as_deref() {
                by_artist.entry(artist).or_default().add(event.ms_played);
            }
        }

        let mut ranked: Vec<ArtistRank> = by_artist
            .into_iter()
            .map(|(artist, plays)| ArtistRank {
                artist: artist.to_string(),
                streams: plays.streams,
                ms_played: plays.ms,
                hours_played: ms_to_hours(plays.ms),
            })
            .collect();
        ranked.sort_by(|a, b| b.streams.cmp(&a.streams));
        ranked.truncate(limit);
        ranked
    }

    /// Most streamed artists
    pub fn top_artists(&self, events: &[StreamEvent]) -> Vec<ArtistRank> {
        Self::rank_artists(events, self.top_n)
    }

    /// Most streamed tracks, grouped by artist and title
    ///
    /// Streams missing either artist or track are skipped, so the same title
    /// by two artists counts as two tracks.
    pub fn top_tracks(&self, events: &[StreamEvent]) -> Vec<TrackRank> {
        let mut by_track: BTreeMap<(&str, &str), PlayAccumulator> = BTreeMap::new();
        for event in events {
            if let (Some(artist), Some(track)) = (event.artist.as_deref(), event.track.as_deref())
            {
                by_track
                    .entry((artist, track))
                    .or_default()
                    .add(event.ms_played);
            }
        }

        let mut ranked: Vec<TrackRank> = by_track
            .into_iter()
            .map(|((artist, track), plays)| TrackRank {
                artist: artist.to_string(),
                track: track.to_string(),
                streams: plays.streams,
                ms_played: plays.ms,
                hours_played: ms_to_hours(plays.ms),
            })
            .collect();
        ranked.sort_by(|a, b| b.streams.cmp(&a.streams));
        ranked.truncate(self.top_n);
        ranked
    }

    /// Daily stream counts for each of the given artists
    ///
    /// Series come back in the order of `artists`; an artist without streams
    /// in `events` gets an empty series.
    pub fn top_artist_history(
        &self,
        events: &[StreamEvent],
        artists: &[String],
    ) -> Vec<ArtistHistory> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(artists.len());
        for (position, artist) in artists.iter().enumerate() {
            index.entry(artist.as_str()).or_insert(position);
        }

        let mut counts: BTreeMap<(usize, DailyDate), u64> = BTreeMap::new();
        for event in events {
            if let Some(&position) = event.artist.as_deref().and_then(|a| index.get(a)) {
                *counts.entry((position, self.date_of(event))).or_insert(0) += 1;
            }
        }

        let mut history: Vec<ArtistHistory> = artists
            .iter()
            .map(|artist| ArtistHistory {
                artist: artist.clone(),
                points: Vec::new(),
            })
            .collect();
        for ((position, date), streams) in counts {
            history[position].points.push(HistoryPoint { date, streams });
        }
        history
    }

    /// Artists ranked by the number of distinct days they were played on
    pub fn artist_day_coverage(&self, events: &[StreamEvent]) -> Vec<ArtistDayCoverage> {
        let mut days_by_artist: BTreeMap<&str, BTreeSet<DailyDate>> = BTreeMap::new();
        for event in events {
            if let Some(artist) = event.artist.as_deref() {
                days_by_artist
                    .entry(artist)
                    .or_default()
                    .insert(self.date_of(event));
            }
        }

        let mut coverage: Vec<ArtistDayCoverage> = days_by_artist
            .into_iter()
            .map(|(artist, days)| ArtistDayCoverage {
                artist: artist.to_string(),
                days: days.len() as u64,
            })
            .collect();
        coverage.sort_by(|a, b| b.days.cmp(&a.days));
        coverage.truncate(self.top_n);
        coverage
    }

    /// Compute every view for one selection
    pub fn report(&self, events: &[StreamEvent], label: impl Into<String>) -> ListeningReport {
        let label = label.into();
        let daily = self.daily_totals(events);
        let totals = Totals::from_daily(&daily);

        let history_artists: Vec<String> = Self::rank_artists(events, self.history_top)
            .into_iter()
            .map(|rank| rank.artist)
            .collect();

        debug!(
            "Building report '{}' over {} events ({} active days)",
            label, totals.streams, totals.active_days
        );

        ListeningReport {
            timezone: self.timezone_config.display_name().to_string(),
            weekdays: self.weekday_profile(events),
            top_artists: self.top_artists(events),
            top_tracks: self.top_tracks(events),
            artist_history: self.top_artist_history(events, &history_artists),
            day_coverage: self.artist_day_coverage(events),
            totals,
            daily,
            label,
        }
    }
}
