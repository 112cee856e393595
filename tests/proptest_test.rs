//! Property-based tests for spotistat using proptest

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use spotistat::{
    aggregation::Aggregator,
    filters::{AvailableDates, DateWindow, WindowFilter},
    timezone::TimezoneConfig,
    types::{ListenTimestamp, StreamEvent},
};
use std::collections::HashMap;

// Strategies for generating test data

prop_compose! {
    fn arb_timestamp()(
        secs in 1577836800i64..1609459200i64, // 2020-01-01 to 2021-01-01
    ) -> ListenTimestamp {
        ListenTimestamp::new(Utc.timestamp_opt(secs, 0).unwrap())
    }
}

prop_compose! {
    fn arb_stream_event()(
        timestamp in arb_timestamp(),
        artist in prop::option::of(prop::sample::select(vec![
            "Radiohead", "Björk", "Aphex Twin", "Massive Attack", "Portishead",
        ])),
        track in prop::option::of(prop::sample::select(vec![
            "Intro", "Outro", "Interlude", "Teardrop",
        ])),
        ms_played in 0u64..600_000,
    ) -> StreamEvent {
        StreamEvent {
            timestamp,
            artist: artist.map(str::to_string),
            track: track.map(str::to_string),
            ms_played,
        }
    }
}

fn aggregator(top_n: usize) -> Aggregator {
    Aggregator::new(TimezoneConfig::default()).with_top(top_n)
}

proptest! {
    #[test]
    fn test_daily_hours_sum_to_total(
        events in prop::collection::vec(arb_stream_event(), 1..200),
    ) {
        let daily = aggregator(10).daily_totals(&events);
        let total_ms: u64 = events.iter().map(|e| e.ms_played).sum();

        let hours: f64 = daily.iter().map(|d| d.hours_played).sum();
        prop_assert!((hours - total_ms as f64 / 3_600_000.0).abs() < 1e-6);

        let streams: u64 = daily.iter().map(|d| d.streams).sum();
        prop_assert_eq!(streams, events.len() as u64);
    }

    #[test]
    fn test_weekday_day_counts_cover_span(
        events in prop::collection::vec(arb_stream_event(), 1..200),
    ) {
        let profile = aggregator(10).weekday_profile(&events);
        prop_assert_eq!(profile.len(), 7);

        let dates: Vec<_> = events.iter().map(|e| e.timestamp.to_daily_date()).collect();
        let first = *dates.iter().min().unwrap().inner();
        let last = *dates.iter().max().unwrap().inner();
        let span = (last - first).num_days() as u64 + 1;

        let day_count: u64 = profile.iter().map(|p| p.day_count).sum();
        prop_assert_eq!(day_count, span);

        for row in &profile {
            prop_assert_eq!(row.stream_length_avg_min.is_none(), row.total_streams == 0);
        }
    }

    #[test]
    fn test_top_artists_sorted_and_bounded(
        events in prop::collection::vec(arb_stream_event(), 0..200),
        top_n in 1usize..8,
    ) {
        let top = aggregator(top_n).top_artists(&events);
        prop_assert!(top.len() <= top_n);
        prop_assert!(top.windows(2).all(|w| w[0].streams >= w[1].streams));
        prop_assert!(top.iter().all(|a| !a.artist.is_empty()));

        let missing = events.iter().filter(|e| e.artist.is_none()).count() as u64;
        let counted: u64 = Aggregator::rank_artists(&events, usize::MAX)
            .iter()
            .map(|a| a.streams)
            .sum();
        prop_assert_eq!(counted + missing, events.len() as u64);
    }

    #[test]
    fn test_top_tracks_sorted_and_bounded(
        events in prop::collection::vec(arb_stream_event(), 0..200),
        top_n in 1usize..8,
    ) {
        let top = aggregator(top_n).top_tracks(&events);
        prop_assert!(top.len() <= top_n);
        prop_assert!(top.windows(2).all(|w| w[0].streams >= w[1].streams));

        let complete = events
            .iter()
            .filter(|e| e.artist.is_some() && e.track.is_some())
            .count() as u64;
        let shown: u64 = top.iter().map(|t| t.streams).sum();
        prop_assert!(shown <= complete);
    }

    #[test]
    fn test_day_coverage_not_above_stream_count(
        events in prop::collection::vec(arb_stream_event(), 0..200),
    ) {
        let agg = aggregator(usize::MAX);
        let streams: HashMap<String, u64> = agg
            .top_artists(&events)
            .into_iter()
            .map(|a| (a.artist, a.streams))
            .collect();

        for coverage in agg.artist_day_coverage(&events) {
            prop_assert!(coverage.days >= 1);
            prop_assert!(coverage.days <= streams[&coverage.artist]);
        }
    }

    #[test]
    fn test_history_matches_ranked_artists(
        events in prop::collection::vec(arb_stream_event(), 0..200),
    ) {
        let agg = aggregator(10);
        let ranked = Aggregator::rank_artists(&events, 3);
        let names: Vec<String> = ranked.iter().map(|a| a.artist.clone()).collect();

        let history = agg.top_artist_history(&events, &names);
        prop_assert_eq!(history.len(), ranked.len());
        for (series, rank) in history.iter().zip(&ranked) {
            prop_assert_eq!(&series.artist, &rank.artist);
            let total: u64 = series.points.iter().map(|p| p.streams).sum();
            prop_assert_eq!(total, rank.streams);
            prop_assert!(series.points.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[test]
    fn test_single_day_range_selects_exactly_that_day(
        events in prop::collection::vec(arb_stream_event(), 1..100),
        pick in any::<prop::sample::Index>(),
    ) {
        let day = *pick.get(&events).timestamp.to_daily_date().inner();
        let window = AvailableDates::from_events(&events, &Tz::UTC)
            .validate(DateWindow::Range { start: day, end: day })
            .unwrap();

        let selected = WindowFilter::new(window).apply(&events);
        let expected = events
            .iter()
            .filter(|e| *e.timestamp.to_daily_date().inner() == day)
            .count();
        prop_assert_eq!(selected.len(), expected);
        prop_assert!(selected.iter().all(|e| *e.timestamp.to_daily_date().inner() == day));
    }

    #[test]
    fn test_filtering_never_mutates_source(
        events in prop::collection::vec(arb_stream_event(), 0..100),
        year in 2019i32..2022,
    ) {
        let before = events.clone();
        let _ = WindowFilter::new(DateWindow::Year(year)).apply(&events);
        prop_assert_eq!(before, events);
    }

    #[test]
    fn test_year_without_streams_rejected(
        events in prop::collection::vec(arb_stream_event(), 0..50),
    ) {
        let available = AvailableDates::from_events(&events, &Tz::UTC);
        prop_assert!(available.validate(DateWindow::Year(2024)).is_err());
        let range_result = available.validate(DateWindow::Range {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        });
        prop_assert!(range_result.is_err());
    }
}
