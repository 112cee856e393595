//! Timezone handling for calendar dates
//!
//! Spotify writes every timestamp in UTC, so by default a stream's calendar
//! date is its UTC date. Listeners far from UTC can move the day boundary to
//! an explicit IANA zone or to the system's local zone.

use crate::error::{Result, SpotistatError};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone used to derive calendar dates
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }
}

impl TimezoneConfig {
    /// Create a timezone configuration from CLI arguments
    ///
    /// An explicit `--timezone` wins over `--local`; with neither, dates are UTC.
    pub fn from_cli(timezone_str: Option<&str>, use_local: bool) -> Result<Self> {
        let tz = match timezone_str {
            Some(tz_str) => Tz::from_str(tz_str).map_err(|_| {
                SpotistatError::InvalidTimezone(format!(
                    "'{tz_str}'. Use format like 'America/New_York', 'Europe/Berlin', or 'UTC'"
                ))
            })?,
            None if use_local => get_local_timezone(),
            None => Tz::UTC,
        };

        Ok(Self {
            tz,
            is_utc: tz == Tz::UTC,
        })
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }
}

/// Detect the system's local timezone
///
/// Tries the `TZ` environment variable, then the platform zone reported by
/// `iana-time-zone`. Falls back to UTC.
pub fn get_local_timezone() -> Tz {
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_utc() {
        let config = TimezoneConfig::from_cli(None, false).unwrap();
        assert!(config.is_utc);
        assert_eq!(config.tz, Tz::UTC);
        assert_eq!(config.display_name(), "UTC");
    }

    #[test]
    fn test_timezone_config_explicit() {
        let config = TimezoneConfig::from_cli(Some("America/New_York"), false).unwrap();
        assert!(!config.is_utc);
        assert_eq!(config.display_name(), "America/New_York");
    }

    #[test]
    fn test_explicit_timezone_beats_local() {
        let config = TimezoneConfig::from_cli(Some("Asia/Tokyo"), true).unwrap();
        assert_eq!(config.tz.name(), "Asia/Tokyo");
    }

    #[test]
    fn test_timezone_config_invalid() {
        let result = TimezoneConfig::from_cli(Some("Invalid/Timezone"), false);
        assert!(matches!(result, Err(SpotistatError::InvalidTimezone(_))));
    }
}
