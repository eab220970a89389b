//! Injectable clock producing timestamps in a fixed civil timezone.
//!
//! Leave dates are civil dates: "today" must mean the same calendar day
//! regardless of the deployment host's timezone, so every timestamp is
//! computed in one configured IANA zone rather than UTC or system-local.

use std::fmt::Debug;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::LeaveConfig;
use crate::error::AppResult;

/// Source of the current instant, rendered in the configured civil zone.
pub trait Clock: Send + Sync + Debug {
    /// Current instant with the civil zone's offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock rendered in a named timezone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    /// Creates a clock for the given zone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Creates a clock for the zone named in the leave configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the zone name is unknown.
    pub fn from_config(config: &LeaveConfig) -> AppResult<Self> {
        Ok(Self::new(config.tz()?))
    }

    /// The zone this clock renders time in.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for ZonedClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Manila)
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz).fixed_offset()
    }
}

/// Clock frozen at one instant. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Creates a clock frozen at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }

    /// Creates a clock frozen at a local wall time in `tz`.
    ///
    /// Returns `None` when the wall time is ambiguous or skipped in that zone.
    #[must_use]
    pub fn at_local(tz: Tz, year: i32, month: u32, day: u32, hour: u32, min: u32) -> Option<Self> {
        tz.with_ymd_and_hms(year, month, day, hour, min, 0)
            .single()
            .map(|dt| Self::new(dt.fixed_offset()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock::at_local(chrono_tz::Asia::Manila, 2025, 1, 10, 9, 30).unwrap();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().date_naive(), NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }

    #[test]
    fn test_fixed_clock_keeps_zone_offset() {
        let clock = FixedClock::at_local(chrono_tz::Asia::Manila, 2025, 6, 1, 0, 0).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_civil_day_differs_from_utc_day() {
        // 2025-03-01 07:00 in Manila is still 2025-02-28 in UTC.
        let clock = FixedClock::at_local(chrono_tz::Asia::Manila, 2025, 3, 1, 7, 0).unwrap();
        assert_eq!(clock.now().date_naive(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(
            clock.now().with_timezone(&Utc).date_naive(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_zoned_clock_uses_configured_offset() {
        let clock = ZonedClock::new(chrono_tz::Asia::Tokyo);
        assert_eq!(clock.timezone(), chrono_tz::Asia::Tokyo);
        assert_eq!(clock.now().offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_zoned_clock_from_config() {
        let clock = ZonedClock::from_config(&LeaveConfig::default()).unwrap();
        assert_eq!(clock.timezone(), chrono_tz::Asia::Manila);

        let bad = LeaveConfig {
            timezone: "Nowhere/Land".to_string(),
        };
        assert!(ZonedClock::from_config(&bad).is_err());
    }
}
