//! Wall-clock access and calendar-day helpers
//!
//! "Now" is always an explicit value. Components that need the current time
//! hold a [`Clock`] so tests can pin it with [`FixedClock`].

use std::sync::RwLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Calendar date of `instant` in `tz`
pub fn local_date(instant: DateTime<Utc>, tz: &FixedOffset) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// True iff `timestamp` falls on the same calendar day as `now` in `tz`
pub fn is_today_at(timestamp: DateTime<Utc>, now: DateTime<Utc>, tz: &FixedOffset) -> bool {
    local_date(timestamp, tz) == local_date(now, tz)
}

/// [`is_today_at`] against the real clock
pub fn is_today(timestamp: DateTime<Utc>, tz: &FixedOffset) -> bool {
    is_today_at(timestamp, Utc::now(), tz)
}

/// First instant of `now`'s calendar day in `tz`, as UTC
pub fn start_of_day(now: DateTime<Utc>, tz: &FixedOffset) -> DateTime<Utc> {
    midnight(local_date(now, tz), tz)
}

/// Last storable instant (second precision) of `now`'s calendar day in `tz`
pub fn end_of_day(now: DateTime<Utc>, tz: &FixedOffset) -> DateTime<Utc> {
    let tomorrow = local_date(now, tz)
        .succ_opt()
        .unwrap_or(NaiveDate::MAX);
    midnight(tomorrow, tz) - Duration::seconds(1)
}

fn midnight(day: NaiveDate, tz: &FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    // A fixed offset never produces gaps or folds
    (local - *tz).and_utc()
}
