//! Availability [`Record`] definitions.

use std::fmt;

use common::{define_kind, Date, Price};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use time::{Duration, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::domain::parking;

/// Explicit override of the default availability of a parking for a
/// contiguous time window on a single date.
///
/// No [`Record`]s on a date means the whole date is available at the base
/// price. A single [`Record`] spanning the [whole day] overrides the date as a
/// whole, while several [`Record`]s split it into time slots.
///
/// [whole day]: Record::is_whole_day
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// ID of this [`Record`], if it's persisted already.
    pub id: Option<Id>,

    /// ID of the parking this [`Record`] belongs to.
    pub parking_id: parking::Id,

    /// Beginning of the time window.
    pub starts_at: PrimitiveDateTime,

    /// End of the time window (exclusive, always after [`Record::starts_at`]).
    pub ends_at: PrimitiveDateTime,

    /// Indicator whether bookings are permitted in this time window.
    pub is_available: bool,

    /// Hourly [`Price`] override, if any.
    pub hourly_price: Option<Price>,

    /// [`RecurrenceTag`] of the series this [`Record`] was generated in, if
    /// any.
    pub recurrence: Option<RecurrenceTag>,
}

impl Record {
    /// Creates a new unpersisted [`Record`] spanning the provided [`Window`] on
    /// the provided [`Date`].
    #[must_use]
    pub fn new(parking_id: parking::Id, date: Date, window: Window) -> Self {
        Self {
            id: None,
            parking_id,
            starts_at: window.start.on(date),
            ends_at: window.end.on(date),
            is_available: true,
            hourly_price: None,
            recurrence: None,
        }
    }

    /// Returns the [`Date`] this [`Record`] belongs to.
    #[must_use]
    pub fn date(&self) -> Date {
        self.starts_at.date().into()
    }

    /// Returns the [`TimeOfDay`] this [`Record`] starts at.
    #[must_use]
    pub fn start_time(&self) -> TimeOfDay {
        TimeOfDay::of(self.starts_at.time())
    }

    /// Returns the [`TimeOfDay`] this [`Record`] ends at.
    ///
    /// A [`Record`] ending exactly at the next midnight ends at
    /// [`TimeOfDay::END_OF_DAY`].
    #[must_use]
    pub fn end_time(&self) -> TimeOfDay {
        if self.ends_at.date() > self.starts_at.date()
            && self.ends_at.time() == Time::MIDNIGHT
        {
            TimeOfDay::END_OF_DAY
        } else {
            TimeOfDay::of(self.ends_at.time())
        }
    }

    /// Returns the time [`Window`] of this [`Record`] within its [`Date`].
    #[must_use]
    pub fn window(&self) -> Window {
        Window {
            start: self.start_time(),
            end: self.end_time(),
        }
    }

    /// Indicates whether this [`Record`] spans the canonical whole-day window
    /// (`00:00`-`23:59`, or up to `24:00`) of its [`Date`].
    #[must_use]
    pub fn is_whole_day(&self) -> bool {
        let spans_single_date = self.ends_at.date() == self.starts_at.date()
            || self.end_time() == TimeOfDay::END_OF_DAY;
        spans_single_date && self.window().is_whole_day()
    }

    /// Returns the [`RecurrenceTag`] of this [`Record`], if it's a part of a
    /// recurring series.
    #[must_use]
    pub fn recurrence(&self) -> Option<&RecurrenceTag> {
        self.recurrence.as_ref()
    }

    /// Returns the [`Signature`] of this [`Record`].
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature {
            window: self.window(),
            is_available: self.is_available,
        }
    }
}

/// ID of a [`Record`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

/// Opaque tag grouping [`Record`]s generated out of a single recurring edit.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub struct RecurrenceTag(String);

impl RecurrenceTag {
    /// Creates a new [`RecurrenceTag`] if the given `tag` is not blank.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        (!tag.trim().is_empty()).then_some(Self(tag))
    }

    /// Generates a new unique [`RecurrenceTag`].
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for RecurrenceTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Start time, end time and availability of a [`Record`].
///
/// Used to find the series of legacy [`Record`]s generated before they were
/// tagged with [`RecurrenceTag`]s.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Signature {
    /// Time [`Window`] of a [`Record`].
    pub window: Window,

    /// Availability of a [`Record`].
    pub is_available: bool,
}

define_kind! {
    #[doc = "Kind of an availability override sent to the bulk replay."]
    enum Kind {
        #[doc = "Whole day available."]
        AlwaysAvailable = 1,

        #[doc = "Available time slot."]
        TimeSlot = 2,

        #[doc = "Unavailable whole day or time slot."]
        Unavailable = 3,
    }
}

/// Time window within a single date.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Window {
    /// Start of this [`Window`].
    pub start: TimeOfDay,

    /// End of this [`Window`].
    pub end: TimeOfDay,
}

impl Window {
    /// Canonical whole-day [`Window`].
    pub const WHOLE_DAY: Self = Self {
        start: TimeOfDay::MIDNIGHT,
        end: TimeOfDay::LAST_MINUTE,
    };

    /// Indicates whether this [`Window`] is the canonical whole-day one.
    #[must_use]
    pub fn is_whole_day(self) -> bool {
        self.start == TimeOfDay::MIDNIGHT
            && (self.end == TimeOfDay::LAST_MINUTE
                || self.end == TimeOfDay::END_OF_DAY)
    }
}

/// Time of day with a minute precision, from `00:00` to `24:00` inclusive.
#[derive(
    Clone, Copy, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Beginning of a day.
    pub const MIDNIGHT: Self = Self(0);

    /// Last minute of a day, ending the canonical whole-day window.
    pub const LAST_MINUTE: Self = Self(23 * 60 + 59);

    /// Latest end of a newly added time slot.
    pub const LATEST_SLOT_END: Self = Self(23 * 60 + 45);

    /// End of a day (the next midnight).
    pub const END_OF_DAY: Self = Self(24 * 60);

    /// Creates a new [`TimeOfDay`] out of the provided hours and minutes.
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(u16::from(hour) * 60 + u16::from(minute))
    }

    /// Creates a new [`TimeOfDay`] out of the provided minutes since midnight.
    #[must_use]
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= Self::END_OF_DAY.0).then_some(Self(minutes))
    }

    /// Returns the [`TimeOfDay`] of the provided [`Time`], truncated to
    /// minutes.
    #[must_use]
    pub fn of(time: Time) -> Self {
        Self(u16::from(time.hour()) * 60 + u16::from(time.minute()))
    }

    /// Returns the number of minutes since midnight.
    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Returns the number of minutes from this [`TimeOfDay`] to the `later`
    /// one (negative if `later` is actually earlier).
    #[must_use]
    pub fn minutes_until(self, later: Self) -> i32 {
        i32::from(later.0) - i32::from(self.0)
    }

    /// Adds the provided number of minutes, saturating at
    /// [`TimeOfDay::END_OF_DAY`].
    #[must_use]
    pub fn saturating_add(self, minutes: u16) -> Self {
        Self(self.0.saturating_add(minutes).min(Self::END_OF_DAY.0))
    }

    /// Rounds this [`TimeOfDay`] up to the closest multiple of `step` minutes.
    #[must_use]
    pub fn ceil_to(self, step: u16) -> Self {
        if step == 0 {
            return self;
        }
        Self(self.0.div_ceil(step).saturating_mul(step).min(Self::END_OF_DAY.0))
    }

    /// Returns this [`TimeOfDay`] on the provided [`Date`].
    ///
    /// [`TimeOfDay::END_OF_DAY`] becomes the midnight of the next [`Date`].
    #[must_use]
    pub fn on(self, date: Date) -> PrimitiveDateTime {
        let date = time::Date::from(date);
        let midnight = PrimitiveDateTime::new(date, Time::MIDNIGHT);
        midnight.saturating_add(Duration::minutes(i64::from(self.0)))
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Error of parsing a [`TimeOfDay`].
#[derive(Clone, Debug, Display, Error)]
#[display("invalid `HH:MM` time: `{_0}`")]
pub struct ParseTimeError(#[error(not(source))] String);

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    /// Parses `HH:MM` (seconds in `HH:MM:SS` form are ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError(s.to_owned());

        let mut parts = s.split(':');
        let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
            return Err(err());
        };
        if let Some(sec) = parts.next() {
            if sec.len() != 2 || sec.parse::<u8>().map_or(true, |s| s >= 60) {
                return Err(err());
            }
        }
        if parts.next().is_some() || h.len() != 2 || m.len() != 2 {
            return Err(err());
        }

        let hour = h.parse().map_err(|_| err())?;
        let minute = m.parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}
