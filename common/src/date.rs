//! [`Date`] definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::BorrowedFormatItem, macros::format_description,
    Duration, Month,
};

/// Format of a [`Date`] in its textual representation.
const ISO: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time zone, written as `YYYY-MM-DD`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] out of its calendar components.
    ///
    /// [`None`] is returned if there is no such day in the calendar.
    #[must_use]
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the first day of the provided month.
    #[must_use]
    pub fn first_of_month(year: i32, month: u8) -> Option<Self> {
        Self::new(year, month, 1)
    }

    /// Returns the last day of the month this [`Date`] belongs to.
    #[must_use]
    pub fn last_of_month(self) -> Self {
        let last = self.0.month().length(self.0.year());
        Self(self.0.replace_day(last).unwrap_or(self.0))
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month (`1..=12`) of this [`Date`].
    #[must_use]
    pub fn month(self) -> u8 {
        self.0.month().into()
    }

    /// Returns the day of month (`1..=31`) of this [`Date`].
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }

    /// Returns the [`Date`] the provided number of days away from this one.
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn plus_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(Duration::days(days)).map(Self)
    }

    /// Returns the [`Date`] the provided number of calendar months after this
    /// one, keeping its day of month.
    ///
    /// Days not existing in the target month are clamped to its last day, so
    /// `2025-01-31` plus one month is `2025-02-28`.
    #[must_use]
    pub fn plus_months(self, months: u32) -> Option<Self> {
        let index = i64::from(u8::from(self.0.month()) - 1) + i64::from(months);
        let year = i64::from(self.0.year()) + index.div_euclid(12);
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        let year = i32::try_from(year).ok()?;

        let first = Self::first_of_month(year, month)?;
        let day = self.0.day().min(first.last_of_month().day());
        Self::new(year, month, day)
    }

    /// Returns the number of days from this [`Date`] to the `other` one.
    ///
    /// The result is negative if `other` precedes this [`Date`].
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }

    /// Returns an iterator over all the dates from this [`Date`] to the `last`
    /// one, both inclusive.
    pub fn through(self, last: Self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |d| d.plus_days(1))
            .take_while(move |d| *d <= last)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(ISO).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, ISO).map(Self).map_err(ParseError)
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let raw = <std::borrow::Cow<'de, str>>::deserialize(d)?;
            Self::from_str(&raw).map_err(de::Error::custom)
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::Date;

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(date("2025-03-10"), Date::new(2025, 3, 10).unwrap());
        assert_eq!(date("2024-02-29").to_string(), "2024-02-29");

        assert!(Date::from_str("2025-02-29").is_err());
        assert!(Date::from_str("2025-3-10").is_err());
        assert!(Date::from_str("10/03/2025").is_err());
        assert!(Date::from_str("").is_err());
    }

    #[test]
    fn adds_days() {
        assert_eq!(date("2025-03-10").plus_days(7), Some(date("2025-03-17")));
        assert_eq!(date("2025-12-31").plus_days(1), Some(date("2026-01-01")));
        assert_eq!(date("2025-03-10").days_until(date("2026-03-10")), 365);
        assert_eq!(date("2025-03-10").days_until(date("2025-03-01")), -9);
    }

    #[test]
    fn adds_months_clamping_day() {
        assert_eq!(date("2025-01-31").plus_months(1), Some(date("2025-02-28")));
        assert_eq!(date("2024-01-31").plus_months(1), Some(date("2024-02-29")));
        assert_eq!(date("2025-01-31").plus_months(2), Some(date("2025-03-31")));
        assert_eq!(date("2025-11-15").plus_months(3), Some(date("2026-02-15")));
        assert_eq!(date("2025-05-20").plus_months(0), Some(date("2025-05-20")));
    }

    #[test]
    fn iterates_inclusive_ranges() {
        let days = date("2025-02-27")
            .through(date("2025-03-02"))
            .map(|d| d.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            days,
            ["2025-02-27", "2025-02-28", "2025-03-01", "2025-03-02"],
        );
        assert_eq!(date("2025-03-02").through(date("2025-03-01")).count(), 0);
    }

    #[test]
    fn month_bounds() {
        assert_eq!(date("2025-02-10").last_of_month(), date("2025-02-28"));
        assert_eq!(Date::first_of_month(2025, 13), None);
    }
}
