//! Expansion of recurring edits into concrete dates.

use std::str::FromStr as _;

use common::Date;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Number of days a recurring series may span, starting from its anchor.
pub const WINDOW_DAYS: i64 = 365;

/// Maximal number of weekly and biweekly occurrences.
const MAX_WEEKS: i64 = 52;

/// Maximal number of monthly occurrences.
const MAX_MONTHS: u32 = 12;

/// How often an edit repeats.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
)]
#[serde(from = "Option<String>", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum Frequency {
    /// Applies to the anchor date only.
    #[default]
    Never,

    /// Every day.
    Daily,

    /// Every 7 days.
    Weekly,

    /// Every 14 days.
    Biweekly,

    /// Same day of every month.
    Monthly,
}

impl Frequency {
    /// Parses a [`Frequency`] leniently: anything unknown is [`Never`].
    ///
    /// [`Never`]: Frequency::Never
    #[must_use]
    pub fn lenient(s: &str) -> Self {
        Self::from_str(s.trim()).unwrap_or_default()
    }

    /// Indicates whether this [`Frequency`] produces more than one date.
    #[must_use]
    pub fn is_recurring(self) -> bool {
        self != Self::Never
    }
}

impl From<Option<String>> for Frequency {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map(Self::lenient).unwrap_or_default()
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.to_string()
    }
}

/// Expands the provided `anchor` date into all the dates the [`Frequency`]
/// applies to.
///
/// Recurring series never leave the [`WINDOW_DAYS`] window starting at the
/// `anchor`, and are additionally clipped to the `start`..=`end` range, when
/// given. The result is ascending and free of duplicates.
///
/// [`Frequency::Never`] always results in the `anchor` alone.
#[must_use]
pub fn expand(
    frequency: Frequency,
    anchor: Date,
    start: Option<Date>,
    end: Option<Date>,
) -> Vec<Date> {
    let offsets = |step: i64, count: i64| {
        (0..count)
            .map(move |k| k * step)
            .take_while(|days| *days < WINDOW_DAYS)
            .filter_map(|days| anchor.plus_days(days))
            .collect::<Vec<_>>()
    };

    let series = match frequency {
        Frequency::Never => return vec![anchor],
        Frequency::Daily => offsets(1, WINDOW_DAYS),
        Frequency::Weekly => offsets(7, MAX_WEEKS),
        Frequency::Biweekly => offsets(14, MAX_WEEKS),
        Frequency::Monthly => (0..MAX_MONTHS)
            .filter_map(|k| anchor.plus_months(k))
            .take_while(|d| anchor.days_until(*d) < WINDOW_DAYS)
            .collect(),
    };

    series
        .into_iter()
        .filter(|d| start.map_or(true, |s| *d >= s))
        .filter(|d| end.map_or(true, |e| *d <= e))
        .collect()
}

/// Same as [`expand()`], but operates on `YYYY-MM-DD` strings.
///
/// An unparsable `anchor` results in itself as the only element, while
/// unparsable range bounds are ignored.
#[must_use]
pub fn expand_iso(
    frequency: &str,
    anchor: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<String> {
    let Ok(date) = Date::from_str(anchor) else {
        return vec![anchor.to_owned()];
    };
    let bound = |b: Option<&str>| b.and_then(|b| Date::from_str(b).ok());

    expand(Frequency::lenient(frequency), date, bound(start), bound(end))
        .into_iter()
        .map(|d| d.to_string())
        .collect()
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Date;

    use super::{expand, expand_iso, Frequency, WINDOW_DAYS};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    const RECURRING: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
    ];

    #[test]
    fn never_repeats_anchor_only() {
        assert_eq!(
            expand(Frequency::Never, date("2025-03-10"), None, None),
            [date("2025-03-10")],
        );
    }

    #[test]
    fn parses_leniently() {
        assert_eq!(Frequency::lenient("weekly"), Frequency::Weekly);
        assert_eq!(Frequency::lenient(" biweekly "), Frequency::Biweekly);
        assert_eq!(Frequency::lenient("yearly"), Frequency::Never);
        assert_eq!(Frequency::lenient(""), Frequency::Never);
        assert_eq!(Frequency::Monthly.to_string(), "monthly");
    }

    #[test]
    fn stays_within_window() {
        for anchor in ["2025-03-10", "2024-02-29", "2025-12-31", "2025-01-31"] {
            let anchor = date(anchor);
            for freq in RECURRING {
                let dates = expand(freq, anchor, None, None);

                assert_eq!(dates.first(), Some(&anchor), "{freq}");
                assert!(
                    dates.iter().all(|d| {
                        (0..=WINDOW_DAYS).contains(&anchor.days_until(*d))
                    }),
                    "{freq} leaves window",
                );
                assert!(
                    dates.windows(2).all(|w| w[0] < w[1]),
                    "{freq} is not strictly ascending",
                );
            }
        }
    }

    #[test]
    fn weekly_from_march() {
        let dates = expand(Frequency::Weekly, date("2025-03-10"), None, None);

        assert_eq!(dates.len(), 52);
        assert_eq!(dates[0], date("2025-03-10"));
        assert_eq!(dates[1], date("2025-03-17"));
        assert_eq!(dates[51], date("2026-03-02"));
        assert!(dates.iter().all(|d| *d <= date("2026-03-09")));
    }

    #[test]
    fn daily_and_biweekly_counts() {
        let anchor = date("2025-03-10");

        let daily = expand(Frequency::Daily, anchor, None, None);
        assert_eq!(daily.len(), 365);
        assert_eq!(daily.last(), Some(&date("2026-03-09")));

        let biweekly = expand(Frequency::Biweekly, anchor, None, None);
        assert_eq!(biweekly.len(), 27);
        assert_eq!(biweekly[1], date("2025-03-24"));
    }

    #[test]
    fn monthly_advances_by_calendar_month() {
        let dates = expand(Frequency::Monthly, date("2025-01-31"), None, None);

        assert_eq!(dates.len(), 12);
        assert_eq!(dates[1], date("2025-02-28"));
        assert_eq!(dates[2], date("2025-03-31"));
        assert_eq!(dates[3], date("2025-04-30"));
        assert_eq!(dates[11], date("2025-12-31"));
    }

    #[test]
    fn clips_to_range() {
        let dates = expand(
            Frequency::Weekly,
            date("2025-03-10"),
            Some(date("2025-04-01")),
            Some(date("2025-04-30")),
        );

        assert_eq!(
            dates,
            [
                date("2025-04-07"),
                date("2025-04-14"),
                date("2025-04-21"),
                date("2025-04-28"),
            ],
        );
    }

    #[test]
    fn expands_iso_strings() {
        assert_eq!(
            expand_iso("weekly", "2025-03-10", None, Some("2025-03-20")),
            ["2025-03-10", "2025-03-17"],
        );
        assert_eq!(expand_iso("weekly", "2025-02-30", None, None), [
            "2025-02-30",
        ]);
        assert_eq!(expand_iso("weekly", "garbage", None, None), ["garbage"]);
        assert_eq!(expand_iso("sometimes", "2025-03-10", None, None), [
            "2025-03-10",
        ]);
    }
}
