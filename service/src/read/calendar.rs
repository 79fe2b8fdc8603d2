//! Calendar read definitions.

use std::borrow::Borrow;

use common::{Date, Price};
use itertools::Itertools as _;
use serde::Serialize;
use strum::{Display, EnumString};

use crate::domain::{availability::Record, draft::Draft, parking};

/// Display classification of a calendar day.
#[derive(
    Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DayState {
    /// Available at the base price.
    Default,

    /// Available as a whole at an overridden price.
    CustomPrice,

    /// Available in time slots, some of them at an overridden price.
    TimeSlots,

    /// Unavailable as a whole.
    Unavailable,

    /// Unavailable in some (or all) of its time slots.
    TimeSlotUnavailable,
}

/// Derived view of a single calendar day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Day {
    /// [`Date`] of this [`Day`].
    pub date: Date,

    /// [`DayState`] of this [`Day`].
    pub state: DayState,

    /// Representative hourly [`Price`] of this [`Day`], if any.
    pub price: Option<Price>,
}

impl Day {
    /// Derives the [`Day`] out of the availability [`Record`]s of its [`Date`]
    /// and the base hourly price of the parking.
    #[must_use]
    pub fn derive<R: Borrow<Record>>(
        date: Date,
        records: &[R],
        base_price: Option<Price>,
    ) -> Self {
        let (state, price) = derive_state(records, base_price);
        Self { date, state, price }
    }
}

/// Derives the [`DayState`] and the representative price of a day out of its
/// availability [`Record`]s and the base hourly price of the parking.
///
/// Rules are checked in order, the first matching one wins:
/// 1. no [`Record`]s is [`DayState::Default`];
/// 2. only unavailable [`Record`]s is [`DayState::Unavailable`] for a single
///    whole-day [`Record`], and [`DayState::TimeSlotUnavailable`] otherwise;
/// 3. several [`Record`]s are [`DayState::TimeSlotUnavailable`] if any of them
///    is unavailable, [`DayState::TimeSlots`] if any of them is priced
///    differently from the base price, and [`DayState::Default`] otherwise;
/// 4. a single available [`Record`] is [`DayState::CustomPrice`] if it's
///    priced differently from the base price, and [`DayState::Default`]
///    otherwise.
///
/// The representative price is the one of the first [`Record`], falling back
/// to the base price. A [`Record`] without a price never counts as priced
/// differently.
#[must_use]
pub fn derive_state<R: Borrow<Record>>(
    records: &[R],
    base_price: Option<Price>,
) -> (DayState, Option<Price>) {
    let price = records
        .first()
        .and_then(|r| r.borrow().hourly_price)
        .or(base_price);
    let differs = |r: &R| {
        r.borrow().hourly_price.is_some_and(|p| Some(p) != base_price)
    };

    let state = match records {
        [] => DayState::Default,
        [single] if !single.borrow().is_available => {
            if single.borrow().is_whole_day() {
                DayState::Unavailable
            } else {
                DayState::TimeSlotUnavailable
            }
        }
        [single] => {
            if differs(single) {
                DayState::CustomPrice
            } else {
                DayState::Default
            }
        }
        many => {
            if many.iter().any(|r| !r.borrow().is_available) {
                DayState::TimeSlotUnavailable
            } else if many.iter().any(differs) {
                DayState::TimeSlots
            } else {
                DayState::Default
            }
        }
    };
    (state, price)
}

/// Derived view of a calendar month.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Month {
    /// Year of this [`Month`].
    pub year: i32,

    /// Number (`1..=12`) of this [`Month`].
    pub month: u8,

    /// [`Day`]s of this [`Month`] in order.
    pub days: Vec<Day>,
}

impl Month {
    /// Derives the [`Month`] out of the parking's availability [`Record`]s.
    ///
    /// If a [`Draft`] is provided, its staged edits are previewed over the
    /// [`Record`]s: a staged update replaces the [`Record`]s of its date, and
    /// staged deletions hide the [`Record`]s they target.
    ///
    /// [`None`] is returned for a non-existent month.
    #[must_use]
    pub fn derive(
        parking: parking::Parking,
        year: i32,
        month: u8,
        records: &[Record],
        draft: Option<&Draft>,
    ) -> Option<Self> {
        let first = Date::first_of_month(year, month)?;
        let last = first.last_of_month();

        let mut by_date = records
            .iter()
            .filter(|r| (first..=last).contains(&r.date()))
            .filter(|r| {
                draft.map_or(true, |d| {
                    r.id.map_or(true, |id| !d.is_record_deleted(id))
                })
            })
            .into_group_map_by(|r| r.date());

        let days = first
            .through(last)
            .map(|date| {
                let staged = draft.and_then(|d| {
                    if let Some(update) = d.update(date) {
                        Some(update.records(parking.id, date))
                    } else if d.is_deleted(date) {
                        Some(vec![])
                    } else {
                        None
                    }
                });
                let base = parking.hourly_price;
                match staged {
                    Some(recs) => Day::derive(date, &recs, base),
                    None => Day::derive(
                        date,
                        &by_date.remove(&date).unwrap_or_default(),
                        base,
                    ),
                }
            })
            .collect();

        Some(Self { year, month, days })
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, Price};
    use time::{macros::time, PrimitiveDateTime, Time};

    use crate::domain::{
        availability::{self, Record},
        draft::{DayUpdate, Draft},
        parking::{self, Parking},
    };

    use super::{derive_state, DayState, Month};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn record(
        day: &str,
        start: Time,
        end: Time,
        is_available: bool,
        price: Option<u32>,
    ) -> Record {
        let d = time::Date::from(date(day));
        Record {
            id: None,
            parking_id: parking::Id::from(1),
            starts_at: PrimitiveDateTime::new(d, start),
            ends_at: PrimitiveDateTime::new(d, end),
            is_available,
            hourly_price: price.map(Price::from),
            recurrence: None,
        }
    }

    fn whole_day(is_available: bool, price: Option<u32>) -> Record {
        record("2025-06-01", time!(00:00), time!(23:59), is_available, price)
    }

    fn slot(start: Time, end: Time, available: bool, price: u32) -> Record {
        record("2025-06-01", start, end, available, Some(price))
    }

    fn five() -> Option<Price> {
        Some(Price::from(5))
    }

    #[test]
    fn no_records_is_default() {
        let empty: &[Record] = &[];
        assert_eq!(derive_state(empty, five()), (DayState::Default, five()));
        assert_eq!(derive_state(empty, None), (DayState::Default, None));
    }

    #[test]
    fn unavailable_whole_day() {
        assert_eq!(
            derive_state(&[whole_day(false, None)], five()).0,
            DayState::Unavailable,
        );
        assert_eq!(
            derive_state(
                &[slot(time!(08:00), time!(12:00), false, 5)],
                five(),
            )
            .0,
            DayState::TimeSlotUnavailable,
        );
        assert_eq!(
            derive_state(
                &[
                    slot(time!(00:00), time!(12:00), false, 5),
                    slot(time!(12:00), time!(23:59), false, 5),
                ],
                five(),
            )
            .0,
            DayState::TimeSlotUnavailable,
        );
    }

    #[test]
    fn unavailable_slot_beats_custom_price() {
        let records = [
            slot(time!(08:00), time!(12:00), true, 5),
            slot(time!(12:00), time!(18:00), false, 5),
        ];
        assert_eq!(
            derive_state(&records, five()),
            (DayState::TimeSlotUnavailable, five()),
        );

        let records = [
            slot(time!(08:00), time!(12:00), true, 9),
            slot(time!(12:00), time!(18:00), false, 5),
        ];
        assert_eq!(
            derive_state(&records, five()).0,
            DayState::TimeSlotUnavailable,
        );
    }

    #[test]
    fn available_slots() {
        let records = [
            slot(time!(08:00), time!(12:00), true, 5),
            slot(time!(12:00), time!(18:00), true, 8),
        ];
        assert_eq!(
            derive_state(&records, five()),
            (DayState::TimeSlots, five()),
        );

        let records = [
            slot(time!(08:00), time!(12:00), true, 5),
            slot(time!(12:00), time!(18:00), true, 5),
        ];
        assert_eq!(derive_state(&records, five()).0, DayState::Default);
    }

    #[test]
    fn whole_day_price_override() {
        assert_eq!(
            derive_state(&[whole_day(true, Some(5))], five()),
            (DayState::Default, five()),
        );
        assert_eq!(
            derive_state(&[whole_day(true, Some(7))], five()),
            (DayState::CustomPrice, Some(Price::from(7))),
        );
        assert_eq!(
            derive_state(&[whole_day(true, None)], five()),
            (DayState::Default, five()),
        );
        assert_eq!(
            derive_state(&[whole_day(true, Some(7))], None),
            (DayState::CustomPrice, Some(Price::from(7))),
        );
    }

    #[test]
    fn is_deterministic() {
        let records = [
            slot(time!(08:00), time!(12:00), true, 6),
            whole_day(false, None),
        ];
        assert_eq!(
            derive_state(&records, five()),
            derive_state(&records, five()),
        );
    }

    #[test]
    fn month_previews_draft() {
        let parking = Parking {
            id: parking::Id::from(1),
            hourly_price: five(),
        };
        let mut first = whole_day(true, Some(7));
        first.id = Some(availability::Id::from(1));
        let mut second =
            record("2025-06-02", time!(00:00), time!(23:59), false, None);
        second.id = Some(availability::Id::from(2));
        let mut third =
            record("2025-06-03", time!(00:00), time!(23:59), false, None);
        third.id = Some(availability::Id::from(3));
        let records = [first, second, third];

        let month = Month::derive(parking, 2025, 6, &records, None).unwrap();
        assert_eq!(month.days.len(), 30);
        assert_eq!(month.days[0].state, DayState::CustomPrice);
        assert_eq!(month.days[1].state, DayState::Unavailable);
        assert_eq!(month.days[2].state, DayState::Unavailable);
        assert_eq!(month.days[3].state, DayState::Default);

        let mut draft = Draft::default();
        draft.merge_update(date("2025-06-04"), DayUpdate {
            whole_day_available: false,
            ..DayUpdate::default()
        });
        draft.merge_delete_day(date("2025-06-01"));
        draft.merge_delete_ids([availability::Id::from(2)], None);

        let month =
            Month::derive(parking, 2025, 6, &records, Some(&draft)).unwrap();
        assert_eq!(month.days[0].state, DayState::Default);
        assert_eq!(month.days[0].price, five());
        assert_eq!(month.days[1].state, DayState::Default);
        assert_eq!(month.days[2].state, DayState::Unavailable);
        assert_eq!(month.days[3].state, DayState::Unavailable);
    }

    #[test]
    fn rejects_unknown_month() {
        let parking = Parking {
            id: parking::Id::from(1),
            hourly_price: None,
        };
        assert!(Month::derive(parking, 2025, 13, &[], None).is_none());
    }
}
