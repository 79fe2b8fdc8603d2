//! Bulk replay [`Plan`] of a [`Draft`].

use std::collections::BTreeSet;

use common::{Date, Price};

use crate::domain::{
    availability::{self, Kind, Record, RecurrenceTag, TimeOfDay, Window},
    draft::{DayUpdate, Draft},
    parking,
    recurrence::{self, Frequency},
};

/// Sequence of persistence calls committing a [`Draft`].
///
/// Deletions go first, then every [`Upsert`] replaces the availability of
/// its dates.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Plan {
    /// IDs of availability [`Record`]s to delete.
    pub delete_ids: Vec<availability::Id>,

    /// [`Date`]s to delete all the availability [`Record`]s of.
    pub delete_dates: Vec<Date>,

    /// [`Upsert`]s to perform.
    pub upserts: Vec<Upsert>,
}

impl Plan {
    /// Builds the [`Plan`] committing the provided [`Draft`] of a parking.
    ///
    /// A recurring series skips the [`Date`]s having their own staged
    /// [`DayUpdate`] in the [`Draft`], so the latter always wins there.
    #[must_use]
    pub fn new(parking_id: parking::Id, draft: &Draft) -> Self {
        let updates = draft.updates();
        Self {
            delete_ids: draft.delete_ids().iter().copied().collect(),
            delete_dates: draft.delete_dates().iter().copied().collect(),
            upserts: updates
                .iter()
                .flat_map(|(date, update)| {
                    let mut upserts =
                        Upsert::of_update(parking_id, *date, update);
                    for u in &mut upserts {
                        u.dates.retain(|d| {
                            d == date || !updates.contains_key(d)
                        });
                    }
                    upserts
                })
                .collect(),
        }
    }

    /// Indicates whether this [`Plan`] does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delete_ids.is_empty()
            && self.delete_dates.is_empty()
            && self.upserts.is_empty()
    }

    /// Returns all the [`Date`]s whose availability is replaced by
    /// [`Upsert`]s, in order.
    #[must_use]
    pub fn replaced_dates(&self) -> BTreeSet<Date> {
        self.upserts
            .iter()
            .flat_map(|u| u.dates.iter().copied())
            .collect()
    }

    /// Returns all the [`Record`]s to insert by [`Upsert`]s.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.upserts.iter().flat_map(Upsert::records).collect()
    }
}

/// Upsert of a single time window repeated over several [`Date`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Upsert {
    /// ID of the parking to upsert the availability of.
    pub parking_id: parking::Id,

    /// [`Date`]s to apply this [`Upsert`] to.
    pub dates: Vec<Date>,

    /// [`Kind`] of the availability.
    pub kind: Kind,

    /// Hourly [`Price`] override, if any.
    pub hourly_price: Option<Price>,

    /// Start of the time slot, if it's not the whole day.
    pub start_time: Option<TimeOfDay>,

    /// End of the time slot, if it's not the whole day.
    pub end_time: Option<TimeOfDay>,

    /// [`RecurrenceTag`] grouping the created [`Record`]s, if they repeat.
    pub recurrence: Option<RecurrenceTag>,
}

impl Upsert {
    /// Returns the [`Upsert`]s staging the provided [`DayUpdate`] of the
    /// [`Date`].
    #[must_use]
    pub fn of_update(
        parking_id: parking::Id,
        date: Date,
        update: &DayUpdate,
    ) -> Vec<Self> {
        let series = |frequency: Frequency| {
            let dates = recurrence::expand(frequency, date, None, None);
            let tag = frequency.is_recurring().then(RecurrenceTag::generate);
            (dates, tag)
        };

        if update.slots.is_empty() {
            let (dates, recurrence) = series(update.whole_day_recurrence);
            return vec![Self {
                parking_id,
                dates,
                kind: if update.whole_day_available {
                    Kind::AlwaysAvailable
                } else {
                    Kind::Unavailable
                },
                hourly_price: update.whole_day_hourly_price,
                start_time: None,
                end_time: None,
                recurrence,
            }];
        }

        update
            .slots
            .iter()
            .map(|slot| {
                let (dates, recurrence) = series(slot.recurrence);
                Self {
                    parking_id,
                    dates,
                    kind: if slot.is_available {
                        Kind::TimeSlot
                    } else {
                        Kind::Unavailable
                    },
                    hourly_price: slot.hourly_price,
                    start_time: Some(slot.start_time),
                    end_time: Some(slot.end_time),
                    recurrence,
                }
            })
            .collect()
    }

    /// Returns the time [`Window`] of this [`Upsert`].
    #[must_use]
    pub fn window(&self) -> Window {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Window { start, end },
            _ => Window::WHOLE_DAY,
        }
    }

    /// Returns the unpersisted [`Record`]s this [`Upsert`] creates.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let window = self.window();
        self.dates
            .iter()
            .map(|date| Record {
                is_available: self.kind != Kind::Unavailable,
                hourly_price: self.hourly_price,
                recurrence: self.recurrence.clone(),
                ..Record::new(self.parking_id, *date, window)
            })
            .collect()
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, Price};

    use crate::domain::{
        availability::{self, Kind, TimeOfDay, Window},
        draft::{DayUpdate, Draft, Slot},
        parking,
        recurrence::Frequency,
    };

    use super::Plan;

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn tod(s: &str) -> TimeOfDay {
        TimeOfDay::from_str(s).unwrap()
    }

    #[test]
    fn plans_deletions_and_whole_days() {
        let mut draft = Draft::default();
        draft.merge_delete_day(date("2025-06-02"));
        draft.merge_delete_ids([availability::Id::from(7)], None);
        draft.merge_update(date("2025-06-01"), DayUpdate {
            whole_day_available: false,
            ..DayUpdate::default()
        });

        let plan = Plan::new(parking::Id::from(3), &draft);

        assert_eq!(plan.delete_ids, [availability::Id::from(7)]);
        assert_eq!(plan.delete_dates, [date("2025-06-02")]);
        assert_eq!(plan.upserts.len(), 1);

        let upsert = &plan.upserts[0];
        assert_eq!(upsert.kind, Kind::Unavailable);
        assert_eq!(upsert.dates, [date("2025-06-01")]);
        assert_eq!(upsert.window(), Window::WHOLE_DAY);
        assert_eq!(upsert.recurrence, None);

        let records = plan.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_whole_day());
        assert!(!records[0].is_available);
    }

    #[test]
    fn expands_recurring_slots() {
        let mut draft = Draft::default();
        draft.merge_update(date("2025-03-10"), DayUpdate {
            slots: vec![
                Slot {
                    start_time: tod("08:00"),
                    end_time: tod("12:00"),
                    is_available: true,
                    hourly_price: Some(Price::from(6)),
                    recurrence: Frequency::Weekly,
                },
                Slot {
                    start_time: tod("12:00"),
                    end_time: tod("18:00"),
                    is_available: false,
                    hourly_price: None,
                    recurrence: Frequency::Never,
                },
            ],
            ..DayUpdate::default()
        });

        let plan = Plan::new(parking::Id::from(3), &draft);

        assert_eq!(plan.upserts.len(), 2);
        let (weekly, once) = (&plan.upserts[0], &plan.upserts[1]);
        assert_eq!(weekly.kind, Kind::TimeSlot);
        assert_eq!(weekly.dates.len(), 52);
        assert_eq!(weekly.start_time, Some(tod("08:00")));
        assert!(weekly.recurrence.is_some());
        assert_eq!(once.kind, Kind::Unavailable);
        assert_eq!(once.dates, [date("2025-03-10")]);
        assert!(once.recurrence.is_none());

        assert_eq!(plan.replaced_dates().len(), 52);
        assert_eq!(plan.records().len(), 53);
        assert!(plan
            .records()
            .iter()
            .filter(|r| r.is_available)
            .all(|r| r.recurrence == weekly.recurrence));
    }

    #[test]
    fn series_skips_dates_with_own_update() {
        let mut draft = Draft::default();
        draft.merge_update(date("2025-03-03"), DayUpdate {
            whole_day_available: false,
            whole_day_recurrence: Frequency::Weekly,
            ..DayUpdate::default()
        });
        draft.merge_update(date("2025-03-10"), DayUpdate {
            whole_day_hourly_price: Some(Price::from(9)),
            ..DayUpdate::default()
        });

        let plan = Plan::new(parking::Id::from(3), &draft);

        assert_eq!(plan.upserts.len(), 2);
        let (weekly, single) = (&plan.upserts[0], &plan.upserts[1]);
        assert_eq!(weekly.dates.len(), 51);
        assert!(!weekly.dates.contains(&date("2025-03-10")));
        assert_eq!(single.dates, [date("2025-03-10")]);
        assert_eq!(
            plan.records()
                .iter()
                .filter(|r| r.date() == date("2025-03-10"))
                .count(),
            1,
        );
    }

    #[test]
    fn empty_draft_plans_nothing() {
        assert!(Plan::new(parking::Id::from(1), &Draft::default()).is_empty());
    }
}
