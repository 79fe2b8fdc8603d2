//! [`Draft`] of pending availability edits.

use std::collections::{BTreeMap, BTreeSet};

use common::{unit, Date, DateTimeOf, Price};
use derive_more::{Display, From, FromStr};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use uuid::Uuid;

use crate::domain::{
    availability::{self, Record, TimeOfDay, Window},
    parking,
    recurrence::Frequency,
};

/// Prefix of the storage key a [`Draft`] is stored under, followed by the
/// parking ID.
pub const STORAGE_KEY_PREFIX: &str = "pending-availability-";

/// Uncommitted availability edits of a single parking, staged until they're
/// committed in bulk.
///
/// A date is never both updated and deleted: every merge removes the date from
/// the opposite set.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    /// Whole-day replacements keyed by their [`Date`].
    updates: BTreeMap<Date, DayUpdate>,

    /// [`Date`]s to remove all the availability [`Record`]s of.
    delete_dates: BTreeSet<Date>,

    /// IDs of availability [`Record`]s to remove.
    delete_ids: BTreeSet<availability::Id>,
}

impl Draft {
    /// Applies the provided [`Merge`] to this [`Draft`].
    pub fn merge(&mut self, merge: Merge) {
        match merge {
            Merge::Update(date, update) => self.merge_update(date, update),
            Merge::DeleteDay(date) => self.merge_delete_day(date),
            Merge::DeleteIds(ids, unstage) => {
                self.merge_delete_ids(ids, unstage);
            }
        }
    }

    /// Stages the provided [`DayUpdate`] for the [`Date`], replacing any
    /// previously staged one and cancelling its staged deletion.
    pub fn merge_update(&mut self, date: Date, update: DayUpdate) {
        _ = self.delete_dates.remove(&date);
        _ = self.updates.insert(date, update);
    }

    /// Stages the deletion of the whole [`Date`], dropping its staged update.
    pub fn merge_delete_day(&mut self, date: Date) {
        _ = self.updates.remove(&date);
        _ = self.delete_dates.insert(date);
    }

    /// Stages the deletion of the provided [`Record`]s, optionally dropping a
    /// staged update of the `unstage` [`Date`].
    pub fn merge_delete_ids(
        &mut self,
        ids: impl IntoIterator<Item = availability::Id>,
        unstage: Option<Date>,
    ) {
        self.delete_ids.extend(ids);
        if let Some(date) = unstage {
            _ = self.updates.remove(&date);
        }
    }

    /// Indicates whether this [`Draft`] stages nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
            && self.delete_dates.is_empty()
            && self.delete_ids.is_empty()
    }

    /// Returns the [`DayUpdate`] staged for the provided [`Date`], if any.
    #[must_use]
    pub fn update(&self, date: Date) -> Option<&DayUpdate> {
        self.updates.get(&date)
    }

    /// Indicates whether the provided [`Date`] is staged for deletion.
    #[must_use]
    pub fn is_deleted(&self, date: Date) -> bool {
        self.delete_dates.contains(&date)
    }

    /// Indicates whether the provided [`Record`] is staged for deletion.
    #[must_use]
    pub fn is_record_deleted(&self, id: availability::Id) -> bool {
        self.delete_ids.contains(&id)
    }

    /// Returns all the staged [`DayUpdate`]s.
    #[must_use]
    pub fn updates(&self) -> &BTreeMap<Date, DayUpdate> {
        &self.updates
    }

    /// Returns all the [`Date`]s staged for deletion.
    #[must_use]
    pub fn delete_dates(&self) -> &BTreeSet<Date> {
        &self.delete_dates
    }

    /// Returns IDs of all the [`Record`]s staged for deletion.
    #[must_use]
    pub fn delete_ids(&self) -> &BTreeSet<availability::Id> {
        &self.delete_ids
    }
}

/// Staged replacement of a single date's availability.
///
/// No [`Slot`]s means the whole day is overridden by the `whole_day_*`
/// fields.
#[derive(
    Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault,
)]
#[serde(rename_all = "camelCase", default)]
pub struct DayUpdate {
    /// Availability of the whole day.
    #[default(true)]
    pub whole_day_available: bool,

    /// Hourly [`Price`] of the whole day.
    pub whole_day_hourly_price: Option<Price>,

    /// Repetition of the whole-day override.
    #[serde(rename = "wholeDayRipetizione")]
    pub whole_day_recurrence: Frequency,

    /// Time [`Slot`]s partitioning the day.
    pub slots: Vec<Slot>,
}

impl DayUpdate {
    /// Returns the unpersisted [`Record`]s this [`DayUpdate`] results in on
    /// the provided [`Date`].
    #[must_use]
    pub fn records(&self, parking_id: parking::Id, date: Date) -> Vec<Record> {
        if self.slots.is_empty() {
            return vec![Record {
                is_available: self.whole_day_available,
                hourly_price: self.whole_day_hourly_price,
                ..Record::new(parking_id, date, Window::WHOLE_DAY)
            }];
        }
        self.slots
            .iter()
            .map(|s| Record {
                is_available: s.is_available,
                hourly_price: s.hourly_price,
                ..Record::new(parking_id, date, s.window())
            })
            .collect()
    }
}

/// Staged time slot of a [`DayUpdate`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Start of this [`Slot`].
    pub start_time: TimeOfDay,

    /// End of this [`Slot`].
    pub end_time: TimeOfDay,

    /// Availability within this [`Slot`].
    #[serde(default = "default_available")]
    pub is_available: bool,

    /// Hourly [`Price`] within this [`Slot`].
    #[serde(default)]
    pub hourly_price: Option<Price>,

    /// Repetition of this [`Slot`].
    #[serde(rename = "ripetizione", default)]
    pub recurrence: Frequency,
}

impl Slot {
    /// Returns the time [`Window`] of this [`Slot`].
    #[must_use]
    pub fn window(&self) -> Window {
        Window {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// Default availability of a deserialized [`Slot`].
fn default_available() -> bool {
    true
}

/// Single modification of a [`Draft`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Merge {
    /// Stages a [`DayUpdate`] for the [`Date`].
    Update(Date, DayUpdate),

    /// Stages the deletion of the whole [`Date`].
    DeleteDay(Date),

    /// Stages the deletion of [`Record`]s, optionally dropping a staged update
    /// of the [`Date`].
    DeleteIds(Vec<availability::Id>, Option<Date>),
}

/// Atomic batch of [`Merge`]s upon a single [`Draft`].
#[derive(Clone, Debug)]
pub struct Change {
    /// [`Key`] of the [`Draft`] to change.
    pub key: Key,

    /// [`Merge`]s to apply in order.
    pub merges: Vec<Merge>,
}

/// Key a [`Draft`] is stored under.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// [`SessionId`] of the editing session owning the [`Draft`].
    pub session: SessionId,

    /// ID of the parking the [`Draft`] edits.
    pub parking: parking::Id,
}

impl Key {
    /// Returns the storage key of the [`Draft`] within its session.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_KEY_PREFIX}{}", self.parking)
    }
}

/// ID of an editing session [`Draft`]s are scoped to.
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
    PartialEq,
    Serialize,
)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random [`SessionId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// [`DateTimeOf`] a [`Draft`] was last touched at.
pub type TouchDateTime = DateTimeOf<(Draft, unit::Touch)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, Price};

    use crate::domain::{availability, recurrence::Frequency};

    use super::{DayUpdate, Draft, Merge, Slot};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn priced(price: u32) -> DayUpdate {
        DayUpdate {
            whole_day_hourly_price: Some(Price::from(price)),
            ..DayUpdate::default()
        }
    }

    #[test]
    fn update_then_delete_keeps_deletion_only() {
        let mut draft = Draft::default();
        draft.merge(Merge::Update(date("2025-06-01"), priced(7)));
        draft.merge(Merge::DeleteDay(date("2025-06-01")));

        assert!(draft.update(date("2025-06-01")).is_none());
        assert!(draft.is_deleted(date("2025-06-01")));
    }

    #[test]
    fn date_is_never_both_updated_and_deleted() {
        let d = date("2025-06-01");
        let ops = [
            Merge::Update(d, priced(5)),
            Merge::DeleteDay(d),
            Merge::DeleteDay(d),
            Merge::Update(d, priced(6)),
            Merge::Update(d, priced(7)),
            Merge::DeleteDay(d),
            Merge::Update(d, priced(8)),
        ];

        let mut draft = Draft::default();
        for op in ops {
            draft.merge(op);
            assert!(
                !(draft.update(d).is_some() && draft.is_deleted(d)),
                "{draft:?}",
            );
        }
        assert_eq!(draft.update(d), Some(&priced(8)));
    }

    #[test]
    fn deleting_day_twice_is_idempotent() {
        let mut draft = Draft::default();
        draft.merge_delete_day(date("2025-06-01"));
        draft.merge_delete_day(date("2025-06-01"));

        assert_eq!(draft.delete_dates().len(), 1);
        assert_eq!(
            serde_json::to_value(&draft).unwrap()["deleteDates"],
            serde_json::json!(["2025-06-01"]),
        );
    }

    #[test]
    fn deleting_ids_unstages_update() {
        let mut draft = Draft::default();
        draft.merge_update(date("2025-06-01"), priced(7));
        draft.merge_update(date("2025-06-08"), priced(7));
        draft.merge_delete_ids(
            [availability::Id::from(3), availability::Id::from(4)],
            Some(date("2025-06-01")),
        );
        draft.merge_delete_ids([availability::Id::from(3)], None);

        assert!(draft.update(date("2025-06-01")).is_none());
        assert!(draft.update(date("2025-06-08")).is_some());
        assert_eq!(draft.delete_ids().len(), 2);
        assert!(draft.is_record_deleted(availability::Id::from(4)));
    }

    #[test]
    fn emptiness() {
        let mut draft = Draft::default();
        assert!(draft.is_empty());

        draft.merge_delete_ids([availability::Id::from(1)], None);
        assert!(!draft.is_empty());
    }

    #[test]
    fn serializes_in_storage_shape() {
        let mut draft = Draft::default();
        draft.merge_update(date("2025-06-01"), DayUpdate {
            whole_day_available: true,
            whole_day_hourly_price: None,
            whole_day_recurrence: Frequency::Never,
            slots: vec![Slot {
                start_time: "08:00".parse().unwrap(),
                end_time: "12:00".parse().unwrap(),
                is_available: false,
                hourly_price: Some(Price::from(4)),
                recurrence: Frequency::Weekly,
            }],
        });
        draft.merge_delete_ids([availability::Id::from(9)], None);

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "updates": {
                    "2025-06-01": {
                        "wholeDayAvailable": true,
                        "wholeDayHourlyPrice": null,
                        "wholeDayRipetizione": "never",
                        "slots": [{
                            "startTime": "08:00",
                            "endTime": "12:00",
                            "isAvailable": false,
                            "hourlyPrice": 4.0,
                            "ripetizione": "weekly",
                        }],
                    },
                },
                "deleteDates": [],
                "deleteIds": [9],
            }),
        );
        assert_eq!(serde_json::from_value::<Draft>(json).unwrap(), draft);
    }

    #[test]
    fn deserializes_partial_blobs() {
        let draft: Draft = serde_json::from_str(
            r#"{"updates":{"2025-06-01":{"wholeDayRipetizione":null,
                "slots":[{"startTime":"08:00","endTime":"09:00",
                          "ripetizione":"fortnightly"}]}}}"#,
        )
        .unwrap();

        let update = draft.update(date("2025-06-01")).unwrap();
        assert!(update.whole_day_available);
        assert_eq!(update.whole_day_recurrence, Frequency::Never);
        assert_eq!(update.slots[0].recurrence, Frequency::Never);
        assert!(update.slots[0].is_available);
        assert!(draft.delete_dates().is_empty());
    }
}
