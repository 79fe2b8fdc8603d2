//! Availability editor-related definitions.

use common::{Date, Price};
use juniper::{GraphQLEnum, GraphQLInputObject, GraphQLObject};
use service::domain::{self, draft, editor};

use crate::api::availability::{Frequency, TimeOfDay};

/// Editor of the availability of a day (or a range of days).
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "DayEditor")]
pub struct DayEditor {
    /// First edited date.
    pub first_date: Date,

    /// Last edited date, same as `firstDate` for a single day.
    pub last_date: Date,

    /// Source this `DayEditor` was loaded from.
    pub origin: Origin,

    /// Indicator whether deleting the day requires choosing a
    /// `DeletionScope`.
    pub is_recurring: bool,

    /// Whole-day override, if the day is not split into time slots.
    pub whole_day: Option<WholeDay>,

    /// Time slots of the day, in order.
    pub slots: Vec<Slot>,
}

impl From<domain::DayEditor> for DayEditor {
    fn from(view: domain::DayEditor) -> Self {
        let (first_date, last_date) = match view.scope() {
            editor::Scope::Day(d) => (d, d),
            editor::Scope::Range { first, last } => (first, last),
        };
        let (whole_day, slots) = match view.mode() {
            editor::DayEditMode::WholeDay(w) => (Some((*w).into()), vec![]),
            editor::DayEditMode::TimeSlots(s) => {
                (None, s.iter().cloned().map(Into::into).collect())
            }
        };
        Self {
            first_date,
            last_date,
            origin: view.origin().into(),
            is_recurring: view.is_recurring(),
            whole_day,
            slots,
        }
    }
}

/// Source a `DayEditor` was loaded from.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "DayEditorOrigin")]
pub enum Origin {
    /// Edit staged in the current draft.
    Staged,

    /// Deletion staged in the current draft.
    StagedDeletion,

    /// No persisted availability.
    NoRecords,

    /// Single persisted whole-day override.
    WholeDayRecord,

    /// Persisted time slots.
    TimeSlotRecords,
}

impl From<editor::Origin> for Origin {
    fn from(origin: editor::Origin) -> Self {
        use editor::Origin as O;
        match origin {
            O::Staged => Self::Staged,
            O::StagedDeletion => Self::StagedDeletion,
            O::NoRecords => Self::NoRecords,
            O::WholeDayRecord => Self::WholeDayRecord,
            O::TimeSlotRecords => Self::TimeSlotRecords,
        }
    }
}

/// Whole-day availability override.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct WholeDay {
    /// Indicator whether the whole day is available.
    pub is_available: bool,

    /// Hourly price of the day, if any.
    pub hourly_price: Option<Price>,

    /// How often this override repeats.
    pub recurrence: Frequency,
}

impl From<editor::WholeDay> for WholeDay {
    fn from(w: editor::WholeDay) -> Self {
        Self {
            is_available: w.is_available,
            hourly_price: w.hourly_price,
            recurrence: w.recurrence.into(),
        }
    }
}

/// Time slot of a day.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct Slot {
    /// Start of this `Slot`.
    pub start_time: TimeOfDay,

    /// End of this `Slot`.
    pub end_time: TimeOfDay,

    /// Indicator whether this `Slot` is available.
    pub is_available: bool,

    /// Hourly price of this `Slot`, if any.
    pub hourly_price: Option<Price>,

    /// How often this `Slot` repeats.
    pub recurrence: Frequency,
}

impl From<draft::Slot> for Slot {
    fn from(s: draft::Slot) -> Self {
        Self {
            start_time: s.start_time.into(),
            end_time: s.end_time.into(),
            is_available: s.is_available,
            hourly_price: s.hourly_price,
            recurrence: s.recurrence.into(),
        }
    }
}

/// Edit of a day's availability.
///
/// Non-empty `slots` split the day into time slots, otherwise the whole day
/// is overridden.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct DayEditInput {
    /// Indicator whether the whole day is available.
    ///
    /// Defaults to `true`.
    pub is_available: Option<bool>,

    /// Hourly price of the whole day, if any.
    pub hourly_price: Option<Price>,

    /// How often the whole-day override repeats.
    ///
    /// Defaults to `NEVER`.
    pub recurrence: Option<Frequency>,

    /// Time slots of the day.
    pub slots: Option<Vec<SlotInput>>,
}

impl From<DayEditInput> for editor::DayEditMode {
    fn from(input: DayEditInput) -> Self {
        let DayEditInput {
            is_available,
            hourly_price,
            recurrence,
            slots,
        } = input;

        match slots {
            Some(slots) if !slots.is_empty() => {
                Self::TimeSlots(slots.into_iter().map(Into::into).collect())
            }
            Some(_) | None => Self::WholeDay(editor::WholeDay {
                is_available: is_available.unwrap_or(true),
                hourly_price,
                recurrence: recurrence.unwrap_or_default().into(),
            }),
        }
    }
}

/// Time slot of a `DayEditInput`.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
pub struct SlotInput {
    /// Start of the slot.
    pub start_time: TimeOfDay,

    /// End of the slot.
    pub end_time: TimeOfDay,

    /// Indicator whether the slot is available.
    ///
    /// Defaults to `true`.
    pub is_available: Option<bool>,

    /// Hourly price of the slot, if any.
    pub hourly_price: Option<Price>,

    /// How often the slot repeats.
    ///
    /// Defaults to `NEVER`.
    pub recurrence: Option<Frequency>,
}

impl From<SlotInput> for draft::Slot {
    fn from(input: SlotInput) -> Self {
        Self {
            start_time: input.start_time.into(),
            end_time: input.end_time.into(),
            is_available: input.is_available.unwrap_or(true),
            hourly_price: input.hourly_price,
            recurrence: input.recurrence.unwrap_or_default().into(),
        }
    }
}

/// Extent of deleting a day belonging to a recurring series.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum DeletionScope {
    /// Only the day itself.
    ThisDay,

    /// The day and all the future occurrences of its series.
    ThisAndFuture,
}

impl From<DeletionScope> for editor::deletion::Scope {
    fn from(scope: DeletionScope) -> Self {
        match scope {
            DeletionScope::ThisDay => Self::ThisDay,
            DeletionScope::ThisAndFuture => Self::ThisAndFuture,
        }
    }
}

/// Returns the [`editor::Scope`] spanning from the `date` to the `last_date`
/// (if any).
#[must_use]
pub fn scope(date: Date, last_date: Option<Date>) -> editor::Scope {
    last_date.map_or(editor::Scope::Day(date), |last| {
        editor::Scope::between(date, last)
    })
}
