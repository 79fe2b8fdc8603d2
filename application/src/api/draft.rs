//! Pending draft-related definitions.

use common::{Date, Price};
use juniper::GraphQLObject;
use service::domain::{self, draft, Plan};

use crate::api::{
    availability::{self, Frequency},
    editor::Slot,
};

/// Edits of a parking's availability pending in the current session.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "AvailabilityDraft")]
pub struct Draft {
    /// Indicator whether nothing is pending.
    pub is_empty: bool,

    /// Staged day updates, ordered by date.
    pub updates: Vec<DayUpdate>,

    /// Dates staged for deletion.
    pub delete_dates: Vec<Date>,

    /// Availability records staged for deletion.
    pub delete_ids: Vec<availability::Id>,
}

impl From<domain::Draft> for Draft {
    fn from(draft: domain::Draft) -> Self {
        Self {
            is_empty: draft.is_empty(),
            updates: draft
                .updates()
                .iter()
                .map(|(date, u)| DayUpdate::new(*date, u))
                .collect(),
            delete_dates: draft.delete_dates().iter().copied().collect(),
            delete_ids: draft
                .delete_ids()
                .iter()
                .copied()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Staged replacement of a single date's availability.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "DraftDayUpdate")]
pub struct DayUpdate {
    /// Date this update replaces the availability of.
    pub date: Date,

    /// Indicator whether the whole day is available, if `slots` are empty.
    pub whole_day_available: bool,

    /// Hourly price of the whole day, if `slots` are empty.
    pub whole_day_hourly_price: Option<Price>,

    /// How often the whole-day override repeats, if `slots` are empty.
    pub whole_day_recurrence: Frequency,

    /// Time slots of the day.
    pub slots: Vec<Slot>,
}

impl DayUpdate {
    /// Creates a new [`DayUpdate`] out of the provided [`draft::DayUpdate`].
    fn new(date: Date, update: &draft::DayUpdate) -> Self {
        Self {
            date,
            whole_day_available: update.whole_day_available,
            whole_day_hourly_price: update.whole_day_hourly_price,
            whole_day_recurrence: update.whole_day_recurrence.into(),
            slots: update.slots.iter().cloned().map(Into::into).collect(),
        }
    }
}

/// Outcome of committing an `AvailabilityDraft`.
#[derive(Clone, Debug, GraphQLObject)]
pub struct CommitResult {
    /// Availability records that were deleted.
    pub deleted_ids: Vec<availability::Id>,

    /// Dates whose availability was deleted.
    pub deleted_dates: Vec<Date>,

    /// Dates whose availability was replaced.
    pub replaced_dates: Vec<Date>,
}

impl From<Plan> for CommitResult {
    fn from(plan: Plan) -> Self {
        Self {
            replaced_dates: plan.replaced_dates().into_iter().collect(),
            deleted_ids: plan.delete_ids.into_iter().map(Into::into).collect(),
            deleted_dates: plan.delete_dates,
        }
    }
}
