//! Calendar-related definitions.

use common::{Date, Price};
use juniper::{GraphQLEnum, GraphQLObject};
use service::read;

/// Month of a parking availability calendar.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "CalendarMonth")]
pub struct Month {
    /// Year of this `CalendarMonth`.
    pub year: i32,

    /// Number (`1..=12`) of this `CalendarMonth`.
    pub month: i32,

    /// Days of this `CalendarMonth` in order.
    pub days: Vec<Day>,
}

impl From<read::Month> for Month {
    fn from(month: read::Month) -> Self {
        Self {
            year: month.year,
            month: month.month.into(),
            days: month.days.into_iter().map(Into::into).collect(),
        }
    }
}

/// Day of a parking availability calendar.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "CalendarDay")]
pub struct Day {
    /// Date of this `CalendarDay`.
    pub date: Date,

    /// Display state of this `CalendarDay`.
    pub state: DayState,

    /// Representative hourly price of this `CalendarDay`, if any.
    pub price: Option<Price>,
}

impl From<read::Day> for Day {
    fn from(day: read::Day) -> Self {
        Self {
            date: day.date,
            state: day.state.into(),
            price: day.price,
        }
    }
}

/// Display state of a `CalendarDay`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "CalendarDayState")]
pub enum DayState {
    /// Available at the base price.
    Default,

    /// Available as a whole at an overridden price.
    CustomPrice,

    /// Available in time slots, some of them at an overridden price.
    TimeSlots,

    /// Unavailable as a whole.
    Unavailable,

    /// Unavailable in some of its time slots.
    TimeSlotUnavailable,
}

impl From<read::DayState> for DayState {
    fn from(state: read::DayState) -> Self {
        use read::DayState as S;
        match state {
            S::Default => Self::Default,
            S::CustomPrice => Self::CustomPrice,
            S::TimeSlots => Self::TimeSlots,
            S::Unavailable => Self::Unavailable,
            S::TimeSlotUnavailable => Self::TimeSlotUnavailable,
        }
    }
}
