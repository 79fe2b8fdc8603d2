//! Availability-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{GraphQLEnum, GraphQLScalar};
use service::domain;

use crate::api::scalar;

/// Unique identifier of an availability record.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "AvailabilityId",
    with = scalar::Via::<domain::availability::Id>,
)]
pub struct Id(domain::availability::Id);

/// Time of a day in `HH:MM` format, from `00:00` up to `24:00`.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TimeOfDay",
    with = scalar::Via::<domain::availability::TimeOfDay>,
)]
pub struct TimeOfDay(domain::availability::TimeOfDay);

/// How often an availability override repeats.
#[derive(Clone, Copy, Debug, Default, GraphQLEnum)]
#[graphql(name = "RecurrenceFrequency")]
pub enum Frequency {
    /// Doesn't repeat.
    #[default]
    Never,

    /// Every day, for a year.
    Daily,

    /// Every week, for a year.
    Weekly,

    /// Every other week, for a year.
    Biweekly,

    /// Every month, for a year.
    Monthly,
}

impl From<domain::recurrence::Frequency> for Frequency {
    fn from(frequency: domain::recurrence::Frequency) -> Self {
        use domain::recurrence::Frequency as F;
        match frequency {
            F::Never => Self::Never,
            F::Daily => Self::Daily,
            F::Weekly => Self::Weekly,
            F::Biweekly => Self::Biweekly,
            F::Monthly => Self::Monthly,
        }
    }
}

impl From<Frequency> for domain::recurrence::Frequency {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Never => Self::Never,
            Frequency::Daily => Self::Daily,
            Frequency::Weekly => Self::Weekly,
            Frequency::Biweekly => Self::Biweekly,
            Frequency::Monthly => Self::Monthly,
        }
    }
}
