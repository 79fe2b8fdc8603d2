//! Resolution of recurring series to delete.

use std::collections::HashSet;

use common::Date;
use derive_more::{Display, Error};

use crate::domain::availability::{self, Record};

/// Extent of deleting a day belonging to a recurring series.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Only the day itself.
    ThisDay,

    /// The day and all the future occurrences of its series.
    ThisAndFuture,
}

/// Error of deleting a day of a recurring series without choosing its
/// [`Scope`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("day belongs to a recurring series, deletion scope is required")]
pub struct ScopeRequired;

/// Returns IDs of the persisted `parking_records` sharing the recurrence tag
/// of the `day_records`, starting `from` the provided [`Date`].
///
/// Empty if none of the `day_records` is tagged.
#[must_use]
pub fn tagged_series(
    day_records: &[Record],
    parking_records: &[Record],
    from: Date,
) -> Vec<availability::Id> {
    let Some(tag) = day_records.iter().find_map(Record::recurrence) else {
        return vec![];
    };
    ids_from(parking_records, from, |r| r.recurrence() == Some(tag))
}

/// Returns IDs of the persisted untagged `parking_records` repeating the
/// start time, end time and availability of any of the untagged
/// `day_records`, starting `from` the provided [`Date`].
///
/// Covers [`Record`]s persisted before series were tagged.
#[must_use]
pub fn legacy_series(
    day_records: &[Record],
    parking_records: &[Record],
    from: Date,
) -> Vec<availability::Id> {
    let signatures = day_records
        .iter()
        .filter(|r| r.recurrence().is_none())
        .map(Record::signature)
        .collect::<HashSet<_>>();
    if signatures.is_empty() {
        return vec![];
    }
    ids_from(parking_records, from, |r| {
        r.recurrence().is_none() && signatures.contains(&r.signature())
    })
}

/// Collects IDs of the persisted [`Record`]s dated `from` the provided
/// [`Date`] and satisfying the `filter`.
fn ids_from(
    records: &[Record],
    from: Date,
    filter: impl Fn(&Record) -> bool,
) -> Vec<availability::Id> {
    records
        .iter()
        .filter(|&r| r.date() >= from && filter(r))
        .filter_map(|r| r.id)
        .collect()
}
