//! Sequencing and validation of editable time [`Slot`]s.
//!
//! Editable [`Slot`]s are kept contiguous: moving a boundary of one [`Slot`]
//! moves the adjacent boundary of its neighbour too.

use common::Price;
use derive_more::{Display, Error};
use itertools::Itertools as _;

use crate::domain::{
    availability::TimeOfDay, draft::Slot, recurrence::Frequency,
};

/// Minimal duration of a [`Slot`], in minutes.
pub const MIN_DURATION: u16 = 60;

/// Granularity new [`Slot`] boundaries are snapped to, in minutes.
pub const STEP: u16 = 15;

/// Sets the start of the `i`-th [`Slot`], ending the previous one there.
///
/// Returns `false` if there is no such [`Slot`].
pub fn set_start(slots: &mut [Slot], i: usize, start: TimeOfDay) -> bool {
    let Some(slot) = slots.get_mut(i) else {
        return false;
    };
    slot.start_time = start;

    if let Some(prev) = i.checked_sub(1).and_then(|p| slots.get_mut(p)) {
        prev.end_time = start;
    }
    true
}

/// Sets the end of the `i`-th [`Slot`], starting the next one there.
///
/// Returns `false` if there is no such [`Slot`].
pub fn set_end(slots: &mut [Slot], i: usize, end: TimeOfDay) -> bool {
    let Some(slot) = slots.get_mut(i) else {
        return false;
    };
    slot.end_time = end;

    if let Some(next) = slots.get_mut(i + 1) {
        next.start_time = end;
    }
    true
}

/// Appends a new available [`Slot`] starting where the last one ends.
///
/// The new [`Slot`] lasts at least [`MIN_DURATION`], ends on a [`STEP`]
/// boundary and never later than [`TimeOfDay::LATEST_SLOT_END`].
pub fn push(slots: &mut Vec<Slot>, hourly_price: Option<Price>) {
    let start = slots.last().map_or(TimeOfDay::MIDNIGHT, |s| s.end_time);
    let end = start
        .saturating_add(MIN_DURATION)
        .ceil_to(STEP)
        .min(TimeOfDay::LATEST_SLOT_END);

    slots.push(Slot {
        start_time: start,
        end_time: end,
        is_available: true,
        hourly_price,
        recurrence: Frequency::Never,
    });
}

/// Removes the `i`-th [`Slot`], if any.
pub fn remove(slots: &mut Vec<Slot>, i: usize) -> Option<Slot> {
    (i < slots.len()).then(|| slots.remove(i))
}

/// Checks every [`Slot`], returning the [`Violation`]s found.
#[must_use]
pub fn violations(slots: &[Slot]) -> Vec<SlotViolation> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(slot, s)| {
            let minutes = s.start_time.minutes_until(s.end_time);
            let violation = if minutes <= 0 {
                Violation::EndNotAfterStart
            } else if minutes < i32::from(MIN_DURATION) {
                Violation::TooShort
            } else {
                return None;
            };
            Some(SlotViolation { slot, violation })
        })
        .collect()
}

/// Problem of a single [`Slot`] blocking it from being staged.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Violation {
    /// [`Slot`] doesn't end after it starts.
    #[display("end time must be after start time")]
    EndNotAfterStart,

    /// [`Slot`] is shorter than [`MIN_DURATION`].
    #[display("slot must last at least {MIN_DURATION} minutes")]
    TooShort,
}

/// [`Violation`] of a particular [`Slot`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("slot #{}: {violation}", slot + 1)]
pub struct SlotViolation {
    /// Index of the violating [`Slot`].
    pub slot: usize,

    /// [`Violation`] itself.
    pub violation: Violation,
}

/// Error of staging invalid [`Slot`]s.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("invalid slots: {}", _0.iter().join(", "))]
pub struct InvalidSlots(#[error(not(source))] pub Vec<SlotViolation>);
