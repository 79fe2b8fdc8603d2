//! Availability [`DayEditor`] definitions.

pub mod deletion;
pub mod slots;

use std::iter;

use common::{Date, Price};

use crate::domain::{
    availability::{Record, TimeOfDay},
    draft::{DayUpdate, Draft, Merge, Slot},
    recurrence::Frequency,
};

pub use self::{
    deletion::ScopeRequired,
    slots::{InvalidSlots, SlotViolation, Violation},
};

/// Dates a [`DayEditor`] edits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Single [`Date`].
    Day(Date),

    /// Contiguous range of [`Date`]s, both ends inclusive.
    Range {
        /// First [`Date`] of the range.
        first: Date,

        /// Last [`Date`] of the range.
        last: Date,
    },
}

impl Scope {
    /// Creates a new [`Scope`] spanning from one [`Date`] to another, in any
    /// order.
    #[must_use]
    pub fn between(a: Date, b: Date) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => Self::Day(a),
            std::cmp::Ordering::Less => Self::Range { first: a, last: b },
            std::cmp::Ordering::Greater => Self::Range { first: b, last: a },
        }
    }

    /// Returns the first [`Date`] of this [`Scope`].
    #[must_use]
    pub fn first(self) -> Date {
        match self {
            Self::Day(d) | Self::Range { first: d, .. } => d,
        }
    }

    /// Returns all the [`Date`]s of this [`Scope`] in order.
    #[must_use]
    pub fn dates(self) -> Vec<Date> {
        match self {
            Self::Day(d) => vec![d],
            Self::Range { first, last } => first.through(last).collect(),
        }
    }
}

/// Whole-day override being edited.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WholeDay {
    /// Availability of the whole day.
    pub is_available: bool,

    /// Hourly [`Price`] of the whole day.
    pub hourly_price: Option<Price>,

    /// Repetition of this override.
    pub recurrence: Frequency,
}

/// How a day is being edited.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DayEditMode {
    /// The day is overridden as a whole.
    WholeDay(WholeDay),

    /// The day is split into contiguous time [`Slot`]s.
    TimeSlots(Vec<Slot>),
}

impl DayEditMode {
    /// Indicates whether any repetition other than [`Frequency::Never`] is set.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        match self {
            Self::WholeDay(w) => w.recurrence.is_recurring(),
            Self::TimeSlots(slots) => {
                slots.iter().any(|s| s.recurrence.is_recurring())
            }
        }
    }
}

impl From<&DayUpdate> for DayEditMode {
    fn from(update: &DayUpdate) -> Self {
        if update.slots.is_empty() {
            Self::WholeDay(WholeDay {
                is_available: update.whole_day_available,
                hourly_price: update.whole_day_hourly_price,
                recurrence: update.whole_day_recurrence,
            })
        } else {
            Self::TimeSlots(update.slots.clone())
        }
    }
}

impl From<&DayEditMode> for DayUpdate {
    fn from(mode: &DayEditMode) -> Self {
        match mode {
            DayEditMode::WholeDay(w) => Self {
                whole_day_available: w.is_available,
                whole_day_hourly_price: w.hourly_price,
                whole_day_recurrence: w.recurrence,
                slots: vec![],
            },
            DayEditMode::TimeSlots(slots) => Self {
                slots: slots.clone(),
                ..Self::default()
            },
        }
    }
}

/// Source a [`DayEditor`] was loaded from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    /// Staged [`DayUpdate`].
    Staged,

    /// Staged deletion of the day.
    StagedDeletion,

    /// No availability [`Record`]s.
    NoRecords,

    /// Single whole-day [`Record`].
    WholeDayRecord,

    /// Time slot [`Record`]s.
    TimeSlotRecords,
}

/// Editor of the availability of a single day, or of a range of days at once.
///
/// Never touches persisted availability directly: its outcome is a list of
/// [`Merge`]s to stage into a [`Draft`].
#[derive(Clone, Debug)]
pub struct DayEditor {
    /// [`Scope`] being edited.
    scope: Scope,

    /// Base hourly price of the parking.
    base_price: Option<Price>,

    /// Persisted [`Record`]s of the first [`Date`] in the [`Scope`].
    records: Vec<Record>,

    /// [`Origin`] of the initial [`DayEditMode`].
    origin: Origin,

    /// Current [`DayEditMode`].
    mode: DayEditMode,
}

impl DayEditor {
    /// Loads a [`DayEditor`] for the provided [`Scope`].
    ///
    /// The initial view of the first [`Date`] is resolved in order from:
    /// its staged update, its staged deletion (whole day available at the base
    /// price), absence of `day_records` (same), a single whole-day
    /// [`Record`], and time slots, one per [`Record`].
    ///
    /// `day_records` staged for deletion by their IDs are ignored.
    #[must_use]
    pub fn load(
        scope: Scope,
        mut day_records: Vec<Record>,
        draft: Option<&Draft>,
        base_price: Option<Price>,
    ) -> Self {
        let date = scope.first();
        if let Some(draft) = draft {
            day_records.retain(|r| {
                !r.id.is_some_and(|id| draft.is_record_deleted(id))
            });
        }
        let base_day = DayEditMode::WholeDay(WholeDay {
            is_available: true,
            hourly_price: base_price,
            recurrence: Frequency::Never,
        });

        let (origin, mode) = if let Some(update) =
            draft.and_then(|d| d.update(date))
        {
            (Origin::Staged, DayEditMode::from(update))
        } else if draft.is_some_and(|d| d.is_deleted(date)) {
            (Origin::StagedDeletion, base_day)
        } else {
            match day_records.as_slice() {
                [] => (Origin::NoRecords, base_day),
                [single] if single.is_whole_day() => (
                    Origin::WholeDayRecord,
                    DayEditMode::WholeDay(WholeDay {
                        is_available: single.is_available,
                        hourly_price: single.hourly_price.or(base_price),
                        recurrence: Frequency::Never,
                    }),
                ),
                many => {
                    let mut many = many.iter().collect::<Vec<_>>();
                    many.sort_by_key(|r| r.starts_at);
                    let slots = many
                        .into_iter()
                        .map(|r| Slot {
                            start_time: r.start_time(),
                            end_time: r.end_time(),
                            is_available: r.is_available,
                            hourly_price: r.hourly_price.or(base_price),
                            recurrence: Frequency::Never,
                        })
                        .collect();
                    (Origin::TimeSlotRecords, DayEditMode::TimeSlots(slots))
                }
            }
        };

        Self {
            scope,
            base_price,
            records: day_records,
            origin,
            mode,
        }
    }

    /// Returns the [`Scope`] of this [`DayEditor`].
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the [`Origin`] this [`DayEditor`] was loaded from.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Returns the current [`DayEditMode`].
    #[must_use]
    pub fn mode(&self) -> &DayEditMode {
        &self.mode
    }

    /// Returns the persisted [`Record`]s of the edited day.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Overrides the whole day, leaving time slots mode if needed.
    pub fn set_whole_day(&mut self, whole_day: WholeDay) {
        self.mode = DayEditMode::WholeDay(whole_day);
    }

    /// Switches to time slots mode, starting with a single new slot.
    ///
    /// No-op if already in time slots mode.
    pub fn switch_to_time_slots(&mut self) {
        if let DayEditMode::WholeDay(w) = self.mode {
            let mut new = vec![];
            slots::push(&mut new, w.hourly_price.or(self.base_price));
            self.mode = DayEditMode::TimeSlots(new);
        }
    }

    /// Replaces the whole [`DayEditMode`].
    pub fn set_mode(&mut self, mode: DayEditMode) {
        self.mode = mode;
    }

    /// Sets the start of the `i`-th slot, keeping slots contiguous.
    ///
    /// Returns `false` if there is no such slot.
    pub fn set_slot_start(&mut self, i: usize, start: TimeOfDay) -> bool {
        self.slots_mut().is_some_and(|s| slots::set_start(s, i, start))
    }

    /// Sets the end of the `i`-th slot, keeping slots contiguous.
    ///
    /// Returns `false` if there is no such slot.
    pub fn set_slot_end(&mut self, i: usize, end: TimeOfDay) -> bool {
        self.slots_mut().is_some_and(|s| slots::set_end(s, i, end))
    }

    /// Appends a new slot right after the last one, switching to time slots
    /// mode if needed.
    pub fn push_slot(&mut self) {
        if matches!(self.mode, DayEditMode::WholeDay(_)) {
            self.switch_to_time_slots();
            return;
        }
        let price = self.base_price;
        if let Some(s) = self.slots_mut() {
            slots::push(s, price);
        }
    }

    /// Removes the `i`-th slot, if any.
    pub fn remove_slot(&mut self, i: usize) -> Option<Slot> {
        self.slots_mut().and_then(|s| slots::remove(s, i))
    }

    /// Returns the current [`SlotViolation`]s blocking [`DayEditor::save()`].
    #[must_use]
    pub fn violations(&self) -> Vec<SlotViolation> {
        match &self.mode {
            DayEditMode::WholeDay(_) => vec![],
            DayEditMode::TimeSlots(slots) => slots::violations(slots),
        }
    }

    /// Returns [`Merge`]s staging the current [`DayEditMode`] for every
    /// [`Date`] of the [`Scope`].
    ///
    /// # Errors
    ///
    /// With [`InvalidSlots`] if any [`SlotViolation`] exists.
    pub fn save(&self) -> Result<Vec<Merge>, InvalidSlots> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(InvalidSlots(violations));
        }

        let update = DayUpdate::from(&self.mode);
        Ok(self
            .scope
            .dates()
            .into_iter()
            .map(|date| Merge::Update(date, update.clone()))
            .collect())
    }

    /// Indicates whether deleting requires choosing a [`deletion::Scope`],
    /// because the day belongs to a recurring series (or is being made
    /// recurring).
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.records.iter().any(|r| r.recurrence().is_some())
            || self.mode.is_recurring()
    }

    /// Returns [`Merge`]s staging deletion of the edited day.
    ///
    /// Days not belonging to a recurring series are deleted one by one (every
    /// [`Date`] of the [`Scope`]). Otherwise the `scope` decides, and
    /// [`deletion::Scope::ThisAndFuture`] stages deletion of all the
    /// `parking_records` of the series starting from the first [`Date`] of
    /// the [`Scope`]. If no such [`Record`]s are found, that day alone is
    /// deleted. The rest of a [`Scope::Range`] is deleted day by day.
    ///
    /// # Errors
    ///
    /// With [`ScopeRequired`] if the day is recurring and no `scope` is
    /// provided.
    pub fn delete(
        &self,
        parking_records: &[Record],
        scope: Option<deletion::Scope>,
    ) -> Result<Vec<Merge>, ScopeRequired> {
        let one_by_one = || {
            self.scope
                .dates()
                .into_iter()
                .map(Merge::DeleteDay)
                .collect::<Vec<_>>()
        };
        if !self.is_recurring() {
            return Ok(one_by_one());
        }

        match scope.ok_or(ScopeRequired)? {
            deletion::Scope::ThisDay => Ok(one_by_one()),
            deletion::Scope::ThisAndFuture => {
                let date = self.scope.first();
                let records = self.records.as_slice();
                let mut ids =
                    deletion::tagged_series(records, parking_records, date);
                if ids.is_empty() {
                    ids =
                        deletion::legacy_series(records, parking_records, date);
                }

                let first = if ids.is_empty() {
                    Merge::DeleteDay(date)
                } else {
                    Merge::DeleteIds(ids, Some(date))
                };
                Ok(iter::once(first)
                    .chain(
                        self.scope
                            .dates()
                            .into_iter()
                            .filter(|d| *d != date)
                            .map(Merge::DeleteDay),
                    )
                    .collect())
            }
        }
    }

    /// Returns the edited slots, if in time slots mode.
    fn slots_mut(&mut self) -> Option<&mut Vec<Slot>> {
        match &mut self.mode {
            DayEditMode::TimeSlots(slots) => Some(slots),
            DayEditMode::WholeDay(_) => None,
        }
    }
}
