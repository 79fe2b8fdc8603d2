//! [`Command`] for staging an availability update of a day (or a range of
//! days).

use common::operations::Update;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        draft,
        editor::{self, DayEditMode, InvalidSlots},
        DayEditor, Draft,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for staging an availability update of a day (or a range of
/// days) into the pending [`Draft`].
#[derive(Clone, Debug)]
pub struct StageDayUpdate {
    /// [`draft::Key`] of the [`Draft`] to stage into.
    pub key: draft::Key,

    /// [`editor::Scope`] to stage the update for.
    pub scope: editor::Scope,

    /// [`DayEditMode`] to stage for every date of the [`editor::Scope`].
    pub mode: DayEditMode,
}

impl<Db, St> Command<StageDayUpdate> for Service<Db, St>
where
    St: Storage<
        Update<draft::Change>,
        Ok = Draft,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Draft;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: StageDayUpdate,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let StageDayUpdate { key, scope, mode } = cmd;

        let mut editor = DayEditor::load(scope, vec![], None, None);
        editor.set_mode(mode);
        let merges = editor.save().map_err(tracerr::from_and_wrap!(=> E))?;

        self.storage()
            .execute(Update(draft::Change { key, merges }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`StageDayUpdate`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// Time slots of the update are invalid.
    #[display("{_0}")]
    InvalidSlots(InvalidSlots),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, Price};

    use crate::{
        command::Command as _,
        domain::{
            availability::TimeOfDay,
            draft::{self, SessionId, Slot},
            editor::{DayEditMode, Scope, Violation, WholeDay},
            parking,
            recurrence::Frequency,
        },
        infra::database::fake,
        Service,
    };

    use super::{ExecutionError, StageDayUpdate};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn key() -> draft::Key {
        draft::Key {
            session: SessionId::new(),
            parking: parking::Id::from(1),
        }
    }

    fn slot(start: (u8, u8), end: (u8, u8)) -> Slot {
        Slot {
            start_time: TimeOfDay::new(start.0, start.1).unwrap(),
            end_time: TimeOfDay::new(end.0, end.1).unwrap(),
            is_available: true,
            hourly_price: None,
            recurrence: Frequency::Never,
        }
    }

    #[tokio::test]
    async fn stages_every_date_of_range() {
        let svc = Service::fake(fake::Database::default());

        let draft = svc
            .execute(StageDayUpdate {
                key: key(),
                scope: Scope::between(date("2025-03-03"), date("2025-03-05")),
                mode: DayEditMode::WholeDay(WholeDay {
                    is_available: true,
                    hourly_price: Some(Price::from(8)),
                    recurrence: Frequency::Never,
                }),
            })
            .await
            .unwrap();

        assert_eq!(draft.updates().len(), 3);
        for d in ["2025-03-03", "2025-03-04", "2025-03-05"] {
            let update = draft.update(date(d)).unwrap();
            assert_eq!(update.whole_day_hourly_price, Some(Price::from(8)));
            assert!(update.slots.is_empty());
        }
    }

    #[tokio::test]
    async fn rejects_too_short_slot_without_staging() {
        let svc = Service::fake(fake::Database::default());
        let key = key();

        let err = svc
            .execute(StageDayUpdate {
                key,
                scope: Scope::Day(date("2025-03-03")),
                mode: DayEditMode::TimeSlots(vec![
                    slot((8, 0), (10, 0)),
                    slot((10, 0), (10, 30)),
                ]),
            })
            .await
            .unwrap_err();

        let ExecutionError::InvalidSlots(invalid) = err.as_ref() else {
            panic!("expected `InvalidSlots`, got: {err}");
        };
        assert_eq!(invalid.0.len(), 1);
        assert_eq!(invalid.0[0].slot, 1);
        assert_eq!(invalid.0[0].violation, Violation::TooShort);

        let draft = svc.execute(StageDayUpdate {
            key,
            scope: Scope::Day(date("2025-03-04")),
            mode: DayEditMode::TimeSlots(vec![slot((8, 0), (9, 0))]),
        });
        let draft = draft.await.unwrap();
        assert_eq!(draft.updates().len(), 1);
        assert!(draft.update(date("2025-03-03")).is_none());
    }
}
