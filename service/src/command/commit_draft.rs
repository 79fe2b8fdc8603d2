//! [`Command`] for committing a pending [`Draft`].

use common::{
    operations::{By, Commit, Delete, Insert, Select, Transact, Transacted},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        availability::{self, Record},
        draft, parking, Draft, Plan,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Command;

/// [`Command`] for committing a pending [`Draft`] into the persisted
/// availability, and discarding it afterwards.
///
/// Replays the [`Plan`] of the [`Draft`] in a single transaction: deletes the
/// staged [`Record`]s and dates first, then replaces the availability of every
/// date touched by a staged update (expanded by its recurrence).
#[derive(Clone, Copy, Debug)]
pub struct CommitDraft(pub draft::Key);

impl<Db, St> Command<CommitDraft> for Service<Db, St>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Delete<By<Record, (parking::Id, availability::Id)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<Record>, (parking::Id, Date)>>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<
            Insert<Record>,
            Ok = availability::Id,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    St: Storage<
            Select<By<Option<Draft>, draft::Key>>,
            Ok = Option<Draft>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<By<Draft, draft::Key>>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    /// Committed [`Plan`].
    type Ok = Plan;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CommitDraft(key): CommitDraft,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let parking_id = key.parking;

        let draft = self
            .storage()
            .execute(Select(By::<Option<Draft>, _>::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .unwrap_or_default();
        let plan = Plan::new(parking_id, &draft);

        if !plan.is_empty() {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            for id in &plan.delete_ids {
                let existed = tx
                    .execute(Delete(By::<Record, _>::new((parking_id, *id))))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if !existed {
                    log::debug!(
                        "`Record(id: {id})` of `Parking(id: {parking_id})` \
                         is already deleted",
                    );
                }
            }
            for date in plan.delete_dates.iter().chain(&plan.replaced_dates()) {
                _ = tx
                    .execute(Delete(By::<Vec<Record>, _>::new((
                        parking_id, *date,
                    ))))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
            for record in plan.records() {
                _ = tx
                    .execute(Insert(record))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }

            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        self.storage()
            .execute(Delete(By::<Draft, _>::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(plan)
    }
}

/// Error of [`CommitDraft`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{operations::Update, Date, Price};
    use time::{macros::time, PrimitiveDateTime, Time};

    use crate::{
        command::Command as _,
        domain::{
            availability::{self, Kind, Record, TimeOfDay},
            draft::{self, DayUpdate, Merge, SessionId, Slot},
            parking,
            recurrence::Frequency,
            Parking,
        },
        infra::{
            database::{self, fake},
            Memory, Storage as _,
        },
        query::{HasDraft, Query as _},
        read::calendar::{derive_state, DayState},
        Service,
    };

    use super::{CommitDraft, ExecutionError};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn record(id: i64, day: &str, start: Time, end: Time) -> Record {
        let d = time::Date::from(date(day));
        Record {
            id: Some(availability::Id::from(id)),
            parking_id: parking::Id::from(1),
            starts_at: PrimitiveDateTime::new(d, start),
            ends_at: PrimitiveDateTime::new(d, end),
            is_available: true,
            hourly_price: None,
            recurrence: None,
        }
    }

    fn service(records: Vec<Record>) -> Service<fake::Database, Memory> {
        let parking = Parking {
            id: parking::Id::from(1),
            hourly_price: Some(Price::from(5)),
        };
        Service::fake(fake::Database::with(parking, records))
    }

    fn key() -> draft::Key {
        draft::Key {
            session: SessionId::new(),
            parking: parking::Id::from(1),
        }
    }

    async fn stage(
        svc: &Service<fake::Database, Memory>,
        key: draft::Key,
        merges: Vec<Merge>,
    ) {
        _ = svc
            .storage()
            .execute(Update(draft::Change { key, merges }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn replays_draft_and_clears_it() {
        let svc = service(vec![
            record(1, "2025-03-03", time!(08:00), time!(10:00)),
            record(2, "2025-03-04", time!(08:00), time!(10:00)),
            record(3, "2025-03-05", time!(08:00), time!(10:00)),
        ]);
        let key = key();
        stage(&svc, key, vec![
            Merge::DeleteIds(vec![availability::Id::from(1)], None),
            Merge::DeleteDay(date("2025-03-04")),
            Merge::Update(date("2025-03-05"), DayUpdate {
                whole_day_available: false,
                ..DayUpdate::default()
            }),
        ])
        .await;

        let plan = svc.execute(CommitDraft(key)).await.unwrap();

        assert_eq!(plan.upserts.len(), 1);
        assert_eq!(plan.upserts[0].kind, Kind::Unavailable);
        let state = svc.database().state();
        assert_eq!(state.commits, 1);
        assert_eq!(state.records.len(), 1);
        let left = &state.records[0];
        assert_eq!(left.date(), date("2025-03-05"));
        assert!(left.is_whole_day());
        assert!(!left.is_available);
        drop(state);

        assert!(!svc.execute(HasDraft(key)).await.unwrap());
    }

    #[tokio::test]
    async fn expands_recurring_slots() {
        let svc = service(vec![]);
        let key = key();
        stage(&svc, key, vec![Merge::Update(date("2025-03-03"), DayUpdate {
            slots: vec![Slot {
                start_time: TimeOfDay::new(9, 0).unwrap(),
                end_time: TimeOfDay::new(11, 0).unwrap(),
                is_available: true,
                hourly_price: Some(Price::from(7)),
                recurrence: Frequency::Weekly,
            }],
            ..DayUpdate::default()
        })])
        .await;

        _ = svc.execute(CommitDraft(key)).await.unwrap();

        let state = svc.database().state();
        assert_eq!(state.records.len(), 52);
        let tag = state.records[0].recurrence().cloned().unwrap();
        assert!(state.records.iter().all(|r| r.recurrence() == Some(&tag)));
        assert_eq!(state.records[51].date(), date("2026-02-23"));
    }

    #[tokio::test]
    async fn missing_rows_are_not_an_error() {
        let svc = service(vec![]);
        let key = key();
        stage(&svc, key, vec![Merge::DeleteIds(
            vec![availability::Id::from(42)],
            None,
        )])
        .await;

        let plan = svc.execute(CommitDraft(key)).await.unwrap();

        assert_eq!(plan.delete_ids, [availability::Id::from(42)]);
        assert_eq!(svc.database().state().commits, 1);
    }

    #[tokio::test]
    async fn own_update_wins_over_series() {
        let svc = service(vec![]);
        let key = key();
        stage(&svc, key, vec![
            Merge::Update(date("2025-03-03"), DayUpdate {
                whole_day_available: false,
                whole_day_recurrence: Frequency::Weekly,
                ..DayUpdate::default()
            }),
            Merge::Update(date("2025-03-10"), DayUpdate {
                whole_day_hourly_price: Some(Price::from(9)),
                ..DayUpdate::default()
            }),
        ])
        .await;

        _ = svc.execute(CommitDraft(key)).await.unwrap();

        let state = svc.database().state();
        assert_eq!(state.records.len(), 52);
        let day = state
            .records
            .iter()
            .filter(|r| r.date() == date("2025-03-10"))
            .collect::<Vec<_>>();
        assert_eq!(day.len(), 1);
        assert_eq!(
            derive_state(&day, Some(Price::from(5))),
            (DayState::CustomPrice, Some(Price::from(9))),
        );
        assert!(state
            .records
            .iter()
            .filter(|r| r.date() == date("2025-03-17"))
            .all(|r| !r.is_available));
    }

    #[tokio::test]
    async fn keeps_draft_when_commit_fails() {
        let svc = service(vec![]);
        let key = key();
        stage(&svc, key, vec![Merge::DeleteDay(date("2025-03-04"))]).await;
        svc.database().state().refuse_commits = true;

        let err = svc.execute(CommitDraft(key)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Db(database::Error::RolledBack),
        ));
        assert!(svc.execute(HasDraft(key)).await.unwrap());
    }

    #[tokio::test]
    async fn nothing_to_commit() {
        let svc = service(vec![record(
            1,
            "2025-03-03",
            time!(08:00),
            time!(10:00),
        )]);

        let plan = svc.execute(CommitDraft(key())).await.unwrap();

        assert!(plan.is_empty());
        let state = svc.database().state();
        assert_eq!(state.commits, 0);
        assert_eq!(state.records.len(), 1);
    }
}
