//! In-memory [`Database`] double for tests.

use std::sync::{Arc, Mutex, MutexGuard};

use common::{
    operations::{By, Commit, Delete, Insert, Select, Transact},
    Date,
};
use tracerr::Traced;

use crate::{
    domain::{
        availability::{self, Record},
        parking, Parking,
    },
    infra::database,
};

/// In-memory [`Database`] double.
///
/// Transactions are not isolated: every statement applies immediately.
///
/// [`Database`]: super::Database
#[derive(Clone, Debug, Default)]
pub(crate) struct Database(Arc<Mutex<State>>);

/// State of a [`Database`].
#[derive(Debug, Default)]
pub(crate) struct State {
    /// Stored [`Parking`]s.
    pub(crate) parkings: Vec<Parking>,

    /// Stored availability [`Record`]s.
    pub(crate) records: Vec<Record>,

    /// Number of performed [`Commit`]s.
    pub(crate) commits: usize,

    /// Whether [`Commit`]s should fail with [`RolledBack`] error.
    ///
    /// [`RolledBack`]: database::Error::RolledBack
    pub(crate) refuse_commits: bool,

    /// Last assigned [`availability::Id`].
    last_id: i64,
}

impl Database {
    /// Creates a new [`Database`] with the provided [`Parking`] and its
    /// [`Record`]s.
    pub(crate) fn with(parking: Parking, records: Vec<Record>) -> Self {
        let this = Self::default();
        {
            let mut state = this.state();
            state.parkings.push(parking);
            for mut r in records {
                state.last_id += 1;
                r.id = Some(r.id.unwrap_or(state.last_id.into()));
                state.records.push(r);
            }
        }
        this
    }

    /// Locks the [`State`] of this [`Database`].
    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }
}

impl super::Database<Select<By<Vec<Record>, parking::Id>>> for Database {
    type Ok = Vec<Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Record>, parking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut records = self
            .state()
            .records
            .iter()
            .filter(|r| r.parking_id == id)
            .cloned()
            .collect::<Vec<_>>();
        records.sort_by_key(|r| (r.starts_at, r.id));
        Ok(records)
    }
}

impl super::Database<Select<By<Option<Parking>, parking::Id>>> for Database {
    type Ok = Option<Parking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parking>, parking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().parkings.iter().find(|p| p.id == id).copied())
    }
}

impl super::Database<Transact> for Database {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl super::Database<Commit> for Database {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.refuse_commits {
            return Err(tracerr::new!(database::Error::RolledBack));
        }
        state.commits += 1;
        Ok(())
    }
}

impl super::Database<Delete<By<Record, (parking::Id, availability::Id)>>>
    for Database
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Record, (parking::Id, availability::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (parking_id, id) = by.into_inner();
        let mut state = self.state();
        let before = state.records.len();
        state
            .records
            .retain(|r| !(r.parking_id == parking_id && r.id == Some(id)));
        Ok(state.records.len() < before)
    }
}

impl super::Database<Delete<By<Vec<Record>, (parking::Id, Date)>>>
    for Database
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Record>, (parking::Id, Date)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (parking_id, date) = by.into_inner();
        let mut state = self.state();
        let before = state.records.len();
        state
            .records
            .retain(|r| !(r.parking_id == parking_id && r.date() == date));
        Ok(u64::try_from(before - state.records.len()).unwrap())
    }
}

impl super::Database<Insert<Record>> for Database {
    type Ok = availability::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(mut record): Insert<Record>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        state.last_id += 1;
        let id = availability::Id::from(state.last_id);
        record.id = Some(id);
        state.records.push(record);
        Ok(id)
    }
}
