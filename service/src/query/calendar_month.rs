//! [`Query`] for deriving a [`Month`] of a parking calendar.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{availability::Record, draft, parking, Draft, Parking},
    infra::{database, storage, Database, Storage},
    read::Month,
    Service,
};

use super::Query;

/// [`Query`] for deriving a [`Month`] of a parking calendar.
#[derive(Clone, Copy, Debug)]
pub struct CalendarMonth {
    /// ID of the [`Parking`] to derive the calendar of.
    pub parking_id: parking::Id,

    /// Year of the [`Month`].
    pub year: i32,

    /// Number (`1..=12`) of the [`Month`].
    pub month: u8,

    /// Editing session to preview the pending [`Draft`] of, if any.
    pub session: Option<draft::SessionId>,
}

impl<Db, St> Query<CalendarMonth> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Parking>, parking::Id>>,
            Ok = Option<Parking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Record>, parking::Id>>,
            Ok = Vec<Record>,
            Err = Traced<database::Error>,
        >,
    St: Storage<
        Select<By<Option<Draft>, draft::Key>>,
        Ok = Option<Draft>,
        Err = Traced<storage::Error>,
    >,
{
    /// [`None`] if the requested month doesn't exist.
    type Ok = Option<Month>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: CalendarMonth,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CalendarMonth {
            parking_id,
            year,
            month,
            session,
        } = query;

        let parking = self
            .database()
            .execute(Select(By::<Option<Parking>, _>::new(parking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ParkingNotExists(parking_id))
            .map_err(tracerr::wrap!())?;

        let records = self
            .database()
            .execute(Select(By::<Vec<Record>, _>::new(parking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let draft = if let Some(session) = session {
            self.storage()
                .execute(Select(By::new(draft::Key {
                    session,
                    parking: parking_id,
                })))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            None
        };

        Ok(Month::derive(parking, year, month, &records, draft.as_ref()))
    }
}

/// Error of [`CalendarMonth`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// [`Parking`] doesn't exist.
    #[display("`Parking(id: {_0})` does not exist")]
    #[from(ignore)]
    ParkingNotExists(#[error(not(source))] parking::Id),
}
