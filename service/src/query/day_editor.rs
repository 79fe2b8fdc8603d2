//! [`Query`] for loading a [`DayEditor`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        availability::Record,
        draft, editor,
        parking::{self, Parking},
        DayEditor, Draft,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Query;

/// [`Query`] for loading a [`DayEditor`] of a parking's day (or range of
/// days).
#[derive(Clone, Copy, Debug)]
pub struct DayEditorView {
    /// ID of the [`Parking`] to edit the availability of.
    pub parking_id: parking::Id,

    /// [`editor::Scope`] to edit.
    pub scope: editor::Scope,

    /// Editing session whose pending [`Draft`] takes precedence over the
    /// persisted availability, if any.
    pub session: Option<draft::SessionId>,
}

impl<Db, St> Query<DayEditorView> for Service<Db, St>
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
    type Ok = DayEditor;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: DayEditorView,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DayEditorView {
            parking_id,
            scope,
            session,
        } = query;

        let parking = self
            .database()
            .execute(Select(By::<Option<Parking>, _>::new(parking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ParkingNotExists(parking_id))
            .map_err(tracerr::wrap!())?;

        let date = scope.first();
        let day_records = self
            .database()
            .execute(Select(By::<Vec<Record>, _>::new(parking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|r| r.date() == date)
            .collect();

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

        Ok(DayEditor::load(
            scope,
            day_records,
            draft.as_ref(),
            parking.hourly_price,
        ))
    }
}

/// Error of [`DayEditorView`] [`Query`] execution.
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
