//! [`Command`] for staging a deletion of a day's availability.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        availability::Record,
        draft,
        editor::{self, deletion, DayEditMode, ScopeRequired},
        parking, DayEditor, Draft,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Command;

/// [`Command`] for staging a deletion of a day's (or a range of days')
/// availability into the pending [`Draft`].
#[derive(Clone, Debug)]
pub struct StageDeletion {
    /// [`draft::Key`] of the [`Draft`] to stage into.
    pub key: draft::Key,

    /// [`editor::Scope`] to delete.
    pub scope: editor::Scope,

    /// [`DayEditMode`] currently being edited, if it differs from the staged
    /// or persisted one.
    ///
    /// Matters only for deciding whether the day is recurring.
    pub mode: Option<DayEditMode>,

    /// Chosen [`deletion::Scope`], required for recurring days.
    pub deletion: Option<deletion::Scope>,
}

impl<Db, St> Command<StageDeletion> for Service<Db, St>
where
    Db: Database<
        Select<By<Vec<Record>, parking::Id>>,
        Ok = Vec<Record>,
        Err = Traced<database::Error>,
    >,
    St: Storage<
            Select<By<Option<Draft>, draft::Key>>,
            Ok = Option<Draft>,
            Err = Traced<storage::Error>,
        > + Storage<
            Update<draft::Change>,
            Ok = Draft,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Draft;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: StageDeletion) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let StageDeletion {
            key,
            scope,
            mode,
            deletion,
        } = cmd;

        let records = self
            .database()
            .execute(Select(By::<Vec<Record>, _>::new(key.parking)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let date = scope.first();
        let day_records =
            records.iter().filter(|r| r.date() == date).cloned().collect();

        let draft = self
            .storage()
            .execute(Select(By::<Option<Draft>, _>::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut editor =
            DayEditor::load(scope, day_records, draft.as_ref(), None);
        if let Some(mode) = mode {
            editor.set_mode(mode);
        }
        let merges = editor
            .delete(&records, deletion)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.storage()
            .execute(Update(draft::Change { key, merges }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`StageDeletion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// Day is recurring, but no [`deletion::Scope`] was chosen.
    #[display("{_0}")]
    ScopeRequired(ScopeRequired),
}
