//! [`Command`] for discarding a pending [`Draft`].

use common::operations::{By, Delete};
use tracerr::Traced;

use crate::{
    domain::{draft, Draft},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for discarding all the edits pending in a [`Draft`].
#[derive(Clone, Copy, Debug)]
pub struct ClearDraft(pub draft::Key);

impl<Db, St> Command<ClearDraft> for Service<Db, St>
where
    St: Storage<
        Delete<By<Draft, draft::Key>>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ClearDraft(key): ClearDraft,
    ) -> Result<Self::Ok, Self::Err> {
        self.storage()
            .execute(Delete(By::new(key)))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ClearDraft`] [`Command`] execution.
pub type ExecutionError = storage::Error;
