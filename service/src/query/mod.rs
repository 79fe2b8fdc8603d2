//! [`Query`] definition.

pub mod availability;
pub mod calendar_month;
pub mod day_editor;
pub mod draft;
pub mod parking;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, storage, Database, Storage},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

pub use self::{
    calendar_month::CalendarMonth, day_editor::DayEditorView,
    draft::HasDraft,
};

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, St, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db, St>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] [`Select`]ing a `T`ype from a [`Storage`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct StorageQuery<T>(T);

impl<W, B> StorageQuery<By<W, B>> {
    /// Creates a new [`StorageQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, St, W, B> Query<StorageQuery<By<W, B>>> for Service<Db, St>
where
    St: Storage<Select<By<W, B>>, Ok = W, Err = Traced<storage::Error>>,
{
    type Ok = W;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        StorageQuery(by): StorageQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.storage()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
