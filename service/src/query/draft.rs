//! [`Query`] collection related to a pending [`Draft`].

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{draft, Draft},
    infra::{storage, Storage},
    Service,
};

use super::{Query, StorageQuery};

/// Queries a [`Draft`] by its [`draft::Key`].
pub type ByKey = StorageQuery<By<Option<Draft>, draft::Key>>;

/// [`Query`] checking whether any edit is pending under a [`draft::Key`].
#[derive(Clone, Copy, Debug)]
pub struct HasDraft(pub draft::Key);

impl<Db, St> Query<HasDraft> for Service<Db, St>
where
    St: Storage<
        Select<By<Option<Draft>, draft::Key>>,
        Ok = Option<Draft>,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = bool;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        HasDraft(key): HasDraft,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .storage()
            .execute(Select(By::new(key)))
            .await
            .map_err(tracerr::wrap!())?
            .is_some_and(|d| !d.is_empty()))
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Update;

    use crate::{
        domain::{
            availability,
            draft::{self, Merge, SessionId},
            parking,
        },
        infra::{database::fake, Memory, Storage as _},
        query::Query as _,
        Service,
    };

    use super::{ByKey, HasDraft};

    fn service() -> Service<fake::Database, Memory> {
        Service::fake(fake::Database::default())
    }

    fn key() -> draft::Key {
        draft::Key {
            session: SessionId::new(),
            parking: parking::Id::from(7),
        }
    }

    #[tokio::test]
    async fn reports_nothing_pending_without_draft() {
        let svc = service();
        let key = key();

        assert!(!svc.execute(HasDraft(key)).await.unwrap());
        assert_eq!(svc.execute(ByKey::by(key)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reports_pending_deletions() {
        let svc = service();
        let key = key();
        _ = svc
            .storage()
            .execute(Update(draft::Change {
                key,
                merges: vec![Merge::DeleteIds(
                    vec![availability::Id::from(3)],
                    None,
                )],
            }))
            .await
            .unwrap();

        assert!(svc.execute(HasDraft(key)).await.unwrap());
        let draft = svc.execute(ByKey::by(key)).await.unwrap().unwrap();
        assert!(draft.is_record_deleted(availability::Id::from(3)));
    }

    #[tokio::test]
    async fn stored_empty_draft_is_not_pending() {
        let svc = service();
        let key = key();
        _ = svc
            .storage()
            .execute(Update(draft::Change {
                key,
                merges: vec![],
            }))
            .await
            .unwrap();

        assert!(svc.execute(ByKey::by(key)).await.unwrap().is_some());
        assert!(!svc.execute(HasDraft(key)).await.unwrap());
    }
}
