//! In-memory [`Storage`] implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{By, Delete, Select, Update};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        draft::{self, SessionId, TouchDateTime},
        Draft,
    },
    infra::{storage, Storage},
};

/// Entries of a single session, keyed by their storage key.
type Session = HashMap<String, Entry>;

/// In-memory [`Storage`] of serialized [`Draft`]s, partitioned by sessions.
///
/// Each [`Draft`] is kept as a raw JSON blob, so that every change is a full
/// read-modify-write of the blob under a single lock.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored sessions.
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

/// Stored blob.
#[derive(Clone, Debug)]
struct Entry {
    /// Raw JSON of the stored value.
    raw: String,

    /// [`TouchDateTime`] this [`Entry`] was last read or written at.
    touched_at: TouchDateTime,
}

impl Memory {
    /// Locks the stored sessions, recovering them if poisoned.
    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(|e| {
            log::warn!("recovering poisoned `storage::Memory` lock");
            PoisonError::into_inner(e)
        })
    }

    /// Parses the provided [`Entry`] into a [`Draft`].
    ///
    /// Malformed blobs are treated as no [`Draft`] at all.
    fn parse(key: &draft::Key, entry: &Entry) -> Option<Draft> {
        serde_json::from_str(&entry.raw)
            .map_err(|e| {
                log::warn!(
                    "discarding malformed `Draft` `{}` of session `{}`: {e}",
                    key.storage_key(),
                    key.session,
                );
            })
            .ok()
    }
}

impl Storage<Select<By<Option<Draft>, draft::Key>>> for Memory {
    type Ok = Option<Draft>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Draft>, draft::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();

        let mut sessions = self.sessions();
        let Some(entry) = sessions
            .get_mut(&key.session)
            .and_then(|s| s.get_mut(&key.storage_key()))
        else {
            return Ok(None);
        };
        entry.touched_at = TouchDateTime::now();

        Ok(Self::parse(&key, entry))
    }
}

impl Storage<Update<draft::Change>> for Memory {
    type Ok = Draft;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(change): Update<draft::Change>,
    ) -> Result<Self::Ok, Self::Err> {
        let draft::Change { key, merges } = change;
        let storage_key = key.storage_key();

        let mut sessions = self.sessions();
        let session = sessions.entry(key.session).or_default();

        let mut draft = session
            .get(&storage_key)
            .and_then(|e| Self::parse(&key, e))
            .unwrap_or_default();
        for merge in merges {
            draft.merge(merge);
        }

        let raw = serde_json::to_string(&draft)
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        _ = session.insert(storage_key, Entry {
            raw,
            touched_at: TouchDateTime::now(),
        });

        Ok(draft)
    }
}

impl Storage<Delete<By<Draft, draft::Key>>> for Memory {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Draft, draft::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();

        let mut sessions = self.sessions();
        if let Some(session) = sessions.get_mut(&key.session) {
            _ = session.remove(&key.storage_key());
            if session.is_empty() {
                _ = sessions.remove(&key.session);
            }
        }
        Ok(())
    }
}

impl Storage<Delete<By<Draft, TouchDateTime>>> for Memory {
    /// Number of evicted [`Draft`]s.
    type Ok = usize;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Draft, TouchDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline = by.into_inner();

        let mut evicted = 0;
        self.sessions().retain(|_, session| {
            let before = session.len();
            session.retain(|_, e| e.touched_at >= deadline);
            evicted += before - session.len();
            !session.is_empty()
        });
        Ok(evicted)
    }
}

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{
        operations::{By, Delete, Select, Update},
        Date,
    };

    use crate::{
        domain::{
            draft::{self, DayUpdate, Merge, SessionId, TouchDateTime},
            parking, Draft,
        },
        infra::Storage as _,
    };

    use super::{Entry, Memory};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn key(session: SessionId, parking: i64) -> draft::Key {
        draft::Key {
            session,
            parking: parking::Id::from(parking),
        }
    }

    async fn select(storage: &Memory, key: draft::Key) -> Option<Draft> {
        storage.execute(Select(By::new(key))).await.unwrap()
    }

    async fn change(
        storage: &Memory,
        key: draft::Key,
        merges: Vec<Merge>,
    ) -> Draft {
        storage
            .execute(Update(draft::Change { key, merges }))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn merges_into_stored_draft() {
        let storage = Memory::default();
        let key = key(SessionId::new(), 1);
        assert_eq!(select(&storage, key).await, None);

        _ = change(&storage, key, vec![Merge::Update(
            date("2025-06-01"),
            DayUpdate::default(),
        )])
        .await;
        let draft =
            change(&storage, key, vec![Merge::DeleteDay(date("2025-06-01"))])
                .await;

        assert!(draft.update(date("2025-06-01")).is_none());
        assert!(draft.is_deleted(date("2025-06-01")));
        assert_eq!(select(&storage, key).await, Some(draft));
    }

    #[tokio::test]
    async fn isolates_parkings_and_sessions() {
        let storage = Memory::default();
        let session = SessionId::new();
        let (first, second) = (key(session, 1), key(session, 2));
        let other = key(SessionId::new(), 1);

        _ = change(&storage, first, vec![Merge::DeleteDay(date("2025-06-01"))])
            .await;

        assert!(select(&storage, first).await.is_some());
        assert_eq!(select(&storage, second).await, None);
        assert_eq!(select(&storage, other).await, None);
    }

    #[tokio::test]
    async fn treats_malformed_blob_as_absent() {
        let storage = Memory::default();
        let key = key(SessionId::new(), 1);
        _ = storage.sessions().entry(key.session).or_default().insert(
            key.storage_key(),
            Entry {
                raw: "{\"updates\": 42".into(),
                touched_at: TouchDateTime::now(),
            },
        );

        assert_eq!(select(&storage, key).await, None);

        let draft =
            change(&storage, key, vec![Merge::DeleteDay(date("2025-06-01"))])
                .await;
        assert_eq!(draft.delete_dates().len(), 1);
        assert!(draft.updates().is_empty());
    }

    #[tokio::test]
    async fn deletes_drafts() {
        let storage = Memory::default();
        let key = key(SessionId::new(), 1);
        _ = change(&storage, key, vec![Merge::DeleteDay(date("2025-06-01"))])
            .await;

        storage.execute(Delete(By::new(key))).await.unwrap();

        assert_eq!(select(&storage, key).await, None);
        assert!(storage.sessions().is_empty());
    }

    #[tokio::test]
    async fn evicts_stale_drafts() {
        let storage = Memory::default();
        let stale = key(SessionId::new(), 1);
        let fresh = key(SessionId::new(), 1);
        for k in [stale, fresh] {
            _ = change(&storage, k, vec![Merge::DeleteDay(date("2025-06-01"))])
                .await;
        }
        storage
            .sessions()
            .get_mut(&stale.session)
            .unwrap()
            .values_mut()
            .for_each(|e| {
                e.touched_at = TouchDateTime::now() - Duration::from_secs(3600);
            });

        let evicted = storage
            .execute(Delete(By::new(
                TouchDateTime::now() - Duration::from_secs(60),
            )))
            .await
            .unwrap();

        assert_eq!(evicted, 1);
        assert_eq!(select(&storage, stale).await, None);
        assert!(select(&storage, fresh).await.is_some());
    }
}
