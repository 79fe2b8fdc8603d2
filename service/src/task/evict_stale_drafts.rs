//! [`EvictStaleDrafts`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{draft::TouchDateTime, Draft},
    infra::{storage, Storage},
    Service,
};

use super::Task;

/// Configuration for [`EvictStaleDrafts`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Draft`]s eviction runs.
    pub interval: time::Duration,

    /// Timeout after which an untouched [`Draft`] is considered abandoned.
    pub timeout: time::Duration,
}

/// [`Task`] for evicting [`Draft`]s of abandoned editing sessions.
#[derive(Clone, Copy, Debug)]
pub struct EvictStaleDrafts<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, St> Task<Start<By<EvictStaleDrafts<Self>, Config>>> for Service<Db, St>
where
    EvictStaleDrafts<Service<Db, St>>:
        Task<Perform<()>, Ok = (), Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<EvictStaleDrafts<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = EvictStaleDrafts {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::EvictStaleDrafts` failed: {e}");
            });
        }
    }
}

impl<Db, St> Task<Perform<()>> for EvictStaleDrafts<Service<Db, St>>
where
    St: Storage<
        Delete<By<Draft, TouchDateTime>>,
        Ok = usize,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = TouchDateTime::now() - self.config.timeout;
        let evicted = self
            .service
            .storage()
            .execute(Delete(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if evicted > 0 {
            log::info!("evicted {evicted} stale `Draft`s");
        }
        Ok(())
    }
}

/// Error of [`EvictStaleDrafts`] execution.
pub type ExecutionError = Traced<storage::Error>;

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{
        operations::{By, Perform, Select, Update},
        Date,
    };

    use crate::{
        domain::{
            draft::{self, DayUpdate, Merge, SessionId},
            parking,
        },
        infra::{database::fake, Storage as _},
        Service,
    };

    use super::{EvictStaleDrafts, Task as _};

    #[tokio::test]
    async fn evicts_only_untouched_drafts() {
        let config = super::Config {
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
        };
        let service = Service::fake(fake::Database::default());
        let key = draft::Key {
            session: SessionId::new(),
            parking: parking::Id::from(1),
        };
        let date = Date::from_str("2025-03-03").unwrap();
        _ = service
            .storage()
            .execute(Update(draft::Change {
                key,
                merges: vec![Merge::Update(date, DayUpdate::default())],
            }))
            .await
            .unwrap();

        let task = EvictStaleDrafts {
            config,
            service: service.clone(),
        };
        task.execute(Perform(())).await.unwrap();

        let kept = service
            .storage()
            .execute(Select(By::new(key)))
            .await
            .unwrap();
        assert!(kept.is_some(), "fresh `Draft` must be kept");
    }
}
