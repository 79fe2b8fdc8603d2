//! [`Background`] environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use derive_more::Display;
use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _,
};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a failed [`Task`].
type BoxError = Box<dyn Error + 'static>;

/// Background environment running [`Task`]s on a local set, so they may
/// hold non-[`Send`] state.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s are spawned on.
    set: task::LocalSet,

    /// Names and handles of the spawned [`Task`]s.
    handles: Vec<(&'static str, task::JoinHandle<Result<(), BoxError>>)>,
}

impl Background {
    /// Spawns a new named [`Task`] inside this [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        log::debug!("spawning `{name}` background task");

        let handle = self
            .set
            .spawn_local(future.map(|res| res.map_err(BoxError::from)));
        self.handles.push((name, handle));
    }

    /// Returns names of the [`Task`]s spawned in this [`Background`].
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handles.iter().map(|(name, _)| *name)
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Failure>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    /// Drives all the spawned [`Task`]s until the first one fails.
    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;

        let tasks = handles.into_iter().map(|(name, handle)| {
            handle
                .map(move |joined| match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(source)) => Err(Failure { name, source }),
                    Err(e) => Err(Failure {
                        name,
                        source: Box::new(e),
                    }),
                })
                .boxed_local()
        });

        async move {
            set.run_until(future::try_join_all(tasks)).await.map(drop)
        }
        .boxed_local()
    }
}

/// Failure of a [`Task`] running in a [`Background`].
#[derive(Debug, Display)]
#[display("`{name}` background task failed: {source}")]
pub struct Failure {
    /// Name of the failed [`Task`].
    pub name: &'static str,

    /// Error the [`Task`] failed with.
    pub source: BoxError,
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

#[cfg(test)]
mod spec {
    use std::{convert::Infallible, fmt, future::IntoFuture as _};

    use super::Background;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[tokio::test]
    async fn completes_when_all_tasks_do() {
        let mut bg = Background::default();
        bg.spawn("first", async { Ok::<_, Infallible>(()) });
        bg.spawn("second", async { Ok::<_, Infallible>(()) });

        assert_eq!(bg.names().collect::<Vec<_>>(), ["first", "second"]);
        assert!(bg.into_future().await.is_ok());
    }

    #[tokio::test]
    async fn reports_failed_task_by_name() {
        let mut bg = Background::default();
        bg.spawn("steady", async { Ok::<_, Infallible>(()) });
        bg.spawn("flaky", async { Err::<(), _>(Boom) });

        let err = bg.into_future().await.unwrap_err();

        assert_eq!(err.name, "flaky");
        assert_eq!(err.to_string(), "`flaky` background task failed: boom");
    }
}
