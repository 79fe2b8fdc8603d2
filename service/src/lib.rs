//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::fmt;
use common::operations::{By, Start};
use derive_more::{Display, Error};

#[cfg(doc)]
use infra::{Database, Storage};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// [`task::EvictStaleDrafts`] configuration.
    pub evict_stale_drafts: task::evict_stale_drafts::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, St> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Storage`] of pending edits of this [`Service`].
    storage: St,
}

impl<Db, St> Service<Db, St> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        storage: St,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::EvictStaleDrafts<Self>,
                        task::evict_stale_drafts::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            storage,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("EvictStaleDrafts", async move {
            svc.execute(Start(By::new(svc.config().evict_stale_drafts)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }
}

#[cfg(test)]
impl Service<infra::database::fake::Database, infra::Memory> {
    /// Creates a new [`Service`] upon the provided fake [`Database`] and an
    /// empty [`infra::Memory`] storage.
    pub(crate) fn fake(database: infra::database::fake::Database) -> Self {
        use std::time::Duration;

        Self {
            config: Config {
                evict_stale_drafts: task::evict_stale_drafts::Config {
                    interval: Duration::from_secs(60),
                    timeout: Duration::from_secs(3600),
                },
            },
            database,
            storage: infra::Memory::default(),
        }
    }
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
        Start<
            By<
                task::EvictStaleDrafts<Svc>,
                task::evict_stale_drafts::Config,
            >,
        >,
    >,
    TaskStartError<
        Svc,
        task::EvictStaleDrafts<Svc>,
        task::evict_stale_drafts::Config,
    >: fmt::Debug,
{
    /// [`task::EvictStaleDrafts`] failed to start.
    EvictStaleDraftsTask(
        TaskStartError<
            Svc,
            task::EvictStaleDrafts<Svc>,
            task::evict_stale_drafts::Config,
        >,
    ),
}
