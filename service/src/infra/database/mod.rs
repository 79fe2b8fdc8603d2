//! [`Database`] persisting parkings and their availability [`Record`]s.
//!
//! [`Record`]: crate::domain::availability::Record

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    /// [`Database`] refused to [`Commit`] a transaction.
    ///
    /// [`Commit`]: common::operations::Commit
    #[display("transaction was rolled back")]
    #[from(ignore)]
    RolledBack,
}
