//! Session-scoped [`Storage`] of [`Draft`]s.
//!
//! [`Draft`]: crate::domain::Draft

pub mod memory;

use derive_more::{Display, Error as StdError, From};

pub use self::memory::Memory;

/// Storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to serialize a value before storing it.
    #[display("failed to serialize stored value: {_0}")]
    Serialization(serde_json::Error),
}
