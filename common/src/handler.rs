//! [`Handler`] abstractions.

use std::future::Future;

/// Something executing an operation described by its `Args`.
///
/// Commands, queries, background tasks and infrastructure back-ends are all
/// expressed as [`Handler`]s of the operations they support.
pub trait Handler<Args = ()> {
    /// Type of a successful [`Handler`] outcome.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
