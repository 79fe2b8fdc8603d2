//! [`Query`] collection related to availability [`Record`]s.

use common::operations::By;

use crate::domain::{availability::Record, parking};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the availability [`Record`]s of a parking by its
/// [`parking::Id`].
pub type ByParking = DatabaseQuery<By<Vec<Record>, parking::Id>>;
