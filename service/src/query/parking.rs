//! [`Query`] collection related to a single [`Parking`].

use common::operations::By;

use crate::domain::{parking, Parking};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Parking`] by its [`parking::Id`].
pub type ById = DatabaseQuery<By<Option<Parking>, parking::Id>>;
