//! [`Parking`] definitions.

use common::Price;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Parking unit offered for rent by a host.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Parking {
    /// ID of this [`Parking`].
    pub id: Id,

    /// Base hourly [`Price`] of this [`Parking`], applying to every time
    /// window without an explicit override.
    pub hourly_price: Option<Price>,
}

/// ID of a [`Parking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);
