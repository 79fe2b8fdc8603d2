//! Parking-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::GraphQLScalar;
use service::domain;

use crate::api::scalar;

/// Unique identifier of a `Parking`.
#[derive(
    AsRef,
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    GraphQLScalar,
    Into,
    PartialEq,
)]
#[graphql(name = "ParkingId", with = scalar::Via::<domain::parking::Id>)]
pub struct Id(domain::parking::Id);
