//! GraphQL API definitions.

pub mod availability;
pub mod calendar;
pub mod draft;
pub mod editor;
mod mutation;
pub mod parking;
mod query;
pub mod scalar;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    calendar::Month, draft::Draft, editor::DayEditor, mutation::Mutation,
    query::Query,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum DraftError {
        #[code = "DRAFT_SESSION_REQUIRED"]
        #[status = BAD_REQUEST]
        #[message = "`X-Draft-Session` header is required"]
        SessionRequired,

        #[code = "DRAFT_SESSION_MALFORMED"]
        #[status = BAD_REQUEST]
        #[message = "`X-Draft-Session` header must be a UUID"]
        SessionMalformed,
    }
}

define_error! {
    enum ParkingError {
        #[code = "PARKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Parking` does not exist"]
        NotExists,
    }
}

define_error! {
    enum EditorError {
        #[code = "INVALID_SLOTS"]
        #[status = BAD_REQUEST]
        #[message = "Time slots are invalid"]
        InvalidSlots,

        #[code = "DELETION_SCOPE_REQUIRED"]
        #[status = CONFLICT]
        #[message = "Day belongs to a recurring series, deletion scope is \
                     required"]
        DeletionScopeRequired,
    }
}
