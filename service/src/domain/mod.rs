//! Domain definitions.

pub mod availability;
pub mod draft;
pub mod editor;
pub mod parking;
pub mod recurrence;
pub mod replay;

pub use self::{
    draft::Draft, editor::DayEditor, parking::Parking, replay::Plan,
};
