//! Read entities definitions.

pub mod calendar;

pub use self::calendar::{Day, DayState, Month};
