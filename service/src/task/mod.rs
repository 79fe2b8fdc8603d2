//! Background [`Task`]s definitions.

pub mod background;
pub mod evict_stale_drafts;

pub use common::Handler as Task;

pub use self::{background::Background, evict_stale_drafts::EvictStaleDrafts};
