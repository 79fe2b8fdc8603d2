//! [`Command`] definition.

pub mod clear_draft;
pub mod commit_draft;
pub mod stage_day_update;
pub mod stage_deletion;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    clear_draft::ClearDraft, commit_draft::CommitDraft,
    stage_day_update::StageDayUpdate, stage_deletion::StageDeletion,
};
