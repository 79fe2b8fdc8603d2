//! GraphQL [`Mutation`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{command, query, Command as _, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Stages the provided edit for the `Parking`'s day, or for every day of
    /// the range from `date` to `lastDate` (inclusive, in any order), into
    /// the current session's draft.
    ///
    /// Without `parkingId` or `date` nothing is staged, and the current draft
    /// is returned unchanged.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DRAFT_SESSION_REQUIRED` - no `X-Draft-Session` header is provided;
    /// - `INVALID_SLOTS` - some time slot ends before it starts, or lasts
    ///                     less than an hour.
    #[tracing::instrument(
        skip_all,
        fields(
            date = ?date,
            gql.name = "stageDayUpdate",
            last_date = ?last_date,
            otel.name = Self::SPAN_NAME,
            parking_id = ?parking_id,
        ),
    )]
    pub async fn stage_day_update(
        parking_id: Option<api::parking::Id>,
        date: Option<Date>,
        last_date: Option<Date>,
        edit: api::editor::DayEditInput,
        ctx: &Context,
    ) -> Result<api::Draft, Error> {
        let Some((parking_id, date)) = parking_id.zip(date) else {
            return Self::unchanged(parking_id, ctx).await;
        };
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(command::StageDayUpdate {
                key,
                scope: api::editor::scope(date, last_date),
                mode: edit.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Stages the deletion of the `Parking`'s day, or of every day of the
    /// range from `date` to `lastDate` (inclusive, in any order), into the
    /// current session's draft.
    ///
    /// Deleting a day of a recurring series (or a day being made recurring
    /// by the provided `edit`) requires choosing the `scope`.
    ///
    /// Without `parkingId` or `date` nothing is staged, and the current draft
    /// is returned unchanged.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DRAFT_SESSION_REQUIRED` - no `X-Draft-Session` header is provided;
    /// - `DELETION_SCOPE_REQUIRED` - the day is recurring, but no `scope` is
    ///                               provided.
    #[tracing::instrument(
        skip_all,
        fields(
            date = ?date,
            gql.name = "stageDayDeletion",
            last_date = ?last_date,
            otel.name = Self::SPAN_NAME,
            parking_id = ?parking_id,
            scope = ?scope,
        ),
    )]
    pub async fn stage_day_deletion(
        parking_id: Option<api::parking::Id>,
        date: Option<Date>,
        last_date: Option<Date>,
        edit: Option<api::editor::DayEditInput>,
        scope: Option<api::editor::DeletionScope>,
        ctx: &Context,
    ) -> Result<api::Draft, Error> {
        let Some((parking_id, date)) = parking_id.zip(date) else {
            return Self::unchanged(parking_id, ctx).await;
        };
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(command::StageDeletion {
                key,
                scope: api::editor::scope(date, last_date),
                mode: edit.map(Into::into),
                deletion: scope.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Discards all the edits of the `Parking`'s availability pending in the
    /// current session.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DRAFT_SESSION_REQUIRED` - no `X-Draft-Session` header is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "clearDraft",
            otel.name = Self::SPAN_NAME,
            parking_id = %parking_id,
        ),
    )]
    pub async fn clear_draft(
        parking_id: api::parking::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(command::ClearDraft(key))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Commits all the edits of the `Parking`'s availability pending in the
    /// current session, and discards them afterwards.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DRAFT_SESSION_REQUIRED` - no `X-Draft-Session` header is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "commitDraft",
            otel.name = Self::SPAN_NAME,
            parking_id = %parking_id,
        ),
    )]
    pub async fn commit_draft(
        parking_id: api::parking::Id,
        ctx: &Context,
    ) -> Result<api::draft::CommitResult, Error> {
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(command::CommitDraft(key))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl Mutation {
    /// Returns the current draft of the `Parking` (if any) without changing
    /// it.
    async fn unchanged(
        parking_id: Option<api::parking::Id>,
        ctx: &Context,
    ) -> Result<api::Draft, Error> {
        let Some(parking_id) = parking_id else {
            return Ok(service::domain::Draft::default().into());
        };
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(query::draft::ByKey::by(key))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|d| d.unwrap_or_default().into())
    }
}

impl AsError for command::stage_day_update::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
            Self::InvalidSlots(e) => Some(
                Error::from(api::EditorError::InvalidSlots)
                    .with_details(&e.0),
            ),
        }
    }
}

impl AsError for command::stage_deletion::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
            Self::ScopeRequired(_) => {
                Some(api::EditorError::DeletionScopeRequired.into())
            }
        }
    }
}

impl AsError for command::commit_draft::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
        }
    }
}
