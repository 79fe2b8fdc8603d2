//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{domain::recurrence, query, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the availability calendar of the `Parking` for the specified
    /// month.
    ///
    /// If `withDraft` is `true`, the edits pending in the current session are
    /// previewed over the persisted availability.
    ///
    /// Returns `null` if the specified month doesn't exist.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PARKING_NOT_EXISTS` - the `Parking` with the specified ID does not
    ///                          exist;
    /// - `DRAFT_SESSION_REQUIRED` - `withDraft` is `true`, but no
    ///                              `X-Draft-Session` header is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "calendarMonth",
            month = %month,
            otel.name = Self::SPAN_NAME,
            parking_id = %parking_id,
            with_draft = ?with_draft,
            year = %year,
        ),
    )]
    pub async fn calendar_month(
        parking_id: api::parking::Id,
        year: i32,
        month: i32,
        with_draft: Option<bool>,
        ctx: &Context,
    ) -> Result<Option<api::Month>, Error> {
        let Ok(month) = u8::try_from(month) else {
            return Ok(None);
        };
        let session = if with_draft.unwrap_or_default() {
            Some(ctx.draft_session().await?)
        } else {
            None
        };

        ctx.service()
            .execute(query::CalendarMonth {
                parking_id: parking_id.into(),
                year,
                month,
                session,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|m| m.map(Into::into))
    }

    /// Returns the `DayEditor` of the `Parking`'s day, or of a range of days
    /// from `date` to `lastDate` (inclusive, in any order).
    ///
    /// Edits pending in the current session (if any) take precedence over
    /// the persisted availability.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PARKING_NOT_EXISTS` - the `Parking` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            date = %date,
            gql.name = "dayEditor",
            last_date = ?last_date,
            otel.name = Self::SPAN_NAME,
            parking_id = %parking_id,
        ),
    )]
    pub async fn day_editor(
        parking_id: api::parking::Id,
        date: Date,
        last_date: Option<Date>,
        ctx: &Context,
    ) -> Result<api::DayEditor, Error> {
        let session = ctx.try_draft_session().await?;

        ctx.service()
            .execute(query::DayEditorView {
                parking_id: parking_id.into(),
                scope: api::editor::scope(date, last_date),
                session,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the edits of the `Parking`'s availability pending in the
    /// current session.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DRAFT_SESSION_REQUIRED` - no `X-Draft-Session` header is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "draft",
            otel.name = Self::SPAN_NAME,
            parking_id = %parking_id,
        ),
    )]
    pub async fn draft(
        parking_id: api::parking::Id,
        ctx: &Context,
    ) -> Result<api::Draft, Error> {
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(query::draft::ByKey::by(key))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|d| d.unwrap_or_default().into())
    }

    /// Indicates whether any edit of the `Parking`'s availability is pending
    /// in the current session.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DRAFT_SESSION_REQUIRED` - no `X-Draft-Session` header is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "hasDraft",
            otel.name = Self::SPAN_NAME,
            parking_id = %parking_id,
        ),
    )]
    pub async fn has_draft(
        parking_id: api::parking::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let key = ctx.draft_key(parking_id).await?;

        ctx.service()
            .execute(query::HasDraft(key))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Expands the recurrence of an override anchored at the `anchor` date
    /// into the `YYYY-MM-DD` dates it applies to, optionally clipped to the
    /// range from `rangeStart` to `rangeEnd` (inclusive).
    ///
    /// Unknown `frequency` is treated as `never`, and an unparsable `anchor`
    /// is returned as is.
    #[tracing::instrument(
        skip_all,
        fields(
            anchor = %anchor,
            frequency = ?frequency,
            gql.name = "recurrenceDates",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub fn recurrence_dates(
        frequency: Option<String>,
        anchor: String,
        range_start: Option<String>,
        range_end: Option<String>,
    ) -> Vec<String> {
        recurrence::expand_iso(
            frequency.as_deref().unwrap_or_default(),
            &anchor,
            range_start.as_deref(),
            range_end.as_deref(),
        )
    }
}

impl AsError for query::calendar_month::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
            Self::ParkingNotExists(_) => {
                Some(api::ParkingError::NotExists.into())
            }
        }
    }
}

impl AsError for query::day_editor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
            Self::ParkingNotExists(_) => {
                Some(api::ParkingError::NotExists.into())
            }
        }
    }
}
