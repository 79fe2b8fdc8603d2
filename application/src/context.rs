//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{self, Header},
    TypedHeader,
};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::domain::draft;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError as _, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// [`draft::SessionId`] provided via [`DraftSession`] header, if any.
    draft_session: OnceCell<Option<draft::SessionId>>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Tries to get the [`draft::SessionId`] of the current request.
    ///
    /// # Errors
    ///
    /// Errors if the provided [`DraftSession`] header is malformed.
    pub async fn try_draft_session(
        &self,
    ) -> Result<Option<draft::SessionId>, Error> {
        self.draft_session
            .get_or_try_init(|| async {
                match self
                    .parts
                    .clone()
                    .extract::<TypedHeader<DraftSession>>()
                    .await
                {
                    Ok(TypedHeader(DraftSession(id))) => Ok(Some(id)),
                    Err(e) if e.is_missing() => Ok(None),
                    Err(e) => Err(e.into_error()),
                }
            })
            .await
            .copied()
            .map_err(self.error())
    }

    /// Returns the [`draft::SessionId`] of the current request.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the [`DraftSession`] header is not provided;
    /// - the provided [`DraftSession`] header is malformed.
    pub async fn draft_session(&self) -> Result<draft::SessionId, Error> {
        self.try_draft_session()
            .await?
            .ok_or_else(|| api::DraftError::SessionRequired.into())
            .map_err(self.error())
    }

    /// Returns the [`draft::Key`] of the provided parking's pending edits in
    /// the current request's session.
    ///
    /// # Errors
    ///
    /// Errors if the [`DraftSession`] header is absent or malformed.
    pub async fn draft_key(
        &self,
        parking: impl Into<service::domain::parking::Id>,
    ) -> Result<draft::Key, Error> {
        Ok(draft::Key {
            session: self.draft_session().await?,
            parking: parking.into(),
        })
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            draft_session: OnceCell::new(),
        })
    }
}

/// `X-Draft-Session` HTTP header identifying the editing session the pending
/// edits belong to.
#[derive(Clone, Copy, Debug)]
pub struct DraftSession(pub draft::SessionId);

/// Name of the [`DraftSession`] header.
static DRAFT_SESSION: http::HeaderName =
    http::HeaderName::from_static("x-draft-session");

impl Header for DraftSession {
    fn name() -> &'static http::HeaderName {
        &DRAFT_SESSION
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i http::HeaderValue>,
    {
        values
            .next()
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<Uuid>().ok())
            .map(|id| Self(id.into()))
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<http::HeaderValue>>(&self, values: &mut E) {
        values.extend(http::HeaderValue::from_str(&self.0.to_string()).ok());
    }
}
