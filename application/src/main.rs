use std::{
    future::IntoFuture as _,
    io,
    sync::{Arc, OnceLock},
    time,
};

use axum::{
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use axum_extra::headers::Header as _;
use futures::{future, TryFutureExt as _};
use host_dashboard::{api, graphql, Args, Config, DraftSession};
use service::{
    infra::{Memory, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(log_layer(io::stdout, false))
        .with(log_layer(io::stderr, true))
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args {
        config,
        migrate_only,
    } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        drafts,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    let applied = postgres.migrate().await.map_err(|e| {
        log::error!("failed to run database migrations: {e}");
    })?;
    log::info!("database schema is up to date ({applied} migrations applied)");
    if migrate_only {
        return Ok(());
    }

    let (service, background) =
        Service::new(drafts.into(), postgres, Memory::default());

    let schema = api::Schema::new(
        api::Query,
        api::Mutation,
        juniper::EmptySubscription::new(),
    );

    let mut cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
            DraftSession::name().clone(),
        ]);
    for origin in server.cors.origins {
        cors = cors.allow_origin(
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not current CORS origin: {e}");
            })?,
        );
    }

    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span::<axum::body::Body>)
                .on_response(log_response::<axum::body::Body>),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    let serve = axum::serve(listener, app);

    future::try_join(
        serve
            .into_future()
            .map_err(|e| log::error!("webserver failed: {e}")),
        background.into_future().map_err(|e| log::error!("{e}")),
    )
    .await
    .map(drop)
}

/// Creates a compact [`fmt`] layer writing into the provided `writer` the
/// events of the configured log level, either the [`STDERR_LEVELS`] ones or
/// all the others.
///
/// [`fmt`]: tracing_subscriber::fmt
fn log_layer<S, W>(
    writer: W,
    stderr: bool,
) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber
        + for<'s> tracing_subscriber::registry::LookupSpan<'s>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            let level = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
            meta.is_span()
                || STDERR_LEVELS.contains(meta.level()) == stderr
                    && level >= *meta.level()
        }))
}

/// Creates a [`tracing::Span`] of the provided HTTP request.
///
/// Requests of an editing session carry its [`DraftSession`] ID, so all the
/// requests staging a single draft may be correlated.
fn request_span<B>(r: &http::Request<B>) -> tracing::Span {
    tracing::info_span!(
        "HTTP request",
        draft.session = r
            .headers()
            .get(DraftSession::name())
            .and_then(|h| h.to_str().ok()),
        http.client_ip = InsecureClientIp::from(r.headers(), r.extensions())
            .map(|ip| ip.0.to_string())
            .ok(),
        http.flavor = ?r.version(),
        http.host = r.uri().host(),
        http.method = r.method().as_str(),
        http.route = r
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.scheme = r.uri().scheme().map(http::uri::Scheme::as_str),
        http.target = r
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = r
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = tracing::field::Empty,
    )
}

/// Logs the provided HTTP response in its request's [`tracing::Span`].
///
/// Client errors (like a missing deletion scope the dashboard is expected to
/// ask for) are logged as warnings, and server errors as errors.
fn log_response<B>(
    r: &http::Response<B>,
    dur: time::Duration,
    span: &tracing::Span,
) {
    _ = span.record(
        "http.status_code",
        tracing::field::display(r.status().as_u16()),
    );

    let duration = format!("{}ms", dur.as_millis());
    if r.status().is_server_error() {
        log::error!(duration = %duration);
    } else if r.status().is_client_error() {
        log::warn!(duration = %duration);
    } else {
        log::info!(duration = %duration);
    }
}
