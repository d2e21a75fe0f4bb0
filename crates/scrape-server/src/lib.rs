//! HTTP server exposing a Prometheus registry for scraping.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod error;

pub use error::Error;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use prometheus::{Registry, TextEncoder};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

/// Options for configuring a `ScrapeServer`.
pub struct ScrapeServerOptions {
    /// Address to listen on.
    pub listen_addr: SocketAddr,

    /// Path metrics are served under, starting with `/`.
    pub metrics_path: String,

    /// Registry rendered on every scrape.
    pub registry: Registry,
}

#[derive(Clone)]
struct ScrapeState {
    registry: Registry,
    landing_page: Arc<str>,
}

/// Serves a registry in the Prometheus text format.
pub struct ScrapeServer {
    listen_addr: SocketAddr,
    local_addr: OnceLock<SocketAddr>,
    router: Router,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl ScrapeServer {
    /// Creates a new instance of `ScrapeServer`.
    #[must_use]
    pub fn new(
        ScrapeServerOptions {
            listen_addr,
            metrics_path,
            registry,
        }: ScrapeServerOptions,
    ) -> Self {
        Self {
            listen_addr,
            local_addr: OnceLock::new(),
            router: router(registry, &metrics_path),
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        }
    }

    /// Binds the listener and starts serving.
    ///
    /// The returned handle resolves when the server stops, with an error if it
    /// stopped for any reason other than `shutdown`.
    pub async fn start(&self) -> Result<JoinHandle<Result<(), Error>>, Error> {
        if self.task_tracker.is_closed() {
            return Err(Error::AlreadyStarted);
        }

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(Error::Bind)?;
        let local_addr = listener.local_addr().map_err(Error::Bind)?;
        let _ = self.local_addr.set(local_addr);

        let router = self.router.clone();
        let shutdown_token = self.shutdown_token.clone();

        let handle = self.task_tracker.spawn(async move {
            let result = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(shutdown_token.cancelled_owned())
                .into_future()
                .await;

            match &result {
                Ok(()) => info!("scrape server exited"),
                Err(e) => error!("scrape server exited with error: {}", e),
            }

            result.map_err(Error::Serve)
        });

        self.task_tracker.close();

        info!("scrape server listening on {}", local_addr);

        Ok(handle)
    }

    /// Stops accepting connections and waits for in-flight scrapes to finish.
    pub async fn shutdown(&self) {
        info!("scrape server shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("scrape server shutdown");
    }

    /// The address the server is bound to, once started.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }
}

/// Builds the router serving `registry` under `metrics_path` and a landing
/// page under `/`.
pub fn router(registry: Registry, metrics_path: &str) -> Router {
    let state = ScrapeState {
        registry,
        landing_page: landing_page(metrics_path).into(),
    };

    Router::new()
        .route("/", get(landing))
        .route(metrics_path, get(metrics))
        .with_state(state)
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>
<head><title>SQS Prometheus Exporter</title></head>
<body>
<h1>SQS Prometheus Exporter</h1>
<p><a href='{metrics_path}'>Metrics</a></p>
</body>
</html>
"
    )
}

async fn landing(State(state): State<ScrapeState>) -> Html<String> {
    Html(state.landing_page.to_string())
}

async fn metrics(State(state): State<ScrapeState>) -> Response {
    match TextEncoder::new().encode_to_string(&state.registry.gather()) {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
