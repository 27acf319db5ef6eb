//! HTTP surface: the display page and the scrape trigger.
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /` | Render the stored record, or an all-empty page before the first scrape |
//! | `GET /scrape` | Run the pipeline, replace the stored record, redirect to `/` |
//!
//! Scrapes are serialised behind a mutex: a second trigger waits for the
//! running one instead of opening a parallel browser session.

use crate::aggregator::Aggregator;
use crate::error::Result;
use crate::fetch::HttpFetcher;
use crate::models::AggregateRecord;
use crate::outputs::html::render_page;
use crate::outputs::json::DocumentStore;
use crate::session::WebDriverSessions;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

pub type LiveAggregator = Aggregator<WebDriverSessions, HttpFetcher>;

/// A full scrape run the trigger route can start.
pub trait Scrape: Send + Sync + 'static {
    fn scrape(&self) -> impl Future<Output = Result<AggregateRecord>> + Send;
}

impl Scrape for LiveAggregator {
    fn scrape(&self) -> impl Future<Output = Result<AggregateRecord>> + Send {
        self.run()
    }
}

/// Shared application state
pub struct AppState<A> {
    pub aggregator: Arc<A>,
    pub store: Arc<DocumentStore>,
    scrape_lock: Arc<Mutex<()>>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            aggregator: Arc::clone(&self.aggregator),
            store: Arc::clone(&self.store),
            scrape_lock: Arc::clone(&self.scrape_lock),
        }
    }
}

impl<A: Scrape> AppState<A> {
    pub fn new(aggregator: A, store: DocumentStore) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            store: Arc::new(store),
            scrape_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn build_app<A: Scrape>(state: AppState<A>) -> Router {
    Router::new()
        .route("/", get(display_handler::<A>))
        .route("/scrape", get(scrape_handler::<A>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve<A: Scrape>(
    addr: &str,
    state: AppState<A>,
) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}

#[instrument(skip_all)]
async fn display_handler<A: Scrape>(State(state): State<AppState<A>>) -> Response {
    match state.store.load_or_default().await {
        Ok(record) => Html(render_page(&record)).into_response(),
        Err(e) => {
            // An unreadable store still gets a page, just an empty one.
            error!(error = %e, "Failed to read stored record");
            Html(render_page(&Default::default())).into_response()
        }
    }
}

#[instrument(skip_all)]
async fn scrape_handler<A: Scrape>(State(state): State<AppState<A>>) -> Response {
    let _guard = state.scrape_lock.lock().await;

    let record = match state.aggregator.scrape().await {
        Ok(record) => record,
        Err(e) => {
            error!(error = %e, "Scrape run failed");
            return (StatusCode::SERVICE_UNAVAILABLE, format!("scrape failed: {e}")).into_response();
        }
    };

    if let Err(e) = state.store.replace(&record).await {
        error!(error = %e, "Failed to store record");
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("store failed: {e}")).into_response();
    }
    Redirect::to("/").into_response()
}
