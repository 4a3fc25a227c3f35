//! Event wiring: control changes become actions, actions become fetches, and
//! completed fetches replace the page state.
//!
//! Fetches are never cancelled. Every dispatch takes a sequence number and a
//! completed fetch is only applied when no later dispatch has been applied
//! before it, so the most recently issued action decides what is shown.

mod action;
pub mod command;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};

use crate::catalog::{CatalogClient, CatalogError, Product, SearchResponse};
use crate::pipeline::{PostFilter, Truncation};
use crate::stats::Indicators;

pub use action::{Action, Controls};

#[derive(Clone, Debug, Default, Serialize)]
pub struct AppState {
    pub controls: Controls,
    pub products: Vec<Product>,
    pub pagination: Option<serde_json::Value>,
    pub indicators: Indicators,
    pub applied_seq: u64,
    /// Highest sequence that completed, including failures. Fetches at or
    /// below it are stale.
    #[serde(skip)]
    pub settled_seq: u64,
}

#[derive(Debug)]
pub enum Outcome {
    Applied(AppState),
    Stale { seq: u64, latest: u64 },
    /// The fetch failed; `state` is the unchanged page.
    Failed {
        seq: u64,
        error: CatalogError,
        state: AppState,
    },
}

pub type Clock = fn() -> NaiveDateTime;

fn utc_now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[derive(Clone)]
pub struct Session {
    client: CatalogClient,
    truncation: Truncation,
    clock: Clock,
    controls: Arc<Mutex<Controls>>,
    state: Arc<Mutex<AppState>>,
    issued: Arc<AtomicU64>,
}

impl Session {
    pub fn new(client: CatalogClient, truncation: Truncation, controls: Controls) -> Self {
        Self {
            client,
            truncation,
            clock: utc_now,
            state: Arc::new(Mutex::new(AppState {
                controls: controls.clone(),
                ..AppState::default()
            })),
            controls: Arc::new(Mutex::new(controls)),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub async fn controls(&self) -> Controls {
        self.controls.lock().await.clone()
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    /// Updates the controls and starts the fetch in the background.
    pub async fn dispatch(&self, action: Action) -> JoinHandle<Outcome> {
        let (seq, controls) = {
            let mut controls = self.controls.lock().await;
            action.apply(&mut controls);
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            (seq, controls.clone())
        };
        let query = action.query(&controls);
        let post_filter = action.post_filter();
        tracing::info!(seq, action = %action.label(), "dispatching");

        let session = self.clone();
        tokio::spawn(async move {
            let result = session
                .client
                .fetch_products(&query, session.truncation)
                .await;
            session.complete(seq, controls, post_filter, result).await
        })
    }

    /// Dispatches and waits for that action's own outcome.
    pub async fn run(&self, action: Action) -> Result<Outcome, JoinError> {
        self.dispatch(action).await.await
    }

    pub(crate) async fn complete(
        &self,
        seq: u64,
        controls: Controls,
        post_filter: Option<PostFilter>,
        result: Result<SearchResponse, CatalogError>,
    ) -> Outcome {
        let mut state = self.state.lock().await;
        if seq <= state.settled_seq {
            tracing::debug!(seq, latest = state.settled_seq, "dropping stale response");
            return Outcome::Stale {
                seq,
                latest: state.settled_seq,
            };
        }
        state.settled_seq = seq;

        let body = match result {
            Ok(body) => body,
            Err(error) => {
                tracing::error!(seq, %error, "fetch failed, keeping previous page");
                return Outcome::Failed {
                    seq,
                    error,
                    state: state.clone(),
                };
            }
        };

        let products = match post_filter.as_ref() {
            Some(filter) => filter.apply(body.result),
            None => body.result,
        };
        let indicators = Indicators::compute(&products, (self.clock)());
        *state = AppState {
            controls,
            products,
            pagination: body.meta.or_else(|| body.count.map(serde_json::Value::from)),
            indicators,
            applied_seq: seq,
            settled_seq: seq,
        };
        tracing::info!(seq, products = state.products.len(), "page updated");
        Outcome::Applied(state.clone())
    }
}
