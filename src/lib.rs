pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod forms;
pub mod guard;
pub mod models;
pub mod query;
pub mod session;
pub mod startup;
pub mod ui;

use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::query::QueryClient;
use crate::session::{SessionStore, Storage};

pub struct AppState {
    pub config: Config,
    /// Unauthenticated client; per-session clones carry the bearer token
    pub api: ApiClient,
    /// Shared by every admin session
    pub queries: Arc<QueryClient>,
    pub storage: Arc<dyn Storage>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Config, api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let queries = Arc::new(QueryClient::new(config.cache.stale_after()));
        Self {
            config,
            api,
            queries,
            storage,
            metrics_handle: None,
        }
    }

    /// Set the Prometheus metrics handle
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Session store for one browser session id, hydrated from storage.
    pub fn session(&self, sid: &str) -> SessionStore {
        SessionStore::hydrate(
            self.storage.clone(),
            format!("{}:{}", self.config.session.storage_key, sid),
        )
    }
}
