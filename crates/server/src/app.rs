//! Shared service state: store, remote client, cache and the guarded sync job.

use onesync_client::{ContentSource, GraphClient, GraphConfig, OAuthClient, OAuthConfig, ResourceCache, TokenManager};
use onesync_core::{AppConfig, Error, Store};
use std::sync::Arc;

use crate::sync::{SyncOrchestrator, SyncSummary};
use crate::task::TaskGuard;

#[derive(Clone)]
pub struct App {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub tokens: Arc<TokenManager>,
    pub graph: GraphClient,
    pub resources: Arc<ResourceCache>,
    pub sync: Arc<TaskGuard<SyncSummary>>,
}

impl App {
    /// Open the store at `config.db_path` and wire every component.
    pub async fn open(config: AppConfig) -> Result<Self, Error> {
        let store = Store::open(&config.db_path).await?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: Store) -> Result<Self, Error> {
        if let Err(e) = config.require_client_id() {
            tracing::warn!(error = %e, "token refresh and authorization will be rejected");
        }

        let oauth = OAuthClient::new(OAuthConfig::from(&config))?;
        let tokens = Arc::new(TokenManager::new(oauth, Arc::new(store.clone())));
        let graph = GraphClient::new(GraphConfig::from(&config), tokens.clone())?;

        let source: Arc<dyn ContentSource> = Arc::new(graph.clone());
        let resources = Arc::new(ResourceCache::new(config.cache_dir.clone(), source.clone()));
        let orchestrator = SyncOrchestrator::from_config(&config, store.clone(), source);
        let notebook_id = config.require_notebook_id().ok().map(str::to_string);
        let sync = Arc::new(sync_guard(orchestrator, notebook_id));

        Ok(Self { config: Arc::new(config), store, tokens, graph, resources, sync })
    }
}

/// Guarded notebook sync. Without a notebook id every run is a logged no-op.
pub fn sync_guard(orchestrator: SyncOrchestrator, notebook_id: Option<String>) -> TaskGuard<SyncSummary> {
    TaskGuard::new("notebook-sync", move || {
        let orchestrator = orchestrator.clone();
        let notebook_id = notebook_id.clone();
        async move {
            let Some(notebook_id) = notebook_id else {
                tracing::warn!("notebook_id not configured, nothing to sync");
                return Ok(SyncSummary::default());
            };
            orchestrator.sync(&notebook_id).await.map_err(|e| match e {
                Error::Auth(msg) => {
                    tracing::warn!(error = %msg, "sync needs a new authorization");
                    Error::Auth(format!("{msg}; authorize again with auth_url and auth_complete"))
                }
                other => other,
            })
        }
    })
}
