//! Top-level wiring of the synchronization engine.
//!
//! A [`TaskHubClient`] owns one gateway, one store, one session manager,
//! one query controller, and one mutation pipeline, and exposes the two
//! operations that genuinely span components: startup and logout. For
//! everything else, consumers go straight to the component — the facade
//! does not re-export forty methods behind new names.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::gateway::http::HttpGateway;
use crate::gateway::{ApiError, Gateway};
use crate::mutate::MutationPipeline;
use crate::query::{QueryController, SyncEvent};
use crate::session::SessionManager;
use crate::session::persist::CredentialFile;
use crate::store::DomainStore;

/// The assembled synchronization engine.
pub struct TaskHubClient<G: Gateway> {
    gateway: Arc<G>,
    store: Arc<DomainStore>,
    session: SessionManager<G>,
    query: Arc<QueryController<G>>,
    mutations: MutationPipeline<G>,
}

impl TaskHubClient<HttpGateway> {
    /// Builds a client against a real server from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the base URL is unusable or the HTTP
    /// client cannot be constructed.
    pub fn connect(
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>), ApiError> {
        let gateway = HttpGateway::new(&config.base_url, config.request_timeout)?;
        let credentials = match &config.credentials_path {
            Some(path) => CredentialFile::at(path.clone()),
            None => CredentialFile::default_location()
                .map_err(|e| ApiError::network(e.to_string()))?,
        };
        let (client, events) = Self::assemble(gateway, credentials);
        client.query.set_limit(config.page_size);
        Ok((client, events))
    }
}

impl<G: Gateway> TaskHubClient<G> {
    /// Assembles a client over an arbitrary gateway — the seam tests use
    /// to swap in a scripted one.
    #[must_use]
    pub fn assemble(gateway: G, credentials: CredentialFile) -> (Self, mpsc::Receiver<SyncEvent>) {
        let gateway = Arc::new(gateway);
        let store = Arc::new(DomainStore::new());
        let session = SessionManager::new(Arc::clone(&gateway), credentials);
        let (query, events) = QueryController::new(Arc::clone(&gateway), Arc::clone(&store));
        let query = Arc::new(query);
        let mutations =
            MutationPipeline::new(Arc::clone(&gateway), Arc::clone(&store), Arc::clone(&query));
        (
            Self {
                gateway,
                store,
                session,
                query,
                mutations,
            },
            events,
        )
    }

    /// Restores any persisted session and, when one exists, performs the
    /// initial task fetch. Returns whether a session was restored.
    pub async fn start(&self) -> bool {
        let restored = self.session.restore();
        if restored {
            self.query.refresh().await;
        }
        restored
    }

    /// Ends the session and empties the local cache.
    ///
    /// The store is cleared *after* the session: any fetch still in
    /// flight was issued under the old session, and the clear advances
    /// the store's gates so its late response is discarded instead of
    /// repopulating a logged-out view.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.store.clear();
    }

    /// The consumer saw a 401 on some operation: drop the dead session
    /// locally and empty the cache. No server call.
    pub fn handle_unauthorized(&self) {
        self.session.invalidate();
        self.store.clear();
    }

    /// The gateway shared by every component.
    #[must_use]
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// The domain store — the read surface for UI consumers.
    #[must_use]
    pub fn store(&self) -> &Arc<DomainStore> {
        &self.store
    }

    /// The session manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager<G> {
        &self.session
    }

    /// The query controller.
    #[must_use]
    pub fn query(&self) -> &Arc<QueryController<G>> {
        &self.query
    }

    /// The mutation pipeline.
    #[must_use]
    pub fn mutations(&self) -> &MutationPipeline<G> {
        &self.mutations
    }
}
