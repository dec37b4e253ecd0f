//! # Client Assembly
//!
//! Wires configuration, credential store, session, HTTP API and inventory
//! view together in the one order that works:
//!
//! ```text
//! ClientConfig ──► CredentialStore ──► SessionHandle::restore
//!                                           │
//!                     ┌─────────────────────┤ (shared handle)
//!                     ▼                     ▼
//!              HttpInventoryApi ──► SessionManager ──► InventoryView
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, FileCredentialStore};
use crate::error::ClientResult;
use crate::events::{ClientEventEmitter, NoOpEmitter};
use crate::http::HttpInventoryApi;
use crate::inventory::InventoryView;
use crate::scan::{CodeDecoder, ScanSession};
use crate::session::{SessionHandle, SessionManager};

/// A fully wired client.
pub struct RailtrackClient {
    config: ClientConfig,
    sessions: Arc<SessionManager>,
    inventory: Arc<InventoryView>,
    emitter: Arc<dyn ClientEventEmitter>,
}

impl RailtrackClient {
    /// Builds a client with the file credential store and no event sink.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        RailtrackClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> RailtrackClientBuilder {
        RailtrackClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn inventory(&self) -> &Arc<InventoryView> {
        &self.inventory
    }

    /// Opens a scan session that reports through the client's emitter.
    pub fn scan_session(&self, decoder: Arc<dyn CodeDecoder>) -> ScanSession {
        ScanSession::new(decoder).with_emitter(self.emitter.clone())
    }
}

/// Builder for [`RailtrackClient`].
pub struct RailtrackClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    emitter: Option<Arc<dyn ClientEventEmitter>>,
}

impl RailtrackClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        RailtrackClientBuilder {
            config,
            store: None,
            emitter: None,
        }
    }

    /// Replaces the file credential store.
    pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn ClientEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn build(self) -> ClientResult<RailtrackClient> {
        self.config.validate()?;

        let store = match self.store {
            Some(store) => store,
            None => Arc::new(FileCredentialStore::from_config(&self.config)?),
        };
        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        let session = SessionHandle::restore(store.as_ref());
        let api = Arc::new(HttpInventoryApi::new(&self.config, session.clone())?);

        let sessions = Arc::new(
            SessionManager::new(store, api.clone(), session).with_emitter(emitter.clone()),
        );
        let inventory = InventoryView::new(api, sessions.clone(), self.config.page_size())
            .with_emitter(emitter.clone())
            .into_shared();

        info!(
            base_url = %self.config.base_url(),
            authenticated = sessions.is_authenticated(),
            "Client ready"
        );

        Ok(RailtrackClient {
            config: self.config,
            sessions,
            inventory,
            emitter,
        })
    }
}
