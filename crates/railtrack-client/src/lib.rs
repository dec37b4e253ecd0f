//! # railtrack-client: Session Lifecycle & Remote Inventory for Railtrack
//!
//! This crate is the I/O half of the Railtrack client. It keeps the session
//! token across restarts, talks to the inventory API, and holds the state the
//! UI renders.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Railtrack Client Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    RailtrackClient (assembly)                    │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionManager │  │ InventoryView  │  │  ScanSession           │    │
//! │  │                │  │                │  │                        │    │
//! │  │ login / logout │  │ guard → fetch  │  │ decoder → details      │    │
//! │  │ forced logout  │  │ table state    │  │ route                  │    │
//! │  │ epoch counter  │  │ stale drop     │  │                        │    │
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────────────┘    │
//! │          │                   │                                          │
//! │          ▼                   ▼                                          │
//! │  ┌────────────────┐  ┌────────────────────────────────────────────┐    │
//! │  │CredentialStore │  │ HttpInventoryApi (reqwest)                 │    │
//! │  │ credentials.json│ │ Bearer header read from SessionHandle      │    │
//! │  └────────────────┘  └────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  EVENTS (to the UI):                                                   │
//! │  • watch: AuthState, visible Page                                      │
//! │  • ClientEventEmitter: navigate(Route), notify(Notification)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - `RailtrackClient` assembly and builder
//! - [`config`] - API URL, page size, credentials path
//! - [`credentials`] - Token persistence
//! - [`session`] - `SessionHandle` and `SessionManager`
//! - [`api`] - `Authenticator` / `InventoryApi` traits
//! - [`http`] - HTTP implementation of both traits
//! - [`inventory`] - `InventoryView` for the database page
//! - [`scan`] - Code scanning session
//! - [`events`] - Navigation and notification events
//! - [`telemetry`] - Logging setup
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use railtrack_client::{ClientConfig, RailtrackClient};
//!
//! railtrack_client::telemetry::init_tracing();
//!
//! let client = RailtrackClient::new(ClientConfig::load_or_default(None))?;
//! client.sessions().login("admin", "secret").await?;
//!
//! client.inventory().refresh().await?;
//! let page = client.inventory().set_filter_text("clip");
//! println!("Page {} of {}", page.page, page.total_pages);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod http;
pub mod inventory;
pub mod scan;
pub mod session;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{Authenticator, InventoryApi};
pub use client::{RailtrackClient, RailtrackClientBuilder};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ClientError, ClientResult};
pub use events::{ClientEventEmitter, NoOpEmitter, Notification, NotificationLevel};
pub use http::HttpInventoryApi;
pub use inventory::{InventoryView, RefreshOutcome};
pub use scan::{CodeDecoder, DecodeError, ScanInput, ScanSession};
pub use session::{SessionHandle, SessionListener, SessionManager};
