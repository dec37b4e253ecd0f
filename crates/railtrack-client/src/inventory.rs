//! # Inventory View
//!
//! Drives the database page: keeps the latest snapshot in an
//! [`InventoryTable`], runs every remote call behind the access guard, and
//! publishes the visible page to subscribers.
//!
//! ## Refresh Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  refresh()                                                             │
//! │  ├── 1. AccessGuard::check(Database)                                   │
//! │  │       Redirect → clear table, navigate(Login), Err(Unauthenticated) │
//! │  │                  NO request is sent                                 │
//! │  ├── 2. remember session epoch                                         │
//! │  ├── 3. InventoryApi::fetch_all().await                                │
//! │  ├── 4. epoch changed?  → Discarded (result or error dropped)          │
//! │  └── 5. table.replace_records() → publish page → Updated               │
//! │                                                                         │
//! │  Failures                                                              │
//! │  ├── Unauthorized → SessionManager::force_logout(), table cleared      │
//! │  └── anything else → one error Notification                            │
//! │                                                                         │
//! │  delete / lookup / report / register follow the same epoch rule and   │
//! │  return SessionChanged instead of Discarded.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A view shared through [`InventoryView::into_shared`] also empties itself
//! whenever the session ends, so nothing from the previous session stays on
//! screen.

use std::sync::{Arc, PoisonError, RwLock};

use railtrack_core::validation::{validate_component_form, validate_component_id};
use railtrack_core::{
    AccessGuard, ComponentForm, ComponentReport, CreatedComponent, GuardDecision,
    InventoryRecord, InventorySummary, InventoryTable, Page, QuerySpec, Route, SortField,
    SortIndicator,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::InventoryApi;
use crate::error::{ClientError, ClientResult};
use crate::events::{ClientEventEmitter, NoOpEmitter, Notification};
use crate::session::{SessionListener, SessionManager};

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was replaced.
    Updated,
    /// The session changed while the fetch was in flight; the result was dropped.
    Discarded,
}

/// Client-side state and actions of the inventory table.
pub struct InventoryView {
    api: Arc<dyn InventoryApi>,
    sessions: Arc<SessionManager>,
    table: RwLock<InventoryTable>,
    page_tx: watch::Sender<Page<InventoryRecord>>,
    emitter: Arc<dyn ClientEventEmitter>,
}

impl InventoryView {
    pub fn new(api: Arc<dyn InventoryApi>, sessions: Arc<SessionManager>, page_size: usize) -> Self {
        let (page_tx, _) = watch::channel(Page::empty());
        InventoryView {
            api,
            sessions,
            table: RwLock::new(InventoryTable::new(page_size)),
            page_tx,
            emitter: Arc::new(NoOpEmitter),
        }
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn ClientEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Wraps the view in an `Arc` and clears it on every logout.
    pub fn into_shared(self) -> Arc<Self> {
        let view = Arc::new(self);
        let listener: Arc<dyn SessionListener> = view.clone();
        view.sessions.add_listener(Arc::downgrade(&listener));
        view
    }

    // =========================================================================
    // Observed State
    // =========================================================================

    /// The page currently on screen.
    pub fn page(&self) -> Page<InventoryRecord> {
        self.page_tx.borrow().clone()
    }

    /// Watches the visible page. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Page<InventoryRecord>> {
        self.page_tx.subscribe()
    }

    pub fn spec(&self) -> QuerySpec {
        self.read(|table| table.spec().clone())
    }

    pub fn sort_indicator(&self, field: SortField) -> SortIndicator {
        self.read(|table| table.sort_indicator(field))
    }

    pub fn has_next(&self) -> bool {
        self.read(|table| table.has_next())
    }

    pub fn has_previous(&self) -> bool {
        self.read(|table| table.has_previous())
    }

    /// A record from the current snapshot, without a remote call.
    pub fn cached(&self, id: &str) -> ClientResult<InventoryRecord> {
        Ok(self.read(|table| table.get(id).cloned())?)
    }

    /// Dashboard statistics over the current snapshot.
    pub fn summary(&self) -> InventorySummary {
        self.read(|table| InventorySummary::from_records(table.records()))
    }

    // =========================================================================
    // Table Interactions
    // =========================================================================

    pub fn set_filter_text(&self, text: impl Into<String>) -> Page<InventoryRecord> {
        let text = text.into();
        self.update(move |table| {
            table.set_filter_text(text);
        })
    }

    pub fn request_sort(&self, field: SortField) -> Page<InventoryRecord> {
        self.update(|table| {
            table.request_sort(field);
        })
    }

    /// Header click by column name; unknown names sort by id ascending.
    pub fn request_sort_column(&self, column: &str) -> Page<InventoryRecord> {
        self.update(|table| {
            table.request_sort_column(column);
        })
    }

    pub fn go_to_page(&self, n: usize) -> Page<InventoryRecord> {
        self.update(|table| {
            table.go_to_page(n);
        })
    }

    pub fn next_page(&self) -> Page<InventoryRecord> {
        self.update(|table| {
            table.next_page();
        })
    }

    pub fn previous_page(&self) -> Page<InventoryRecord> {
        self.update(|table| {
            table.previous_page();
        })
    }

    /// Drops the snapshot and resets the query.
    pub fn clear(&self) {
        self.update(|table| table.clear());
    }

    // =========================================================================
    // Remote Actions
    // =========================================================================

    /// Re-fetches the full inventory.
    pub async fn refresh(&self) -> ClientResult<RefreshOutcome> {
        let epoch = self.enter(Route::Database)?;

        let result = self.api.fetch_all().await;
        if self.is_stale(epoch) {
            info!(ok = result.is_ok(), "Session changed during fetch, dropping result");
            return Ok(RefreshOutcome::Discarded);
        }

        let records = result.map_err(|e| self.fail(e))?;
        let count = records.len();
        self.update(move |table| {
            table.replace_records(records);
        });
        debug!(count, "Inventory snapshot replaced");
        Ok(RefreshOutcome::Updated)
    }

    /// Deletes a record remotely, then removes it locally without re-fetching.
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let id = validate_component_id(id).map_err(|e| self.fail(e.into()))?;
        let epoch = self.enter(Route::Database)?;

        let result = self.api.delete(&id).await;
        self.settle(epoch, result)?;

        let mut removed = false;
        self.update(|table| removed = table.remove_record(&id));
        info!(id = %id, removed, "Component deleted");

        self.emitter
            .notify(&Notification::success(format!("Component {} deleted.", id)));
        Ok(())
    }

    /// Fetches one record for the details view.
    pub async fn lookup(&self, id: &str) -> ClientResult<InventoryRecord> {
        let id = validate_component_id(id).map_err(|e| self.fail(e.into()))?;
        let epoch = self.enter(Route::ComponentDetails(id.clone()))?;

        let result = self.api.fetch_one(&id).await;
        self.settle(epoch, result)
    }

    /// Asks the server for a maintenance report on one record.
    pub async fn report(&self, id: &str) -> ClientResult<ComponentReport> {
        let id = validate_component_id(id).map_err(|e| self.fail(e.into()))?;
        let epoch = self.enter(Route::ComponentDetails(id.clone()))?;

        let result = self.api.generate_report(&id).await;
        self.settle(epoch, result)
    }

    /// Validates the registration form and creates the component remotely.
    ///
    /// The snapshot is not touched; the next refresh lists the new record.
    pub async fn register(&self, form: &ComponentForm) -> ClientResult<CreatedComponent> {
        let payload = validate_component_form(form).map_err(|e| self.fail(e.into()))?;
        let epoch = self.enter(Route::AddComponent)?;

        let result = self.api.create(&payload).await;
        let created = self.settle(epoch, result)?;
        info!(id = %created.component_id(), "Component registered");

        self.emitter.notify(&Notification::success(format!(
            "Component registered with ID {}",
            created.component_id()
        )));
        Ok(created)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Runs the access guard before any side effect. Returns the session epoch.
    fn enter(&self, route: Route) -> ClientResult<u64> {
        let (session, epoch) = self.sessions.session().snapshot();

        match AccessGuard::check(route, &session) {
            GuardDecision::Render(_) => Ok(epoch),
            GuardDecision::Redirect(target) => {
                debug!("Not logged in, redirecting before fetch");
                self.clear();
                self.emitter.navigate(&target);
                Err(ClientError::Unauthenticated)
            }
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.sessions.session().epoch() != epoch
    }

    /// Drops a result that outlived its session, otherwise routes failures.
    fn settle<T>(&self, epoch: u64, result: ClientResult<T>) -> ClientResult<T> {
        if self.is_stale(epoch) {
            debug!(epoch, ok = result.is_ok(), "Session changed during request, dropping result");
            return Err(ClientError::SessionChanged);
        }
        result.map_err(|e| self.fail(e))
    }

    /// Routes a failure: 401 ends the session, anything else is shown once.
    fn fail(&self, err: ClientError) -> ClientError {
        if err.forces_logout() {
            warn!("Server rejected session token");
            self.sessions.force_logout();
            self.clear();
        } else {
            warn!(error = %err, "Inventory action failed");
            self.emitter.notify(&Notification::error(err.user_message()));
        }
        err
    }

    fn read<T>(&self, f: impl FnOnce(&InventoryTable) -> T) -> T {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        f(&table)
    }

    fn update(&self, f: impl FnOnce(&mut InventoryTable)) -> Page<InventoryRecord> {
        let page = {
            let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut table);
            table.page().clone()
        };
        self.page_tx.send_replace(page.clone());
        page
    }
}

impl SessionListener for InventoryView {
    fn session_ended(&self) {
        debug!("Session ended, clearing inventory view");
        self.clear();
    }
}
