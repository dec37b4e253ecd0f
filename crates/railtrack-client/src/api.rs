//! # Remote Collaborators
//!
//! The two async seams the client depends on: credential exchange and the
//! inventory record store. [`crate::http::HttpInventoryApi`] implements both
//! against the REST API; tests substitute in-memory fakes.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation          Method  Path                        Failure        │
//! │  ─────────          ──────  ────                        ───────        │
//! │  authenticate       POST    /login                      401 → Auth     │
//! │  fetch_all          GET     /components                                │
//! │  fetch_one          GET     /components/{id}            404 → NotFound │
//! │  create             POST    /components/add                            │
//! │  delete             DELETE  /components/delete/{id}     404 → NotFound │
//! │  generate_report    POST    /report/generate                           │
//! │                                                                         │
//! │  Any other 401 → Unauthorized (forces logout)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use railtrack_core::{ComponentReport, CreatedComponent, InventoryRecord, NewComponent};

use crate::error::ClientResult;

/// Exchanges credentials for an opaque session token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> ClientResult<String>;
}

/// Remote inventory record operations.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Lists every record.
    async fn fetch_all(&self) -> ClientResult<Vec<InventoryRecord>>;

    /// Fetches one record with all pass-through fields.
    async fn fetch_one(&self, id: &str) -> ClientResult<InventoryRecord>;

    /// Registers a component; the server assigns the identifier.
    async fn create(&self, component: &NewComponent) -> ClientResult<CreatedComponent>;

    async fn delete(&self, id: &str) -> ClientResult<()>;

    /// Asks the server to write a maintenance report for one record.
    async fn generate_report(&self, id: &str) -> ClientResult<ComponentReport>;
}

// =============================================================================
// Test Doubles
// =============================================================================

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::sync::oneshot;

    use super::*;
    use crate::error::ClientError;

    /// Accepts one username/password pair.
    pub(crate) struct FakeAuthenticator {
        pub(crate) username: String,
        pub(crate) password: String,
        pub(crate) token: String,
    }

    impl FakeAuthenticator {
        pub(crate) fn new(token: &str) -> Self {
            FakeAuthenticator {
                username: "admin".into(),
                password: "secret".into(),
                token: token.into(),
            }
        }
    }

    #[async_trait]
    impl Authenticator for FakeAuthenticator {
        async fn authenticate(&self, username: &str, password: &str) -> ClientResult<String> {
            if username == self.username && password == self.password {
                Ok(self.token.clone())
            } else {
                Err(ClientError::Auth("Bad username or password".into()))
            }
        }
    }

    /// In-memory inventory with scriptable failures.
    #[derive(Default)]
    pub(crate) struct FakeInventoryApi {
        records: Mutex<Vec<InventoryRecord>>,
        failures: Mutex<VecDeque<ClientError>>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeInventoryApi {
        pub(crate) fn with_records(records: Vec<InventoryRecord>) -> Self {
            FakeInventoryApi {
                records: Mutex::new(records),
                ..Default::default()
            }
        }

        pub(crate) fn set_records(&self, records: Vec<InventoryRecord>) {
            *self.records.lock().unwrap() = records;
        }

        /// The next call fails with `err`.
        pub(crate) fn fail_next(&self, err: ClientError) {
            self.failures.lock().unwrap().push_back(err);
        }

        /// The next call waits until `gate` fires, then completes (or fails).
        pub(crate) fn hold_next_call(&self, gate: oneshot::Receiver<()>) {
            *self.gate.lock().unwrap() = Some(gate);
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn begin(&self, call: String) -> ClientResult<()> {
            self.calls.lock().unwrap().push(call);
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            match self.failures.lock().unwrap().pop_front() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl InventoryApi for FakeInventoryApi {
        async fn fetch_all(&self) -> ClientResult<Vec<InventoryRecord>> {
            self.begin("fetch_all".into()).await?;
            Ok(self.records.lock().unwrap().clone())
        }

        async fn fetch_one(&self, id: &str) -> ClientResult<InventoryRecord> {
            self.begin(format!("fetch_one:{}", id)).await?;
            self.records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(id.to_string()))
        }

        async fn create(&self, component: &NewComponent) -> ClientResult<CreatedComponent> {
            self.begin("create".into()).await?;
            let id = format!("N{:03}", self.records.lock().unwrap().len());
            let record =
                InventoryRecord::new(&id, &component.component_type, &component.vendor_name)
                    .with_batch_no(&component.batch_no);
            self.records.lock().unwrap().push(record.clone());
            Ok(CreatedComponent {
                message: "Component created successfully".into(),
                component: record,
                svg_content: "<svg/>".into(),
                dxf_content: "0\nEOF".into(),
            })
        }

        async fn delete(&self, id: &str) -> ClientResult<()> {
            self.begin(format!("delete:{}", id)).await?;
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Err(ClientError::NotFound(id.to_string()));
            }
            Ok(())
        }

        async fn generate_report(&self, id: &str) -> ClientResult<ComponentReport> {
            self.begin(format!("report:{}", id)).await?;
            Ok(ComponentReport {
                report_text: format!("# Railway Component Maintenance Report\n\n`{}`", id),
            })
        }
    }
}
