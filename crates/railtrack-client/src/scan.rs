//! # Scan Session
//!
//! Turns a camera frame or an uploaded image into the details route of the
//! component whose code it shows. Decoding itself is an external capability
//! behind [`CodeDecoder`].
//!
//! ```text
//!            start()                      submit(frame) ok
//!  Closed ───────────► Open ─────────────────────────────────► Closed
//!    ▲                  │  ▲                                  + navigate(ComponentDetails)
//!    └──── stop() ──────┘  └── submit(frame) fails: stays Open
//!
//!  submit(upload) works in either state.
//! ```

use std::sync::Arc;

use railtrack_core::validation::validate_component_id;
use railtrack_core::Route;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::events::{ClientEventEmitter, NoOpEmitter, Notification};

/// The decoder found no readable code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        ClientError::Decode(err.0)
    }
}

/// Image input for the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    /// A frame from the live camera feed.
    CameraFrame(Vec<u8>),
    /// An image file picked by the user.
    Upload { file_name: String, bytes: Vec<u8> },
}

impl ScanInput {
    fn is_camera_frame(&self) -> bool {
        matches!(self, ScanInput::CameraFrame(_))
    }
}

/// External "image → text" capability.
pub trait CodeDecoder: Send + Sync {
    fn decode(&self, input: &ScanInput) -> Result<String, DecodeError>;
}

/// Camera / upload scanning state.
pub struct ScanSession {
    decoder: Arc<dyn CodeDecoder>,
    emitter: Arc<dyn ClientEventEmitter>,
    active: bool,
}

impl ScanSession {
    pub fn new(decoder: Arc<dyn CodeDecoder>) -> Self {
        ScanSession {
            decoder,
            emitter: Arc::new(NoOpEmitter),
            active: false,
        }
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn ClientEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Opens the camera session.
    pub fn start(&mut self) {
        if !self.active {
            debug!("Scan session started");
        }
        self.active = true;
    }

    /// Closes the camera session.
    pub fn stop(&mut self) {
        if self.active {
            debug!("Scan session stopped");
        }
        self.active = false;
    }

    /// Decodes one input.
    ///
    /// Returns `Ok(None)` for a camera frame that arrives after the session
    /// closed. A decode failure leaves the session open so scanning can go on.
    pub fn submit(&mut self, input: &ScanInput) -> ClientResult<Option<Route>> {
        if input.is_camera_frame() && !self.active {
            return Ok(None);
        }

        let decoded = match self.decoder.decode(input) {
            Ok(text) => text,
            Err(e) => return Err(self.reject(e)),
        };

        let id = match validate_component_id(&decoded) {
            Ok(id) => id,
            Err(_) if decoded.trim().is_empty() => {
                return Err(self.reject(DecodeError("empty code".into())))
            }
            Err(e) => return Err(self.reject(DecodeError(format!("not a component code: {}", e)))),
        };

        self.stop();
        let route = Route::ComponentDetails(id);
        info!(path = %route.path(), "Code scanned");
        self.emitter.navigate(&route);
        Ok(Some(route))
    }

    fn reject(&self, err: DecodeError) -> ClientError {
        debug!(reason = %err, "Decode failed");
        let err = ClientError::from(err);
        self.emitter.notify(&Notification::error(err.user_message()));
        err
    }
}
