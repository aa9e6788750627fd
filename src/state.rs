//! Observable session state - owned by the controller, readable by the host
//!
//! The resolver itself is stateless; everything a host UI might want to show
//! (capability, listening flag, last raw phrase) lives here, mutated only
//! from the controller's event handlers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub struct SessionState {
    /// Recognition capability exists on this host; computed once at startup
    supported: bool,
    /// A started session is currently delivering transcripts
    listening: AtomicBool,
    /// Most recent raw transcript, kept for observability
    last_transcript: Mutex<Option<String>>,
}

/// Type alias for shared state
pub type SharedState = Arc<SessionState>;

impl SessionState {
    pub fn new(supported: bool) -> Arc<Self> {
        Arc::new(Self {
            supported,
            listening: AtomicBool::new(false),
            last_transcript: Mutex::new(None),
        })
    }

    /// Whether any transcript source capability exists. When false, start
    /// controls should be disabled; this never changes at runtime.
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub(crate) fn set_listening(&self, listening: bool) {
        self.listening.store(listening, Ordering::SeqCst);
    }

    pub(crate) fn record_transcript(&self, text: &str) {
        *self.last_transcript.lock().unwrap() = Some(text.to_string());
    }

    pub fn last_transcript(&self) -> Option<String> {
        self.last_transcript.lock().unwrap().clone()
    }

    /// One-line status label in UI terms
    pub fn status(&self) -> &'static str {
        if !self.supported {
            "not supported"
        } else if self.is_listening() {
            "listening"
        } else {
            "idle"
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("supported", &self.supported)
            .field("listening", &self.is_listening())
            .field("last_transcript", &self.last_transcript())
            .finish()
    }
}
