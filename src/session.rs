//! Session controller - owns the source lifecycle and forwards commands
//!
//! Handles one source event at a time to completion: resolution never
//! overlaps, so neither the resolver nor the host callback needs locking.

use crate::command::{CommandEvent, PhraseTable, resolve};
use crate::source::{SourceEvent, TranscriptSource};
use crate::state::{SessionState, SharedState};
use flume::Receiver;
use tracing::{debug, warn};

/// Host notification callback, invoked once per resolved command event.
/// Must not block indefinitely or it stalls delivery of later transcripts.
pub type CommandCallback = Box<dyn FnMut(CommandEvent) + Send>;

pub struct SessionController {
    source: Option<Box<dyn TranscriptSource>>,
    events: Receiver<SourceEvent>,
    phrases: PhraseTable,
    state: SharedState,
    on_command: CommandCallback,
}

impl SessionController {
    /// `source: None` models a host with no recognition capability; the
    /// controller then reports "not supported" and `start` is disabled.
    pub fn new(
        source: Option<Box<dyn TranscriptSource>>,
        events: Receiver<SourceEvent>,
        phrases: PhraseTable,
        on_command: CommandCallback,
    ) -> Self {
        let state = SessionState::new(source.is_some());
        Self {
            source,
            events,
            phrases,
            state,
            on_command,
        }
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Begin acquisition. No-op when unsupported or already listening; a
    /// rejected start from the source is logged and swallowed, leaving the
    /// listening flag untouched.
    pub fn start(&mut self) {
        let Some(source) = self.source.as_mut() else {
            warn!("no transcript source on this host; start ignored");
            return;
        };
        if self.state.is_listening() {
            return;
        }
        match source.start() {
            Ok(()) => self.state.set_listening(true),
            Err(e) => warn!(error = %e, "transcript source refused to start"),
        }
    }

    /// Request cessation. Always safe, including before start; transcripts
    /// already queued may still be delivered and resolved afterwards.
    pub fn stop(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        if let Err(e) = source.stop() {
            warn!(error = %e, "transcript source refused to stop");
        }
        self.state.set_listening(false);
    }

    /// Drain source events until end-of-stream (or every sender is gone),
    /// resolving each transcript and notifying the host exactly once per
    /// transcript. Recognition errors are logged and skipped; they never end
    /// the session or leak to the host.
    pub fn run(&mut self) {
        while let Ok(event) = self.events.recv() {
            match event {
                SourceEvent::Transcript(text) => {
                    self.state.record_transcript(&text);
                    let event = resolve(&text, &self.phrases);
                    debug!(command = %event.command, phrase = %event.phrase, "resolved");
                    (self.on_command)(event);
                }
                SourceEvent::Error(e) => {
                    warn!(error = %e, "recognition error");
                }
                SourceEvent::End => break,
            }
        }
        // recognition halted on its own or the channel closed under us;
        // either way the session is over
        self.state.set_listening(false);
    }
}
