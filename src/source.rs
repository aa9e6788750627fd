//! Transcript sources - push-based producers of finalized utterances
//!
//! A source is handed a channel sender at construction and delivers
//! [`SourceEvent`]s into it from its own thread: one `Transcript` per
//! completed utterance, `Error` for non-fatal recognition faults, and `End`
//! exactly once when recognition halts. Cancellation is cooperative -
//! transcripts already queued may still be delivered and resolved after
//! `stop()` returns.

use flume::Sender;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// No recognition capability on this host; permanent
    #[error("no transcript source available")]
    Unavailable,
    /// Duplicate or concurrent start attempt
    #[error("source already started")]
    StartRejected,
    /// Mid-session recognition failure
    #[error("recognition failed: {0}")]
    Runtime(String),
    /// Stop requested on a source that never started
    #[error("source is not running")]
    StopFailed,
}

/// Notifications pushed by a transcript source
#[derive(Debug, PartialEq, Eq)]
pub enum SourceEvent {
    /// Finalized transcript for one completed utterance
    Transcript(String),
    /// Non-fatal recognition fault; the session continues
    Error(SourceError),
    /// Recognition halted, no further transcripts will follow
    End,
}

/// A push source of finalized transcripts
pub trait TranscriptSource: Send {
    fn start(&mut self) -> Result<(), SourceError>;
    fn stop(&mut self) -> Result<(), SourceError>;
}

/// Shared cessation flag for a running source.
///
/// Cloneable so a signal handler can request stop while the session loop
/// owns the source itself.
#[derive(Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    tx: Sender<SourceEvent>,
}

impl StopHandle {
    fn new(tx: Sender<SourceEvent>) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    fn begin(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request cessation and emit the end-of-stream notification.
    /// Idempotent: `End` is sent at most once per started session.
    pub fn request_stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            let _ = self.tx.send(SourceEvent::End);
        }
    }
}

// ============================================================================
// Scripted source
// ============================================================================

/// Replays a fixed sequence of events - the deterministic stand-in for a
/// speech recognizer, used by tests and the `replay` subcommand.
pub struct ScriptedSource {
    script: Vec<SourceEvent>,
    handle: StopHandle,
    started: bool,
}

impl ScriptedSource {
    pub fn new(script: Vec<SourceEvent>, tx: Sender<SourceEvent>) -> Self {
        Self {
            script,
            handle: StopHandle::new(tx),
            started: false,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.handle.clone()
    }
}

impl TranscriptSource for ScriptedSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.started {
            return Err(SourceError::StartRejected);
        }
        self.started = true;
        self.handle.begin();

        let script = std::mem::take(&mut self.script);
        let handle = self.handle.clone();
        thread::spawn(move || {
            for event in script {
                if !handle.is_running() {
                    break;
                }
                let is_end = matches!(event, SourceEvent::End);
                if handle.tx.send(event).is_err() {
                    return;
                }
                if is_end {
                    // script ended itself; don't emit a second End
                    handle.running.store(false, Ordering::SeqCst);
                    return;
                }
            }
            handle.request_stop();
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SourceError> {
        if !self.started {
            return Err(SourceError::StopFailed);
        }
        self.handle.request_stop();
        Ok(())
    }
}

// ============================================================================
// Line source
// ============================================================================

/// Turns lines of any reader (stdin, a file) into utterances.
///
/// Each line is trimmed before delivery and blank lines are skipped, the same
/// finalization a recognizer applies to raw results. EOF counts as the source
/// halting on its own.
pub struct LineSource<R> {
    reader: Option<R>,
    handle: StopHandle,
    started: bool,
}

impl<R: BufRead + Send + 'static> LineSource<R> {
    pub fn new(reader: R, tx: Sender<SourceEvent>) -> Self {
        Self {
            reader: Some(reader),
            handle: StopHandle::new(tx),
            started: false,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.handle.clone()
    }
}

impl<R: BufRead + Send + 'static> TranscriptSource for LineSource<R> {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.started {
            return Err(SourceError::StartRejected);
        }
        let Some(reader) = self.reader.take() else {
            return Err(SourceError::Unavailable);
        };
        self.started = true;
        self.handle.begin();

        let handle = self.handle.clone();
        thread::spawn(move || {
            for line in reader.lines() {
                if !handle.is_running() {
                    // stop() already emitted End; drop the rest
                    return;
                }
                match line {
                    Ok(text) => {
                        let text = text.trim();
                        if text.is_empty() {
                            continue;
                        }
                        if handle
                            .tx
                            .send(SourceEvent::Transcript(text.to_string()))
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(e) => {
                        let event = SourceEvent::Error(SourceError::Runtime(e.to_string()));
                        if handle.tx.send(event).is_err() {
                            return;
                        }
                    }
                }
            }
            handle.request_stop();
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SourceError> {
        if !self.started {
            return Err(SourceError::StopFailed);
        }
        self.handle.request_stop();
        Ok(())
    }
}
