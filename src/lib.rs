//! voicenav - resolves transcribed speech phrases into host commands
//!
//! The core is [`command::resolve`]: a pure function from one transcript and
//! a custom phrase table to exactly one [`command::CommandEvent`]. Around it,
//! [`session::SessionController`] owns the start/stop lifecycle of a
//! pluggable [`source::TranscriptSource`] and forwards every resolved event
//! to a single host callback.

pub mod command;
pub mod config;
pub mod session;
pub mod source;
pub mod state;

pub use command::{CommandEvent, PhraseTable, UNKNOWN_COMMAND, resolve};
pub use session::{CommandCallback, SessionController};
pub use source::{
    LineSource, ScriptedSource, SourceError, SourceEvent, StopHandle, TranscriptSource,
};
pub use state::{SessionState, SharedState};
