//! Command resolution - maps a finalized transcript to exactly one command
//!
//! Resolution runs in priority order:
//! 1. Custom phrases - caller-supplied, matched by case-insensitive substring
//! 2. Built-in keywords - fixed rule table, case-insensitive whole-word regex
//! 3. Unknown - nothing matched
//!
//! The two tiers deliberately match differently: a custom key like "go" hits
//! any transcript containing "go" anywhere (including inside "forgot"), while
//! built-in keywords are word-boundary anchored ("nextel" does not trigger
//! `next`). Both behaviors are load-bearing for hosts that tuned their phrase
//! tables around them.

use regex::RegexBuilder;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

/// Canonical command name emitted when no tier matched
pub const UNKNOWN_COMMAND: &str = "unknown";

/// Built-in keyword rules, evaluated in order; first match wins
static KEYWORD_RULES: LazyLock<Vec<(regex::Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bnext\b", "next"),
        (r"\b(previous|back|prev)\b", "previous"),
        (r"\b(start|play)\b", "start"),
        (r"\b(stop|pause)\b", "stop"),
        (r"\bopen\b", "open"),
        (r"\bclose\b", "close"),
        (r"\b(help|what can i say)\b", "help"),
    ]
    .into_iter()
    .map(|(pattern, command)| {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap();
        (re, command)
    })
    .collect()
});

/// One resolved command, handed to the host exactly once per transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEvent {
    /// Custom phrase key, canonical keyword name, or [`UNKNOWN_COMMAND`]
    pub command: String,
    /// The original transcript, unmodified
    pub phrase: String,
    /// Metadata from the phrase table; set only when a custom phrase matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Custom phrase table: phrase key -> opaque metadata
///
/// Insertion order is the tie-break: when two keys are both contained in a
/// transcript, the one inserted earlier wins. Keys are matched as plain
/// lowercased substrings of the lowercased transcript.
#[derive(Debug, Clone, Default)]
pub struct PhraseTable {
    entries: Vec<PhraseEntry>,
}

#[derive(Debug, Clone)]
struct PhraseEntry {
    key: String,
    key_lower: String,
    meta: Value,
}

impl PhraseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phrase. Lookup scans front to back, so re-inserting an
    /// existing key leaves the earlier entry in charge.
    pub fn insert(&mut self, key: impl Into<String>, meta: Value) {
        let key = key.into();
        let key_lower = key.to_lowercase();
        self.entries.push(PhraseEntry {
            key,
            key_lower,
            meta,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for PhraseTable {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut table = PhraseTable::new();
        for (key, meta) in iter {
            table.insert(key, meta);
        }
        table
    }
}

/// Resolve a transcript to a command event.
///
/// Total over all string inputs: never fails, never panics, and returns
/// exactly one event. Custom phrases take absolute priority over built-in
/// keywords; built-in keywords are tested against the original-case
/// transcript (the rules carry their own case-insensitivity), custom phrases
/// against a lowercased copy.
pub fn resolve(transcript: &str, phrases: &PhraseTable) -> CommandEvent {
    let lowered = transcript.to_lowercase();

    for entry in &phrases.entries {
        if lowered.contains(&entry.key_lower) {
            return CommandEvent {
                command: entry.key.clone(),
                phrase: transcript.to_string(),
                meta: Some(entry.meta.clone()),
            };
        }
    }

    for (re, command) in KEYWORD_RULES.iter() {
        if re.is_match(transcript) {
            return CommandEvent {
                command: (*command).to_string(),
                phrase: transcript.to_string(),
                meta: None,
            };
        }
    }

    CommandEvent {
        command: UNKNOWN_COMMAND.to_string(),
        phrase: transcript.to_string(),
        meta: None,
    }
}
