use crate::command::PhraseTable;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

// ============================================================================
// Commands Config
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct CommandsConfig {
    /// Custom phrase mappings, checked before built-in keywords.
    /// Order in the file is priority order.
    #[serde(default)]
    pub custom: Vec<CustomPhrase>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CustomPhrase {
    pub phrase: String,
    /// Arbitrary payload handed back to the host when the phrase matches
    #[serde(default)]
    pub meta: serde_json::Value,
}

// ============================================================================
// Source Config
// ============================================================================

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Read utterances from standard input, one per line (default)
    #[default]
    Stdin,
    /// No recognition capability on this host
    None,
}

#[derive(Debug, Deserialize, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        fs::read_to_string(path)
            .ok()
            .and_then(|s| match toml::from_str(&s) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed config");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Build the resolver's phrase table, preserving file order
    pub fn phrase_table(&self) -> PhraseTable {
        self.commands
            .custom
            .iter()
            .map(|c| (c.phrase.clone(), c.meta.clone()))
            .collect()
    }
}
