//! Alias management
//!
//! Maps a user-chosen short name to a key. Aliases only annotate log output
//! and let commands take `@name` instead of the key; correlation itself is
//! always keyed.

use crate::result::{NetwaitError, NetwaitResult};
use std::collections::HashMap;

/// Alias → key map for the current test
#[derive(Debug, Clone, Default)]
pub struct AliasManager {
    aliases: HashMap<String, String>,
}

impl AliasManager {
    /// Create an empty alias map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `alias` at `key`, replacing any earlier mapping
    ///
    /// A leading `@` on the alias is ignored.
    pub fn set_alias(&mut self, alias: &str, key: &str) {
        let alias = alias.trim_start_matches('@');
        if let Some(previous) = self.aliases.insert(alias.to_string(), key.to_string()) {
            if previous != key {
                tracing::debug!(alias, from = %previous, to = key, "alias re-pointed");
            }
        }
    }

    /// Key currently behind `alias`
    #[must_use]
    pub fn key_for(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(alias.trim_start_matches('@'))
            .map(String::as_str)
    }

    /// Alias pointing at `key`, alphabetically first when several do
    #[must_use]
    pub fn alias_for(&self, key: &str) -> Option<&str> {
        let mut found = self
            .aliases
            .iter()
            .filter(|(_, k)| k.as_str() == key)
            .map(|(alias, _)| alias.as_str())
            .collect::<Vec<_>>();
        found.sort_unstable();
        found.into_iter().next()
    }

    /// Resolve a command argument: `@alias` goes through the map, anything
    /// else is taken as a key
    pub fn resolve(&self, alias_or_key: &str) -> NetwaitResult<String> {
        match alias_or_key.strip_prefix('@') {
            Some(alias) => {
                self.key_for(alias)
                    .map(str::to_string)
                    .ok_or_else(|| NetwaitError::AliasNotFound {
                        alias: alias.to_string(),
                    })
            }
            None => Ok(alias_or_key.to_string()),
        }
    }

    /// Alias-annotated label for diagnostics: `@todos — GET https://...`
    #[must_use]
    pub fn describe(&self, key: &str) -> String {
        let readable = key.replacen(':', " ", 1);
        match self.alias_for(key) {
            Some(alias) => format!("@{alias} — {readable}"),
            None => readable,
        }
    }

    /// Number of aliases
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no alias is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
