//! Member directory loading from a TOML file.
//!
//! The scheduling sheet reports respondents by the name they entered, not by
//! Discord account. The directory maps those names to Discord user IDs so the
//! bot can mention the right people. It is loaded once at startup:
//!
//! ```toml
//! [members]
//! "Nao" = "1357919391747936276"
//! "Sana" = "960009003235176508"
//! ```

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{collections::HashMap, path::Path};

/// Raw layout of the directory file
#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    members: HashMap<String, String>,
}

/// Name to Discord user ID lookup table.
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    ids: HashMap<String, u64>,
}

impl MemberDirectory {
    /// Builds a directory from `(name, user id)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            ids: entries
                .into_iter()
                .map(|(name, id)| (name.into(), id))
                .collect(),
        }
    }

    /// Parses a directory from TOML text.
    ///
    /// # Errors
    /// Returns an error if the TOML is invalid or an ID is not a non-zero integer.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: DirectoryFile = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse member directory: {e}"),
        })?;

        let mut ids = HashMap::with_capacity(file.members.len());
        for (name, raw_id) in file.members {
            let id = raw_id
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(|| Error::Config {
                    message: format!("Member '{name}' has an invalid user ID: {raw_id}"),
                })?;
            ids.insert(name, id);
        }

        Ok(Self { ids })
    }

    /// Loads the directory from `path`, or returns an empty directory if the file
    /// does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            tracing::warn!(
                "Member directory {:?} not found, names will not be converted to mentions",
                path_ref
            );
            return Ok(Self::default());
        }

        tracing::debug!("Loading member directory from: {:?}", path_ref);
        let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
            message: format!("Failed to read member directory {path_ref:?}: {e}"),
        })?;
        let directory = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded {} member directory entries", directory.len());
        Ok(directory)
    }

    /// Looks up the user ID registered for `name`.
    #[must_use]
    pub fn user_id(&self, name: &str) -> Option<u64> {
        self.ids.get(name).copied()
    }

    /// Returns a Discord mention for `name`, or the name itself if unknown.
    #[must_use]
    pub fn mention_or_name(&self, name: &str) -> String {
        self.user_id(name)
            .map_or_else(|| name.to_string(), |id| format!("<@{id}>"))
    }

    /// Number of registered names
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the directory has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_member_directory() {
        let toml_str = r#"
            [members]
            "Nao" = "1357919391747936276"
            "Sana" = "960009003235176508"
        "#;

        let directory = MemberDirectory::from_toml_str(toml_str).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.user_id("Nao"), Some(1_357_919_391_747_936_276));
        assert_eq!(directory.user_id("Sana"), Some(960_009_003_235_176_508));
        assert_eq!(directory.user_id("Rio"), None);
    }

    #[test]
    fn test_missing_table_is_empty() {
        let directory = MemberDirectory::from_toml_str("").unwrap();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_invalid_id_rejected() {
        let toml_str = r#"
            [members]
            "Nao" = "not-a-number"
        "#;
        let result = MemberDirectory::from_toml_str(toml_str);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_mention_or_name() {
        let directory = MemberDirectory::new([("Nao", 42_u64)]);
        assert_eq!(directory.mention_or_name("Nao"), "<@42>");
        assert_eq!(directory.mention_or_name("Guest"), "Guest");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let directory = MemberDirectory::load("definitely/not/here/members.toml").unwrap();
        assert!(directory.is_empty());
    }
}
