//! Domain classification tables
//!
//! Reference data consulted by the email checker: an allow-list of provider
//! patterns, a block-list of disposable-mail domains, and a typo-correction
//! map. Built once at startup and never mutated afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Free-mail providers plus institutional/company suffix patterns
const LEGITIMATE: &[&str] = &[
    // Free email providers
    "gmail.com",
    "googlemail.com",
    "google.com",
    "outlook.com",
    "hotmail.com",
    "live.com",
    "msn.com",
    "yahoo.com",
    "ymail.com",
    "rocketmail.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "protonmail.com",
    "proton.me",
    "zoho.com",
    "gmx.com",
    "yandex.com",
    "mail.com",
    // Business/education patterns (matched as substrings)
    "edu",
    "ac.",
    "gov",
    "org",
    "co.",
    "inc.",
    "ltd",
    "corp",
];

/// Known temporary/throwaway providers
const DISPOSABLE: &[&str] = &[
    "tempmail.com",
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "trashmail.com",
    "throwawaymail.com",
    "temp-mail.org",
    "fakeinbox.com",
    "yopmail.com",
    "getairmail.com",
    "maildrop.cc",
    "sharklasers.com",
];

/// Misspelled domain -> intended domain
const TYPOS: &[(&str, &str)] = &[
    ("gamil.com", "gmail.com"),
    ("gmial.com", "gmail.com"),
    ("gmal.com", "gmail.com"),
    ("gmil.com", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("gmail.co", "gmail.com"),
    ("gmail.cm", "gmail.com"),
    ("outlook.co", "outlook.com"),
    ("hotmail.co", "hotmail.com"),
    ("yahoo.co", "yahoo.com"),
    ("yaho.com", "yahoo.com"),
];

/// Immutable lookup tables injected into a [`super::Validator`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainTables {
    /// Substring patterns identifying legitimate providers
    #[serde(default)]
    pub legitimate: Vec<String>,
    /// Substrings identifying disposable-mail domains
    #[serde(default)]
    pub disposable: Vec<String>,
    /// Exact misspelled domain -> canonical domain
    #[serde(default)]
    pub typos: BTreeMap<String, String>,
}

impl Default for DomainTables {
    fn default() -> Self {
        Self {
            legitimate: LEGITIMATE.iter().map(|s| s.to_string()).collect(),
            disposable: DISPOSABLE.iter().map(|s| s.to_string()).collect(),
            typos: TYPOS
                .iter()
                .map(|(typo, fixed)| (typo.to_string(), fixed.to_string()))
                .collect(),
        }
    }
}

impl DomainTables {
    /// Empty tables: every well-shaped address passes
    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            legitimate: Vec::new(),
            disposable: Vec::new(),
            typos: BTreeMap::new(),
        }
    }

    /// Tables from `path` when given, otherwise the built-in set
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load replacement tables from a TOML file
    ///
    /// ```toml
    /// legitimate = ["gmail.com", "edu"]
    /// disposable = ["mailinator.com"]
    ///
    /// [typos]
    /// "gamil.com" = "gmail.com"
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read domain tables {}", path.display()))?;
        let tables: DomainTables = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse domain tables {}", path.display()))?;
        Ok(tables.normalized())
    }

    /// Lower-case every entry; matching happens against lower-cased domains
    pub fn normalized(self) -> Self {
        Self {
            legitimate: self
                .legitimate
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
            disposable: self
                .disposable
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
            typos: self
                .typos
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
                .collect(),
        }
    }

    /// True if the domain contains any block-listed substring
    pub fn is_disposable(&self, domain: &str) -> bool {
        self.disposable
            .iter()
            .filter(|entry| !entry.is_empty())
            .any(|entry| domain.contains(entry.as_str()))
    }

    /// Canonical spelling for a known misspelled domain
    pub fn correction_for(&self, domain: &str) -> Option<&str> {
        self.typos.get(domain).map(String::as_str)
    }

    /// Substring match in either direction against the allow-list
    pub fn is_legitimate(&self, domain: &str) -> bool {
        self.legitimate
            .iter()
            .any(|entry| domain.contains(entry.as_str()) || entry.contains(domain))
    }

    /// Table sizes for startup logging
    pub fn summary(&self) -> String {
        format!(
            "{} allowed, {} disposable, {} typos",
            self.legitimate.len(),
            self.disposable.len(),
            self.typos.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_sizes() {
        let tables = DomainTables::default();
        assert_eq!(tables.legitimate.len(), 27);
        assert_eq!(tables.disposable.len(), 12);
        assert_eq!(tables.typos.len(), 11);
    }

    #[test]
    fn test_disposable_is_substring_match() {
        let tables = DomainTables::default();
        assert!(tables.is_disposable("mailinator.com"));
        assert!(tables.is_disposable("eu.mailinator.com"));
        assert!(!tables.is_disposable("gmail.com"));
    }

    #[test]
    fn test_legitimate_matches_both_directions() {
        let tables = DomainTables::default();
        // domain contains entry
        assert!(tables.is_legitimate("cs.stanford.edu"));
        // entry contains domain
        assert!(tables.is_legitimate("mail.co"));
        assert!(!tables.is_legitimate("my-custom-startup.io"));
    }

    #[test]
    fn test_correction_is_exact_match() {
        let tables = DomainTables::default();
        assert_eq!(tables.correction_for("gamil.com"), Some("gmail.com"));
        assert_eq!(tables.correction_for("x.gamil.com"), None);
    }

    #[test]
    fn test_from_file_normalizes_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        std::fs::write(
            &path,
            r#"
legitimate = ["Example.COM"]
disposable = ["Junk.Mail"]

[typos]
"Exmaple.com" = "Example.com"
"#,
        )
        .unwrap();

        let tables = DomainTables::from_file(&path).unwrap();
        assert_eq!(tables.legitimate, vec!["example.com"]);
        assert_eq!(tables.disposable, vec!["junk.mail"]);
        assert_eq!(tables.correction_for("exmaple.com"), Some("example.com"));
    }

    #[test]
    fn test_load_without_path_is_builtin() {
        assert_eq!(DomainTables::load(None).unwrap(), DomainTables::default());
    }

    #[test]
    fn test_load_with_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domains.toml");
        std::fs::write(&path, "disposable = [\"Junk.Mail\"]\n").unwrap();

        let tables = DomainTables::load(Some(path.as_path())).unwrap();
        assert_eq!(tables.disposable, vec!["junk.mail"]);
        assert!(DomainTables::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_from_file_missing_sections_default_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        std::fs::write(&path, "disposable = [\"junk.mail\"]\n").unwrap();

        let tables = DomainTables::from_file(&path).unwrap();
        assert!(tables.legitimate.is_empty());
        assert!(tables.typos.is_empty());
        assert!(tables.is_disposable("junk.mail"));
    }
}
