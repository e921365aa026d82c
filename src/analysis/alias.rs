//! Developer alias mapping
//!
//! Committer names drift: the same person shows up as "jdoe", "John Doe"
//! and "john.doe@work". The alias file normalizes names before display,
//! one `name %>% alias` mapping per line. `#` starts a comment line and
//! the special alias `%ignore%` hides a developer from knowledge views.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

const SEPARATOR: &str = "%>%";
const IGNORE: &str = "%ignore%";

const FILE_HEADER: &str = "# Developer aliases, one mapping per line: name %>% alias\n\
                           # The alias %ignore% hides a developer from knowledge views.\n";

#[derive(Debug, Clone, Default)]
pub struct AliasMapping {
    aliases: BTreeMap<String, String>,
}

impl AliasMapping {
    /// Load the alias file. A missing file is an empty mapping; malformed
    /// lines are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no alias file at {}", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        let mut aliases = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, SEPARATOR);
            match (parts.next(), parts.next()) {
                (Some(name), Some(alias)) if !name.trim().is_empty() => {
                    aliases.insert(name.trim().to_string(), alias.trim().to_string());
                }
                _ => warn!("skipping malformed alias line: {line:?}"),
            }
        }
        Ok(Self { aliases })
    }

    /// Resolve a developer name: the alias when mapped, the name itself
    /// when not, `None` when the developer is ignored.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        match self.aliases.get(name) {
            Some(alias) if alias == IGNORE => None,
            Some(alias) => Some(alias),
            None => Some(name),
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Append default self-mappings for developers the file does not know yet.
///
/// Existing lines, comments included, are preserved verbatim; a missing
/// file is created with a short header. Returns how many entries were
/// appended.
pub fn refresh_defaults(path: &Path, developers: &BTreeSet<String>) -> Result<usize> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err).with_context(|| format!("failed to read {}", path.display())),
    };

    let known: BTreeSet<&str> = existing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.splitn(2, SEPARATOR).next())
        .map(str::trim)
        .collect();

    let mut text = if existing.is_empty() {
        FILE_HEADER.to_string()
    } else {
        existing.clone()
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    let mut appended = 0;
    for developer in developers {
        if developer.is_empty() || known.contains(developer.as_str()) {
            continue;
        }
        text.push_str(&format!("{developer} {SEPARATOR} {developer}\n"));
        appended += 1;
    }

    if appended > 0 || existing.is_empty() {
        std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if appended > 0 {
        debug!("added {appended} default aliases to {}", path.display());
    }
    Ok(appended)
}
