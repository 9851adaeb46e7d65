//! Localized message catalogs
//!
//! Catalogs use the `.properties` layout the console ships
//! (`key = value`, `#`/`!` comments, `{0}` positional placeholders).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Message keys used by the launch configuration sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    CreateSuccess,
    CreateError,
    DeleteSuccess,
    DeleteError,
    /// Generic detail for failures without a structured cause
    UndefinedError,
}

impl MessageKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageKey::CreateSuccess => "create_launch_config_run_success",
            MessageKey::CreateError => "create_launch_config_run_error",
            MessageKey::DeleteSuccess => "delete_launch_config_success",
            MessageKey::DeleteError => "delete_launch_config_error",
            MessageKey::UndefinedError => "undefined_error",
        }
    }
}

/// Resolves a message key plus positional arguments to display text
pub trait MessageCatalog: Send + Sync {
    fn prop(&self, key: &str, args: &[&str]) -> String;
}

/// Catalog loading error
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read message catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const ENGLISH: &str = r#"
# Launch configurations
create_launch_config_run_success = Successfully created launch configuration {0}
create_launch_config_run_error = Failed to create launch configuration {0}
delete_launch_config_success = Successfully deleted launch configuration {0}
delete_launch_config_error = Failed to delete launch configuration {0}
undefined_error = An unknown error occurred
"#;

/// In-memory `.properties` catalog
#[derive(Debug, Clone, Default)]
pub struct PropertiesCatalog {
    entries: HashMap<String, String>,
}

impl PropertiesCatalog {
    /// Built-in English messages
    pub fn english() -> Self {
        Self::parse(ENGLISH)
    }

    /// Load a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse `.properties` text
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut pending = String::new();

        for raw in text.lines() {
            let line = raw.trim_start();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            // Odd number of trailing backslashes continues onto the next line
            let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
            if trailing % 2 == 1 {
                pending.push_str(&line[..line.len() - 1]);
                continue;
            }
            pending.push_str(line);

            if let Some((key, value)) = split_entry(&pending) {
                entries.insert(unescape(key), unescape(value));
            }
            pending.clear();
        }
        if let Some((key, value)) = split_entry(&pending) {
            entries.insert(unescape(key), unescape(value));
        }

        Self { entries }
    }

    /// Override entries with those of `other`
    pub fn merge(mut self, other: PropertiesCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MessageCatalog for PropertiesCatalog {
    fn prop(&self, key: &str, args: &[&str]) -> String {
        match self.entries.get(key) {
            Some(template) => format_placeholders(template, args),
            None => {
                tracing::warn!(key, "Message key not found in catalog");
                format!("[{}]", key)
            }
        }
    }
}

/// Split at the first unescaped `=` or `:`
fn split_entry(line: &str) -> Option<(&str, &str)> {
    if line.trim().is_empty() {
        return None;
    }
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' | ':' if !escaped => {
                return Some((line[..i].trim_end(), line[i + 1..].trim_start()));
            }
            _ => escaped = false,
        }
    }
    Some((line.trim_end(), ""))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Replace `{N}` with `args[N]`; unknown placeholders are left as-is
fn format_placeholders(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let substituted = after.find('}').and_then(|end| {
            let index: usize = after[..end].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, end))
        });
        match substituted {
            Some((arg, end)) => {
                out.push_str(arg);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
