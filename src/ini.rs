// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! INI document layout.
//!
//! EnderChest stores everything in INI files that lean heavily on the
//! __key-only__ idiom: a section whose keys are the data and whose values are
//! absent, e.g., a list of link folders or the OR'd values of a match
//! condition. Parsing is delegated to [`configparser`]. Writing goes through
//! [`Display`] so section and key order survive a rewrite untouched.
//!
//! Only `=` separates a key from its value, so a key-only entry such as
//! `foo:bar` stays whole. Indented lines continue the value above them.

use configparser::ini::Ini;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Section name [`configparser`] files unsectioned keys under.
///
/// No section header can produce it, so a real `[default]` section is kept.
const UNSECTIONED: &str = "\0unsectioned";

fn parser() -> Ini {
    let mut defaults = Ini::new_cs().defaults();
    defaults.default_section = UNSECTIONED.into();
    defaults.delimiters = vec!['='];
    defaults.multiline = true;
    Ini::new_from_defaults(defaults)
}

fn trimmed(entries: impl IntoIterator<Item = (String, Option<String>)>) -> Vec<(String, Option<String>)> {
    entries
        .into_iter()
        .map(|(key, value)| (key, value.map(|value| value.trim().to_string())))
        .collect()
}

/// Ordered INI document.
///
/// # Invariant
///
/// - Section order and key order match the order they were read or added in.
/// - Keys are case-sensitive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Construct new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document from INI text.
    ///
    /// # Errors
    ///
    /// - Return [`IniError::Parse`] if the text is not valid INI.
    /// - Return [`IniError::Unsectioned`] if entries appear before the first
    ///   section header.
    pub fn parse(data: &str) -> Result<Self> {
        let map = parser().read(data.to_string()).map_err(IniError::Parse)?;

        let mut sections = Vec::new();
        for (name, entries) in map {
            if name == UNSECTIONED {
                if let Some((key, _)) = entries.into_iter().next() {
                    return Err(IniError::Unsectioned { key });
                }
                continue;
            }

            sections.push(IniSection {
                name,
                entries: trimmed(entries),
            });
        }

        Ok(Self { sections })
    }

    /// Parse document that may hold unsectioned keys only.
    ///
    /// Some launchers write flat `key=value` files with no section header at
    /// all. Every entry is returned in one anonymous section.
    ///
    /// # Errors
    ///
    /// - Return [`IniError::Parse`] if the text is not valid INI.
    pub fn parse_flat(data: &str) -> Result<IniSection> {
        let map = parser().read(data.to_string()).map_err(IniError::Parse)?;
        let mut flat = IniSection::new("");
        for (_, entries) in map {
            flat.entries.extend(trimmed(entries));
        }

        Ok(flat)
    }

    /// All sections in order.
    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    /// Lookup section by name.
    pub fn section(&self, name: impl AsRef<str>) -> Option<&IniSection> {
        self.sections
            .iter()
            .find(|section| section.name == name.as_ref())
    }

    /// Append a section.
    pub fn push_section(&mut self, section: IniSection) {
        self.sections.push(section);
    }
}

impl Display for IniDocument {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(fmt)?;
            }
            write!(fmt, "{section}")?;
        }

        Ok(())
    }
}

/// One named section of an INI document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, Option<String>)>,
}

impl IniSection {
    /// Construct new empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Name of section.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys of section in order, ignoring values.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Value of key, if key is present and has a value.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key.as_ref())
            .and_then(|(_, value)| value.as_deref())
    }

    /// Add key with a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), Some(value.into())));
    }

    /// Add key with no value.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.entries.push((key.into(), None));
    }
}

impl Display for IniSection {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        writeln!(fmt, "[{}]", self.name)?;
        for (key, value) in &self.entries {
            match value {
                Some(value) => writeln!(fmt, "{key} = {value}")?,
                None => writeln!(fmt, "{key}")?,
            }
        }

        Ok(())
    }
}

/// INI parsing error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum IniError {
    /// Text is not valid INI.
    #[error("invalid INI: {0}")]
    Parse(String),

    /// Entry was found outside of any section.
    #[error("entry {key:?} does not belong to any section")]
    Unsectioned { key: String },
}

/// Friendly result alias :3
pub type Result<T, E = IniError> = std::result::Result<T, E>;
