// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Minecraft instance specification.
//!
//! An __instance__ is one independent game installation with its own tree of
//! mutable state, i.e., its own `.minecraft` folder. EnderChest never mutates
//! an [`InstanceSpec`] in place. Changes always produce a new value through
//! the `with_*` methods.

use crate::{ini::IniSection, version::normalize_version};

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Specification of a Minecraft instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    name: String,
    root: PathBuf,
    minecraft_versions: Vec<String>,
    modloader: Option<String>,
    tags: BTreeSet<String>,
}

impl InstanceSpec {
    /// Construct new instance specification.
    ///
    /// Versions of the form `MAJOR.MINOR` are normalized to `MAJOR.MINOR.0`.
    ///
    /// # Errors
    ///
    /// - Return [`InstanceError::NoVersions`] if no versions are given.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        minecraft_versions: impl IntoIterator<Item = impl AsRef<str>>,
        modloader: Option<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let name = name.into();
        let minecraft_versions = minecraft_versions
            .into_iter()
            .map(|version| normalize_version(version.as_ref().trim()))
            .filter(|version| !version.is_empty())
            .collect::<Vec<_>>();

        if minecraft_versions.is_empty() {
            return Err(InstanceError::NoVersions { name });
        }

        Ok(Self {
            name,
            root: root.into(),
            minecraft_versions,
            modloader: modloader.filter(|loader| !loader.trim().is_empty()),
            tags: tags.into_iter().map(Into::into).collect(),
        })
    }

    /// Parse instance from its section of the instance registry.
    ///
    /// The section name is the instance name. Keys:
    ///
    /// - `root` (required): path to the instance's game folder.
    /// - `minecraft_version` (required): whitespace-separated versions.
    /// - `modloader` (optional): display name of the mod loader.
    /// - `tags` (optional): comma or newline separated labels.
    ///
    /// # Errors
    ///
    /// - Return [`InstanceError::MissingKey`] if a required key is absent.
    /// - Return [`InstanceError::NoVersions`] if no versions are listed.
    pub fn from_section(section: &IniSection) -> Result<Self> {
        let name = section.name();
        let missing = |key: &'static str| InstanceError::MissingKey {
            name: name.to_string(),
            key,
        };

        let root = section.get("root").ok_or_else(|| missing("root"))?;
        let versions = section
            .get("minecraft_version")
            .ok_or_else(|| missing("minecraft_version"))?;
        let tags = section
            .get("tags")
            .unwrap_or_default()
            .split([',', '\n'])
            .map(str::trim)
            .filter(|tag| !tag.is_empty());

        Self::new(
            name,
            root.trim(),
            versions.split_whitespace(),
            section.get("modloader").map(|loader| loader.trim().to_string()),
            tags,
        )
    }

    /// Render instance as a registry section.
    pub fn to_section(&self) -> IniSection {
        let mut section = IniSection::new(&self.name);
        section.set("root", self.root.to_string_lossy());
        section.set("minecraft_version", self.minecraft_versions.join(" "));
        if let Some(modloader) = &self.modloader {
            section.set("modloader", modloader);
        }
        if !self.tags.is_empty() {
            section.set("tags", self.tags.iter().cloned().collect::<Vec<_>>().join(", "));
        }

        section
    }

    /// Display name of instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path to game folder, relative to a minecraft root when possible.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Game versions of instance, never empty.
    pub fn minecraft_versions(&self) -> &[String] {
        &self.minecraft_versions
    }

    /// Display name of mod loader, [`None`] for vanilla.
    pub fn modloader(&self) -> Option<&str> {
        self.modloader.as_deref()
    }

    /// Labels assigned to instance.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Copy of instance under a new name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy of instance at a new root.
    pub fn with_root(&self, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..self.clone()
        }
    }

    /// Copy of instance with a different tag set.
    pub fn with_tags(&self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    /// Absolute location of game folder.
    ///
    /// Performs shell expansion on the stored root, then joins it onto the
    /// minecraft root. Absolute roots are left as is.
    ///
    /// # Errors
    ///
    /// - Return [`InstanceError::ShellExpansion`] if expansion fails.
    pub fn resolve_root(&self, minecraft_root: impl AsRef<Path>) -> Result<PathBuf> {
        let raw = self.root.to_string_lossy();
        let expanded = shellexpand::full(raw.as_ref()).map_err(|err| {
            InstanceError::ShellExpansion {
                name: self.name.clone(),
                source: err,
            }
        })?;

        Ok(minecraft_root.as_ref().join(expanded.into_owned()))
    }

    /// Determine whether two instances point to the same location.
    ///
    /// Roots are resolved against the minecraft root and canonicalized when
    /// they exist.
    pub fn same_location(&self, other: &InstanceSpec, minecraft_root: impl AsRef<Path>) -> bool {
        let locate = |instance: &InstanceSpec| {
            instance
                .resolve_root(minecraft_root.as_ref())
                .map(|path| path.canonicalize().unwrap_or(path))
                .ok()
        };

        match (locate(self), locate(other)) {
            (Some(path), Some(other_path)) => path == other_path,
            _ => false,
        }
    }
}

impl Display for InstanceSpec {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{} ({})", self.name, self.root.display())
    }
}

/// Instance specification error types.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// Registry section lacks a required key.
    #[error("instance {name:?} is missing required key {key:?}")]
    MissingKey { name: String, key: &'static str },

    /// Instance lists no game versions.
    #[error("instance {name:?} does not list any minecraft versions")]
    NoVersions { name: String },

    /// Instance root failed shell expansion.
    #[error("cannot expand root of instance {name:?}")]
    ShellExpansion {
        name: String,
        #[source]
        source: shellexpand::LookupError<std::env::VarError>,
    },
}

/// Friendly result alias :3
pub type Result<T, E = InstanceError> = std::result::Result<T, E>;
