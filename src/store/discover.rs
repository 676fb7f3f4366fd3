// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Instance discovery by launcher convention.
//!
//! Launchers leave different traces in and around the game folders they
//! manage. Only the data EnderChest needs is pulled out of them: name, game
//! versions, mod loader, and tags.
//!
//! # Official Launcher
//!
//! The official launcher keeps every installed version at
//! `.minecraft/versions/<id>/<id>.json`. Modded versions point back at the
//! game version they build on through `inheritsFrom`. All profiles share one
//! game folder, so the instance lists every installed game version.
//!
//! # MultiMC-Style Launchers
//!
//! MultiMC and its forks (Prism, PolyMC, ...) keep each instance in its own
//! folder, with the game folder inside next to an `instance.cfg` file holding
//! the display name, and an `mmc-pack.json` file listing installed components.

use crate::{ini::IniDocument, instance::InstanceSpec, version::normalize_version};

use serde::Deserialize;
use std::{
    fs::{read_dir, read_to_string},
    path::{Path, PathBuf},
};

const MINECRAFT_UID: &str = "net.minecraft";

/// Component uids of known mod loaders, paired with their display names.
const LOADER_UIDS: [(&str, &str); 4] = [
    ("net.fabricmc.fabric-loader", "Fabric Loader"),
    ("org.quiltmc.quilt-loader", "Quilt Loader"),
    ("net.minecraftforge", "Forge"),
    ("net.neoforged", "NeoForge"),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionManifest {
    id: String,
    inherits_from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MmcPack {
    components: Vec<MmcComponent>,
}

#[derive(Debug, Deserialize)]
struct MmcComponent {
    uid: String,
    version: Option<String>,
}

/// Parse a game folder managed by the official launcher.
///
/// # Errors
///
/// - Return [`DiscoverError::NotOfficial`] if the folder does not follow the
///   official launcher's convention.
pub fn official_instance(folder: impl AsRef<Path>) -> Result<InstanceSpec> {
    let folder = folder.as_ref();
    let not_official = |reason: String| DiscoverError::NotOfficial {
        path: folder.to_path_buf(),
        reason,
    };

    let versions_dir = folder.join("versions");
    let entries = read_dir(&versions_dir)
        .map_err(|err| not_official(format!("cannot read {:?}: {err}", versions_dir.display())))?;

    let mut versions = Vec::new();
    for entry in entries.flatten() {
        let id = entry.file_name().to_string_lossy().into_owned();
        let manifest_path = entry.path().join(format!("{id}.json"));
        let Ok(content) = read_to_string(&manifest_path) else {
            continue;
        };
        let manifest: VersionManifest = serde_json::from_str(&content).map_err(|err| {
            not_official(format!("cannot parse {:?}: {err}", manifest_path.display()))
        })?;

        let version = normalize_version(manifest.inherits_from.as_deref().unwrap_or(&manifest.id));
        if !versions.contains(&version) {
            versions.push(version);
        }
    }
    versions.sort();

    if versions.is_empty() {
        return Err(not_official("no installed versions".into()));
    }

    InstanceSpec::new("official", folder, versions, None, ["vanilla"])
        .map_err(|err| not_official(err.to_string()))
}

/// Parse a game folder managed by a MultiMC-style launcher.
///
/// # Errors
///
/// - Return [`DiscoverError::NotMmc`] if the folder does not follow the
///   MultiMC convention.
pub fn mmc_instance(folder: impl AsRef<Path>) -> Result<InstanceSpec> {
    let folder = folder.as_ref();
    let not_mmc = |reason: String| DiscoverError::NotMmc {
        path: folder.to_path_buf(),
        reason,
    };

    let instance_dir = folder
        .parent()
        .ok_or_else(|| not_mmc("game folder has no parent".into()))?;

    let pack_path = instance_dir.join("mmc-pack.json");
    let content = read_to_string(&pack_path)
        .map_err(|err| not_mmc(format!("cannot read {:?}: {err}", pack_path.display())))?;
    let pack: MmcPack = serde_json::from_str(&content)
        .map_err(|err| not_mmc(format!("cannot parse {:?}: {err}", pack_path.display())))?;

    let config_path = instance_dir.join("instance.cfg");
    let content = read_to_string(&config_path)
        .map_err(|err| not_mmc(format!("cannot read {:?}: {err}", config_path.display())))?;
    let config = IniDocument::parse_flat(&content)
        .map_err(|err| not_mmc(format!("cannot parse {:?}: {err}", config_path.display())))?;

    let name = config
        .get("name")
        .map(str::to_string)
        .or_else(|| {
            instance_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    let versions = pack
        .components
        .iter()
        .filter(|component| component.uid == MINECRAFT_UID)
        .filter_map(|component| component.version.as_deref())
        .collect::<Vec<_>>();

    let modloader = pack.components.iter().find_map(|component| {
        LOADER_UIDS
            .iter()
            .find(|(uid, _)| *uid == component.uid)
            .map(|(_, name)| name.to_string())
    });

    InstanceSpec::new(name, folder, versions, modloader, [""; 0])
        .map_err(|err| not_mmc(err.to_string()))
}

/// Instance discovery error types.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Folder does not follow official launcher convention.
    #[error("{:?} is not an official instance: {reason}", path.display())]
    NotOfficial { path: PathBuf, reason: String },

    /// Folder does not follow MultiMC convention.
    #[error("{:?} is not an MMC-like instance: {reason}", path.display())]
    NotMmc { path: PathBuf, reason: String },
}

/// Friendly result alias :3
pub type Result<T, E = DiscoverError> = std::result::Result<T, E>;
