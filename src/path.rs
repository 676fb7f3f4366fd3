// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the files EnderChest needs to
//! interact with. Everything is anchored at a __minecraft root__, i.e., the
//! directory that holds the `EnderChest` folder.
//!
//! # Layout
//!
//! ```text
//! <minecraft root>/
//!     EnderChest/
//!         enderchest.cfg
//!         global/
//!             shulkerbox.cfg
//!             ...
//!         vanilla/
//!             shulkerbox.cfg
//!             ...
//! ```

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Name of the central store folder inside a minecraft root.
pub const ENDER_CHEST_FOLDER_NAME: &str = "EnderChest";

/// Name of the instance registry file inside the central store.
pub const ENDER_CHEST_CONFIG_NAME: &str = "enderchest.cfg";

/// Name of the configuration file of a shulker box.
pub const SHULKER_BOX_CONFIG_NAME: &str = "shulkerbox.cfg";

/// Name of the allow-list file newer instances read linked sources from.
pub const SYMLINK_ALLOWLIST_NAME: &str = "allowed_symlinks.txt";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default location of the official launcher's game folder.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_official_minecraft_dir() -> Result<PathBuf> {
    if cfg!(target_os = "macos") {
        return dirs::data_dir()
            .map(|path| path.join("minecraft"))
            .ok_or(NoWayHome);
    }

    if cfg!(windows) {
        return dirs::data_dir()
            .map(|path| path.join(".minecraft"))
            .ok_or(NoWayHome);
    }

    home_dir().map(|path| path.join(".minecraft"))
}

/// Path to the central store of a minecraft root.
pub fn ender_chest_folder(minecraft_root: impl AsRef<Path>) -> PathBuf {
    minecraft_root.as_ref().join(ENDER_CHEST_FOLDER_NAME)
}

/// Path to the instance registry file of a minecraft root.
pub fn ender_chest_config(minecraft_root: impl AsRef<Path>) -> PathBuf {
    ender_chest_folder(minecraft_root).join(ENDER_CHEST_CONFIG_NAME)
}

/// Path to the configuration file of a named shulker box.
pub fn shulker_box_config(minecraft_root: impl AsRef<Path>, name: impl AsRef<str>) -> PathBuf {
    ender_chest_folder(minecraft_root)
        .join(name.as_ref())
        .join(SHULKER_BOX_CONFIG_NAME)
}

/// List the configuration files of every shulker box in the central store.
///
/// Only the top-level of the central store is evaluated. Results are sorted
/// by path so discovery order does not depend on the platform's directory
/// listing order.
///
/// # Errors
///
/// - Return [`std::io::Error`] if the central store cannot be read.
pub fn shulker_box_configs(minecraft_root: impl AsRef<Path>) -> std::io::Result<Vec<PathBuf>> {
    let mut configs = Vec::new();
    for entry in std::fs::read_dir(ender_chest_folder(minecraft_root))? {
        let config = entry?.path().join(SHULKER_BOX_CONFIG_NAME);
        if config.is_file() {
            configs.push(config);
        }
    }
    configs.sort();

    Ok(configs)
}

/// Find every folder under search path that looks like a game folder.
///
/// A game folder is any directory named `.minecraft` or `minecraft`. The
/// search path itself counts when it carries one of those names. The
/// central store is never descended into.
pub fn minecraft_folders(search_path: impl AsRef<Path>) -> Vec<PathBuf> {
    let search_path = search_path.as_ref();
    let mut folders = Vec::new();

    let walker = WalkBuilder::new(search_path)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(4))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != ENDER_CHEST_FOLDER_NAME)
        .build();

    for entry in walker.flatten() {
        let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
        if is_dir && is_minecraft_folder(entry.path()) {
            folders.push(entry.into_path());
        }
    }

    folders
}

fn is_minecraft_folder(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|name| name.to_str()),
        Some(".minecraft" | "minecraft")
    )
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
