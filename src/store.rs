// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Central store management.
//!
//! EnderChest groups every shulker box together into one place called the
//! __central store__, i.e., the `EnderChest` folder inside a minecraft root.
//! The central store also carries the instance registry.
//!
//! # Central Store Layout
//!
//! Each shulker box is given its own folder at the top-level of the central
//! store. The name of a shulker box is the name of that folder. A folder only
//! counts as a shulker box if it carries a `shulkerbox.cfg` file. EnderChest
//! only evaluates the top-level of the central store, so shulker boxes cannot
//! be nested inside one another.
//!
//! # Failure Isolation
//!
//! Listing operations never fail. A missing or broken registry degrades to an
//! empty instance list, and a broken shulker box is reported and skipped
//! without affecting its siblings.

pub mod discover;

use crate::{
    config::{ConfigError, EnderChestConfig},
    instance::InstanceSpec,
    path::{ender_chest_config, ender_chest_folder, minecraft_folders, shulker_box_config, shulker_box_configs},
    shulker::{ShulkerBox, ShulkerError},
};

use std::{
    collections::{HashMap, HashSet},
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, instrument, warn};

/// Launcher conventions to try when discovering instances.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKind {
    /// Try official launcher first, then MultiMC-style launchers.
    #[default]
    Any,

    /// Official launcher only.
    Official,

    /// MultiMC-style launchers only, e.g., MultiMC, Prism, PolyMC.
    MultiMc,
}

impl LauncherKind {
    fn allows_official(self) -> bool {
        matches!(self, Self::Any | Self::Official)
    }

    fn allows_mmc(self) -> bool {
        matches!(self, Self::Any | Self::MultiMc)
    }
}

/// Central store of a minecraft root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnderChest {
    minecraft_root: PathBuf,
}

impl EnderChest {
    /// Open central store of a minecraft root.
    ///
    /// The root is made absolute so links into the store stay valid no
    /// matter which directory they are read from. Nothing is checked on disk.
    pub fn open(minecraft_root: impl AsRef<Path>) -> Self {
        let minecraft_root = minecraft_root.as_ref();
        let minecraft_root =
            std::path::absolute(minecraft_root).unwrap_or_else(|_| minecraft_root.to_path_buf());

        Self { minecraft_root }
    }

    /// Create the central store and an empty registry if they are missing.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::CreateStore`] if the folder cannot be created.
    /// - Return [`StoreError::WriteConfig`] if the registry cannot be written.
    #[instrument(skip(self), level = "debug")]
    pub fn craft(&self) -> Result<()> {
        let folder = self.folder();
        create_dir_all(&folder).map_err(|err| StoreError::CreateStore {
            source: err,
            path: folder.clone(),
        })?;

        if !self.config_path().exists() {
            info!("craft new EnderChest at {:?}", folder.display());
            self.write_config(&EnderChestConfig::default())?;
        }

        Ok(())
    }

    /// Directory holding the central store.
    pub fn minecraft_root(&self) -> &Path {
        &self.minecraft_root
    }

    /// Path to the central store itself.
    pub fn folder(&self) -> PathBuf {
        ender_chest_folder(&self.minecraft_root)
    }

    /// Path to the instance registry.
    pub fn config_path(&self) -> PathBuf {
        ender_chest_config(&self.minecraft_root)
    }

    /// Load the instance registry.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if there is no registry.
    /// - Return [`StoreError::ReadConfig`] if the registry cannot be read.
    /// - Return [`StoreError::Config`] if the registry cannot be parsed.
    pub fn load_config(&self) -> Result<EnderChestConfig> {
        let path = self.config_path();
        debug!("load {:?}", path.display());
        if !path.is_file() {
            return Err(StoreError::NotFound { path });
        }

        let content = read_to_string(&path).map_err(|err| StoreError::ReadConfig {
            source: err,
            path: path.clone(),
        })?;

        content
            .parse()
            .map_err(|err| StoreError::Config { source: err, path })
    }

    /// Write the instance registry.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::WriteConfig`] if the registry cannot be written.
    pub fn write_config(&self, config: &EnderChestConfig) -> Result<()> {
        let path = self.config_path();
        debug!("write {:?}", path.display());
        write(&path, config.to_string()).map_err(|err| StoreError::WriteConfig { source: err, path })
    }

    /// List instances registered to the central store.
    ///
    /// Never fails. A missing or unparseable registry is reported and yields
    /// an empty list.
    #[instrument(skip(self), level = "debug")]
    pub fn load_instances(&self) -> Vec<InstanceSpec> {
        let instances = match self.load_config() {
            Ok(config) => config.instances,
            Err(err) => {
                error!(
                    "could not load EnderChest from {:?}: {err}",
                    self.minecraft_root.display()
                );
                Vec::new()
            }
        };

        if instances.is_empty() {
            info!(
                "there are no instances registered to the {:?} EnderChest",
                self.minecraft_root.display()
            );
        } else {
            let listing = instances
                .iter()
                .enumerate()
                .map(|(index, instance)| format!("  {}. {instance}", index + 1))
                .collect::<Vec<_>>()
                .join("\n");
            info!(
                "instances registered to the {:?} EnderChest:\n{listing}",
                self.minecraft_root.display()
            );
        }

        instances
    }

    /// Load a single shulker box by name.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Shulker`] if the shulker box cannot be loaded.
    pub fn load_shulker_box(&self, name: impl AsRef<str>) -> Result<ShulkerBox> {
        Ok(ShulkerBox::from_cfg(shulker_box_config(
            &self.minecraft_root,
            name,
        ))?)
    }

    /// List every shulker box in the central store in link order.
    ///
    /// Never fails. Shulker boxes that cannot be parsed are reported by path
    /// and skipped. A missing central store yields an empty list.
    pub fn load_shulker_boxes(&self) -> Vec<ShulkerBox> {
        self.load_shulker_boxes_with_errors().0
    }

    /// List every shulker box in the central store in link order, along with
    /// the config file and error of every shulker box that was skipped.
    #[instrument(skip(self), level = "debug")]
    pub fn load_shulker_boxes_with_errors(&self) -> (Vec<ShulkerBox>, Vec<(PathBuf, ShulkerError)>) {
        let configs = match shulker_box_configs(&self.minecraft_root) {
            Ok(configs) => configs,
            Err(err) => {
                error!(
                    "there is no EnderChest installed within {:?}: {err}",
                    self.minecraft_root.display()
                );
                return (Vec::new(), Vec::new());
            }
        };

        let mut shulker_boxes = Vec::new();
        let mut skipped = Vec::new();
        for config in configs {
            match ShulkerBox::from_cfg(&config) {
                Ok(shulker_box) => {
                    debug!("parsed shulker box {shulker_box}");
                    shulker_boxes.push(shulker_box);
                }
                Err(err) => {
                    warn!(
                        "could not parse shulker box at {:?}: {}",
                        config.display(),
                        error_chain(&err)
                    );
                    skipped.push((config, err));
                }
            }
        }
        shulker_boxes.sort_by(ShulkerBox::link_order);

        if shulker_boxes.is_empty() {
            info!(
                "there are no shulker boxes within the {:?} EnderChest",
                self.minecraft_root.display()
            );
        } else {
            let listing = shulker_boxes
                .iter()
                .map(|shulker_box| format!("  {shulker_box}"))
                .collect::<Vec<_>>()
                .join("\n");
            info!(
                "shulker boxes within the {:?} EnderChest, listed in the order in which they are linked:\n{listing}",
                self.minecraft_root.display()
            );
        }

        (shulker_boxes, skipped)
    }

    /// List registered instances that link to the named shulker box.
    ///
    /// Never fails. An unloadable shulker box matches nothing.
    #[instrument(skip(self, name), level = "debug")]
    pub fn shulker_box_matches(&self, name: impl AsRef<str>) -> Vec<InstanceSpec> {
        let instances = self.load_instances();
        if instances.is_empty() {
            return instances;
        }

        let shulker_box = match self.load_shulker_box(name.as_ref()) {
            Ok(shulker_box) => shulker_box,
            Err(err) => {
                warn!("could not load shulker box {:?}: {}", name.as_ref(), error_chain(&err));
                return Vec::new();
            }
        };

        let matches = instances
            .into_iter()
            .filter(|instance| shulker_box.matches(instance))
            .collect::<Vec<_>>();

        if matches.is_empty() {
            info!("shulker box {shulker_box} is not linked to by any registered instance");
        } else {
            let listing = matches
                .iter()
                .map(|instance| format!("  - {instance}"))
                .collect::<Vec<_>>()
                .join("\n");
            info!("shulker box {shulker_box} is linked to by the following instances:\n{listing}");
        }

        matches
    }

    /// Search a directory for game installations.
    ///
    /// Each game folder found is tried against the official launcher's
    /// convention, then against the MultiMC-style convention, as allowed by
    /// `launcher`. Folders matching neither are reported and skipped.
    ///
    /// Repeated names get a counter suffix in discovery order, e.g.,
    /// `official`, `official.1`, `official.2`. Roots inside the minecraft root
    /// are made relative to it.
    #[instrument(skip(self, search_path), level = "debug")]
    pub fn gather_instances(
        &self,
        search_path: impl AsRef<Path>,
        launcher: LauncherKind,
    ) -> Vec<InstanceSpec> {
        let mut names = NameCounter::default();
        self.discover_instances(search_path.as_ref(), launcher)
            .into_iter()
            .map(|instance| instance.with_name(names.claim(instance.name())))
            .collect()
    }

    fn discover_instances(&self, search_path: &Path, launcher: LauncherKind) -> Vec<InstanceSpec> {
        let mut found = Vec::new();
        for folder in minecraft_folders(search_path) {
            let folder = std::path::absolute(&folder).unwrap_or(folder);
            info!("found {:?}", folder.display());

            if launcher.allows_official() {
                match discover::official_instance(&folder) {
                    Ok(instance) => {
                        found.push(instance);
                        continue;
                    }
                    Err(err) => debug!("{err}"),
                }
            }

            if launcher.allows_mmc() {
                match discover::mmc_instance(&folder) {
                    Ok(instance) => {
                        found.push(instance);
                        continue;
                    }
                    Err(err) => debug!("{err}"),
                }
            }

            warn!(
                "{:?} does not appear to be a valid Minecraft instance",
                folder.display()
            );
        }

        if found.is_empty() {
            warn!(
                "could not find any Minecraft instances inside {:?}",
                search_path.display()
            );
        }

        found
            .into_iter()
            .map(|instance| match instance.root().strip_prefix(&self.minecraft_root) {
                Ok(relative) => instance.with_root(relative),
                Err(_) => instance,
            })
            .collect()
    }

    /// Discover instances and add new ones to the registry.
    ///
    /// Instances already registered at the same location are skipped, no
    /// matter their name. New names that collide with registered ones get a
    /// counter suffix. Returns the newly registered instances.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if there is no registry.
    /// - Return [`StoreError::Config`] if the registry cannot be parsed.
    /// - Return [`StoreError::WriteConfig`] if the registry cannot be written.
    #[instrument(skip(self, search_paths), level = "debug")]
    pub fn register_instances(
        &self,
        search_paths: impl IntoIterator<Item = impl AsRef<Path>>,
        launcher: LauncherKind,
    ) -> Result<Vec<InstanceSpec>> {
        let mut config = self.load_config()?;
        let mut names = NameCounter::default();
        for instance in &config.instances {
            names.claim(instance.name());
        }

        let mut registered = Vec::new();
        for search_path in search_paths {
            for instance in self.discover_instances(search_path.as_ref(), launcher) {
                let known = config
                    .instances
                    .iter()
                    .any(|other| other.same_location(&instance, &self.minecraft_root));
                if known {
                    debug!("{instance} is already registered");
                    continue;
                }

                let instance = instance.with_name(names.claim(instance.name()));
                info!("register {instance}");
                config.register(instance.clone());
                registered.push(instance);
            }
        }

        self.write_config(&config)?;

        Ok(registered)
    }
}

/// Seen-name counter keyed by base name.
///
/// First claim of a name returns it as is, later claims append `.1`, `.2`, and
/// so on. A claimed name is never handed out twice, even if it was claimed
/// as a base name of its own.
#[derive(Debug, Default)]
struct NameCounter {
    seen: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl NameCounter {
    fn claim(&mut self, name: &str) -> String {
        loop {
            let count = self.seen.entry(name.to_string()).or_insert(0);
            let claimed = match *count {
                0 => name.to_string(),
                n => format!("{name}.{n}"),
            };
            *count += 1;

            if self.taken.insert(claimed.clone()) {
                return claimed;
            }
        }
    }
}

pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }

    message
}

/// Central store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Registry does not exist.
    #[error("no EnderChest registry found at {:?}", path.display())]
    NotFound { path: PathBuf },

    /// Central store cannot be created.
    #[error("failed to create EnderChest at {:?}", path.display())]
    CreateStore {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Registry cannot be read.
    #[error("failed to read EnderChest registry at {:?}", path.display())]
    ReadConfig {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Registry cannot be written.
    #[error("failed to write EnderChest registry at {:?}", path.display())]
    WriteConfig {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Registry cannot be parsed.
    #[error("could not parse EnderChest registry at {:?}", path.display())]
    Config {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },

    /// Shulker box cannot be loaded.
    #[error(transparent)]
    Shulker(#[from] ShulkerError),
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
