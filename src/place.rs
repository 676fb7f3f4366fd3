// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link placement.
//!
//! Placement converges the link topology of every registered instance towards
//! the topology its matching shulker boxes ask for. It is done in one pass per
//! instance:
//!
//! 1. Prune broken links that point into the central store.
//! 2. Compute the desired topology. Shulker boxes are laid over each other in
//!    link order, so later boxes win any path they share with earlier ones.
//! 3. Offer to update the symlink allow-list if the instance enforces one.
//! 4. Converge each desired path through [`link`].
//!
//! # Desired Topology
//!
//! Every entry of a matching shulker box maps to the same relative path under
//! the instance root. Link folders are linked as a unit. Other directories
//! become real directories in the instance, and the files inside them are
//! linked one by one. That way an instance can keep its own files next to
//! shared ones, e.g., its own worlds in `saves` next to a shared world.
//!
//! # Conflicts
//!
//! Placement never deletes user data. A file or non-empty directory sitting
//! where a link belongs is recorded as a [`Conflict`] and left alone, and
//! placement carries on with the next path. Running placement again on a
//! converged tree changes nothing.

pub mod allowlist;
pub mod link;

use crate::{
    instance::InstanceSpec,
    path::SHULKER_BOX_CONFIG_NAME,
    shulker::ShulkerBox,
    store::{error_chain, EnderChest, StoreError},
};
use allowlist::{instance_needs_allowlist, offer_allowlist_update, Consent};
use link::{is_broken_link_into, place_directory, place_link, remove_link, Obstruction, Outcome};

use ignore::WalkBuilder;
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Knobs of a placement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOptions {
    /// Replace empty real directories with links. Off is strict mode.
    pub replace_empty_dirs: bool,

    /// Remove broken links that point into the central store.
    pub clean_broken_links: bool,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            replace_empty_dirs: true,
            clean_broken_links: true,
        }
    }
}

/// Kind of a placement conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Regular file occupies the target.
    File,

    /// Directory with entries occupies the target.
    NonEmptyDirectory,

    /// Empty directory occupies the target in strict mode.
    EmptyDirectory,
}

impl From<Obstruction> for ConflictKind {
    fn from(obstruction: Obstruction) -> Self {
        match obstruction {
            Obstruction::File => Self::File,
            Obstruction::NonEmptyDirectory => Self::NonEmptyDirectory,
            Obstruction::EmptyDirectory => Self::EmptyDirectory,
        }
    }
}

/// User data obstructing a desired link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Name of the instance being placed.
    pub instance: String,

    /// Obstructed path inside the instance.
    pub path: PathBuf,

    /// What sits at the path.
    pub kind: ConflictKind,
}

impl Display for Conflict {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let what = match self.kind {
            ConflictKind::File => "file already exists",
            ConflictKind::NonEmptyDirectory => "directory is not empty",
            ConflictKind::EmptyDirectory => "directory exists (strict mode)",
        };
        write!(fmt, "{}: {:?}: {what}", self.instance, self.path.display())
    }
}

/// Non-fatal failure to load a shulker box, or to place an instance or path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Name of the instance or shulker box that failed.
    pub subject: String,

    /// Explanation including the offending path.
    pub reason: String,
}

impl Display for Failure {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}: {}", self.subject, self.reason)
    }
}

/// Tally of a placement pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub links_created: usize,
    pub links_replaced: usize,
    pub dirs_replaced: usize,
    pub dirs_created: usize,
    pub broken_links_removed: usize,
    pub allowlists_updated: usize,
    pub conflicts: Vec<Conflict>,
    pub failures: Vec<Failure>,
}

impl PlacementReport {
    /// Total number of filesystem mutations performed.
    pub fn mutations(&self) -> usize {
        self.links_created
            + self.links_replaced
            + self.dirs_replaced
            + self.dirs_created
            + self.broken_links_removed
            + self.allowlists_updated
    }

    /// Determine whether every path could be placed.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.failures.is_empty()
    }

    fn record(&mut self, instance: &str, path: &Path, outcome: Outcome) {
        match outcome {
            Outcome::Unchanged => {}
            Outcome::LinkCreated => self.links_created += 1,
            Outcome::LinkReplaced => self.links_replaced += 1,
            Outcome::DirectoryReplaced => self.dirs_replaced += 1,
            Outcome::DirectoryCreated => self.dirs_created += 1,
            Outcome::Conflict(obstruction) => {
                let conflict = Conflict {
                    instance: instance.to_string(),
                    path: path.to_path_buf(),
                    kind: obstruction.into(),
                };
                warn!("{conflict}");
                self.conflicts.push(conflict);
            }
        }
    }

    fn fail(&mut self, subject: &str, reason: String) {
        warn!("{subject}: {reason}");
        self.failures.push(Failure {
            subject: subject.to_string(),
            reason,
        });
    }
}

impl Display for PlacementReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "{} links created, {} links replaced, {} directories replaced, {} directories created, {} broken links removed",
            self.links_created,
            self.links_replaced,
            self.dirs_replaced,
            self.dirs_created,
            self.broken_links_removed
        )?;
        if !self.is_clean() {
            write!(
                fmt,
                ", {} conflicts, {} failures",
                self.conflicts.len(),
                self.failures.len()
            )?;
        }

        Ok(())
    }
}

/// Desired state of a path relative to an instance root.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Desired {
    Directory,
    Link(PathBuf),
}

/// Desired topology of a single instance, keyed by relative path.
///
/// Ancestors sort before their descendants, so iterating in key order realizes
/// parent directories first.
#[derive(Debug, Default)]
struct Topology {
    paths: BTreeMap<PathBuf, Desired>,
}

impl Topology {
    /// Lay shulker box over the topology built so far.
    fn overlay(&mut self, shulker_box: &ShulkerBox) {
        let root = shulker_box.root();
        let link_folders = shulker_box
            .link_folders()
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<_>>();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker.flatten() {
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if relative.as_os_str().is_empty() || relative == Path::new(SHULKER_BOX_CONFIG_NAME) {
                continue;
            }

            // INVARIANT: Contents of link folders travel with their folder.
            if link_folders
                .iter()
                .any(|folder| relative.starts_with(folder) && relative != folder)
            {
                continue;
            }

            let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
            if is_dir && !link_folders.iter().any(|folder| relative == folder) {
                self.paths.insert(relative.to_path_buf(), Desired::Directory);
            } else {
                self.link(relative, entry.path());
            }
        }
    }

    fn link(&mut self, relative: &Path, source: &Path) {
        self.paths
            .retain(|path, _| path == relative || !path.starts_with(relative));
        self.paths
            .insert(relative.to_path_buf(), Desired::Link(source.to_path_buf()));
    }

    fn has_links(&self) -> bool {
        self.paths
            .values()
            .any(|desired| matches!(desired, Desired::Link(_)))
    }
}

/// Place every registered instance's links.
///
/// Shulker boxes that fail to load and instances whose root cannot be
/// resolved are recorded as failures and skipped. Conflicts are collected into the
/// returned report rather than aborting the pass.
///
/// # Errors
///
/// - Return [`PlaceError::Store`] if the instance registry cannot be loaded.
#[instrument(skip(store, consent), level = "debug")]
pub fn place_ender_chest(
    store: &EnderChest,
    options: PlaceOptions,
    consent: &mut dyn Consent,
) -> Result<PlacementReport> {
    let config = store.load_config()?;
    let (shulker_boxes, skipped) = store.load_shulker_boxes_with_errors();
    let store_folder = store.folder();
    let mut report = PlacementReport::default();

    for (config, err) in &skipped {
        let name = config
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        report.fail(
            &name,
            format!("skipped shulker box at {:?}: {}", config.display(), error_chain(err)),
        );
    }

    for instance in &config.instances {
        let instance_root = match instance.resolve_root(store.minecraft_root()) {
            Ok(path) => path,
            Err(err) => {
                report.fail(instance.name(), error_chain(&err));
                continue;
            }
        };
        if !instance_root.is_dir() {
            report.fail(
                instance.name(),
                format!("instance folder {:?} does not exist", instance_root.display()),
            );
            continue;
        }

        info!("place links for {instance}");
        if options.clean_broken_links {
            prune_broken_links(instance, &instance_root, &store_folder, &mut report);
        }

        let mut topology = Topology::default();
        for shulker_box in &shulker_boxes {
            if shulker_box.matches(instance) {
                debug!("{instance} links to shulker box {shulker_box}");
                topology.overlay(shulker_box);
            }
        }

        if config.properties.offer_to_update_symlink_allowlist
            && topology.has_links()
            && instance_needs_allowlist(instance)
        {
            match offer_allowlist_update(instance, &instance_root, &store_folder, consent) {
                Ok(true) => report.allowlists_updated += 1,
                Ok(false) => {}
                Err(err) => report.fail(instance.name(), error_chain(&err)),
            }
        }

        converge(instance, &instance_root, &topology, options, &mut report);
    }

    info!("{report}");
    Ok(report)
}

fn prune_broken_links(
    instance: &InstanceSpec,
    instance_root: &Path,
    store_folder: &Path,
    report: &mut PlacementReport,
) {
    let skip = store_folder.to_path_buf();
    let walker = WalkBuilder::new(instance_root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| entry.path() != skip)
        .build();

    for entry in walker.flatten() {
        let is_link = entry.file_type().is_some_and(|kind| kind.is_symlink());
        if !is_link || !is_broken_link_into(entry.path(), store_folder) {
            continue;
        }

        match remove_link(entry.path()) {
            Ok(()) => {
                debug!("removed broken link {:?}", entry.path().display());
                report.broken_links_removed += 1;
            }
            Err(err) => report.fail(instance.name(), error_chain(&err)),
        }
    }
}

fn converge(
    instance: &InstanceSpec,
    instance_root: &Path,
    topology: &Topology,
    options: PlaceOptions,
    report: &mut PlacementReport,
) {
    let mut blocked: Vec<&Path> = Vec::new();
    for (relative, desired) in &topology.paths {
        if blocked.iter().any(|path| relative.starts_with(path)) {
            continue;
        }

        let target = instance_root.join(relative);
        let result = match desired {
            Desired::Directory => place_directory(&target),
            Desired::Link(source) => place_link(&target, source, options.replace_empty_dirs),
        };

        match result {
            Ok(outcome) => {
                if matches!(outcome, Outcome::Conflict(_)) {
                    blocked.push(relative);
                }
                report.record(instance.name(), &target, outcome);
            }
            Err(err) => {
                blocked.push(relative);
                report.fail(instance.name(), error_chain(&err));
            }
        }
    }
}

/// Placement error types.
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    /// Instance registry cannot be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Friendly result alias :3
pub type Result<T, E = PlaceError> = std::result::Result<T, E>;
