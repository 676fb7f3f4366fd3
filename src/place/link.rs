// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Single-path reconciliation primitives.
//!
//! Everything here operates on exactly one target path inside an instance.
//! The state of the target is inspected without following links, then either
//! converged to the desired link or directory, or reported back as a
//! conflict for the caller to record.

use std::{
    fs::{canonicalize, create_dir, read_dir, read_link, remove_dir, remove_file, rename},
    io,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Observed state of a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing exists at the path.
    Missing,

    /// Link that already resolves to the desired source.
    Linked,

    /// Link that points somewhere else, or nowhere at all.
    StaleLink,

    /// Real directory without entries.
    EmptyDirectory,

    /// Real directory with entries.
    NonEmptyDirectory,

    /// Regular file, or anything else that is not a link or directory.
    File,
}

/// Outcome of converging a single target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Target was already in the desired state.
    Unchanged,

    /// New link was created.
    LinkCreated,

    /// Stale link was replaced.
    LinkReplaced,

    /// Empty directory was removed and replaced with a link.
    DirectoryReplaced,

    /// Real directory was created.
    DirectoryCreated,

    /// Target holds user data that must not be touched.
    Conflict(Obstruction),
}

/// Kind of user data obstructing a target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstruction {
    /// Regular file.
    File,

    /// Directory with entries.
    NonEmptyDirectory,

    /// Empty directory, only an obstruction in strict mode.
    EmptyDirectory,
}

/// Inspect target path against the source it should link to.
///
/// # Errors
///
/// - Return [`LinkError::Inspect`] if the target cannot be examined.
pub fn inspect(target: &Path, source: Option<&Path>) -> Result<TargetState> {
    let metadata = match target.symlink_metadata() {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(TargetState::Missing),
        Err(err) => return Err(LinkError::Inspect { source: err, path: target.into() }),
    };

    if metadata.file_type().is_symlink() {
        let linked = source.is_some_and(|source| points_to(target, source));
        return Ok(if linked { TargetState::Linked } else { TargetState::StaleLink });
    }

    if metadata.is_dir() {
        let mut entries = read_dir(target).map_err(|err| LinkError::Inspect {
            source: err,
            path: target.into(),
        })?;
        return Ok(match entries.next() {
            None => TargetState::EmptyDirectory,
            Some(_) => TargetState::NonEmptyDirectory,
        });
    }

    Ok(TargetState::File)
}

/// Converge target path into a link to source.
///
/// Parent directories are created as needed. Stale links are replaced
/// atomically. Empty directories are replaced only if `replace_empty_dirs`
/// is set. Files and non-empty directories are never touched.
///
/// # Errors
///
/// - Return [`LinkError`] if any filesystem operation fails.
pub fn place_link(target: &Path, source: &Path, replace_empty_dirs: bool) -> Result<Outcome> {
    let outcome = match inspect(target, Some(source))? {
        TargetState::Linked => Outcome::Unchanged,
        TargetState::Missing => {
            if let Some(parent) = target.parent() {
                mkdirp::mkdirp(parent).map_err(|err| LinkError::CreateDirectory {
                    source: err,
                    path: parent.into(),
                })?;
            }
            symlink(source, target)?;
            Outcome::LinkCreated
        }
        TargetState::StaleLink => {
            replace_link(target, source)?;
            Outcome::LinkReplaced
        }
        TargetState::EmptyDirectory if replace_empty_dirs => {
            remove_dir(target).map_err(|err| LinkError::Remove {
                source: err,
                path: target.into(),
            })?;
            symlink(source, target)?;
            Outcome::DirectoryReplaced
        }
        TargetState::EmptyDirectory => Outcome::Conflict(Obstruction::EmptyDirectory),
        TargetState::NonEmptyDirectory => Outcome::Conflict(Obstruction::NonEmptyDirectory),
        TargetState::File => Outcome::Conflict(Obstruction::File),
    };

    debug!("{:?} -> {:?}: {outcome:?}", target.display(), source.display());
    Ok(outcome)
}

/// Converge target path into a real directory.
///
/// A link sitting at the target is removed first, since its contents belong
/// to the central store and must not receive new links.
///
/// # Errors
///
/// - Return [`LinkError`] if any filesystem operation fails.
pub fn place_directory(target: &Path) -> Result<Outcome> {
    let outcome = match inspect(target, None)? {
        TargetState::EmptyDirectory | TargetState::NonEmptyDirectory => Outcome::Unchanged,
        TargetState::Missing => {
            mkdirp::mkdirp(target).map_err(|err| LinkError::CreateDirectory {
                source: err,
                path: target.into(),
            })?;
            Outcome::DirectoryCreated
        }
        TargetState::Linked | TargetState::StaleLink => {
            remove_link(target)?;
            create_dir(target).map_err(|err| LinkError::CreateDirectory {
                source: err,
                path: target.into(),
            })?;
            Outcome::DirectoryCreated
        }
        TargetState::File => Outcome::Conflict(Obstruction::File),
    };

    debug!("{:?} as directory: {outcome:?}", target.display());
    Ok(outcome)
}

/// Determine whether link is broken and pointed into given directory.
pub fn is_broken_link_into(link: &Path, directory: &Path) -> bool {
    let Ok(destination) = read_link(link) else {
        return false;
    };
    let destination = absolute_destination(link, destination);

    destination.starts_with(directory) && !link.exists()
}

/// Remove a link without touching what it points to.
///
/// # Errors
///
/// - Return [`LinkError::Remove`] if the link cannot be removed.
pub fn remove_link(link: &Path) -> Result<()> {
    let removed = remove_file(link).or_else(|err| {
        // INVARIANT: Directory links on Windows can only be removed as directories.
        if cfg!(windows) {
            remove_dir(link)
        } else {
            Err(err)
        }
    });

    removed.map_err(|err| LinkError::Remove { source: err, path: link.into() })
}

fn points_to(link: &Path, source: &Path) -> bool {
    let Ok(destination) = read_link(link) else {
        return false;
    };
    if absolute_destination(link, destination) == source {
        return true;
    }

    match (canonicalize(link), canonicalize(source)) {
        (Ok(resolved), Ok(source)) => resolved == source,
        _ => false,
    }
}

fn absolute_destination(link: &Path, destination: PathBuf) -> PathBuf {
    match link.parent() {
        Some(parent) if destination.is_relative() => parent.join(destination),
        _ => destination,
    }
}

fn replace_link(target: &Path, source: &Path) -> Result<()> {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = target.with_file_name(format!(".{name}.enderchest-tmp"));
    if staging.symlink_metadata().is_ok() {
        remove_link(&staging)?;
    }

    symlink(source, &staging)?;
    rename(&staging, target).map_err(|err| LinkError::Replace {
        source: err,
        path: target.into(),
    })
}

fn symlink(source: &Path, target: &Path) -> Result<()> {
    #[cfg(unix)]
    let linked = std::os::unix::fs::symlink(source, target);

    #[cfg(windows)]
    let linked = if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    };

    linked.map_err(|err| LinkError::Create { source: err, path: target.into() })
}

/// Link reconciliation error types.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Target cannot be examined.
    #[error("failed to inspect {:?}", path.display())]
    Inspect {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Link cannot be created.
    #[error("failed to create link at {:?}", path.display())]
    Create {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Link cannot be swapped into place.
    #[error("failed to replace link at {:?}", path.display())]
    Replace {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Link or empty directory cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDirectory {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LinkError> = std::result::Result<T, E>;
