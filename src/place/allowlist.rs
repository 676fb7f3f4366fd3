// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symlink allow-list handling.
//!
//! Starting with 1.20 (and snapshot 23w18a), the game refuses to follow
//! symbolic links whose destination is not listed in `allowed_symlinks.txt`
//! at the top of the instance. The file is newline-delimited, one path per
//! line. EnderChest only ever appends to it, and only after the user says so.

use crate::{instance::InstanceSpec, path::SYMLINK_ALLOWLIST_NAME, version::needs_symlink_allowlist};

use std::{
    fs::{read_to_string, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Capability to ask the user for consent.
pub trait Consent {
    /// Ask a yes-or-no question.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Ask on the terminal through inquire.
///
/// Anything other than an explicit "yes", including a prompt that cannot be
/// shown at all, counts as "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireConsent;

impl Consent for InquireConsent {
    fn confirm(&mut self, prompt: &str) -> bool {
        match inquire::Confirm::new(prompt).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(err) => {
                info!("cannot ask for consent: {err}");
                false
            }
        }
    }
}

/// Answer every question the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConsent(pub bool);

impl Consent for FixedConsent {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Determine whether instance enforces a symlink allow-list.
pub fn instance_needs_allowlist(instance: &InstanceSpec) -> bool {
    instance
        .minecraft_versions()
        .iter()
        .any(|version| needs_symlink_allowlist(version))
}

/// Offer to add the central store to an instance's allow-list.
///
/// Nothing happens if the store is already listed. Returns `true` if the
/// allow-list was updated.
///
/// # Errors
///
/// - Return [`AllowlistError::Read`] if the allow-list exists but cannot be
///   read.
/// - Return [`AllowlistError::Append`] if the allow-list cannot be appended to.
pub fn offer_allowlist_update(
    instance: &InstanceSpec,
    instance_root: &Path,
    store: &Path,
    consent: &mut dyn Consent,
) -> Result<bool> {
    let path = instance_root.join(SYMLINK_ALLOWLIST_NAME);
    let content = match read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(AllowlistError::Read { source: err, path }),
    };

    let entry = store.to_string_lossy();
    if content.lines().any(|line| line.trim() == entry) {
        debug!("{:?} already allows {entry:?}", path.display());
        return Ok(false);
    }

    let prompt = format!(
        "Instance {:?} requires symlinks to be explicitly allowed. Add {entry:?} to {:?}?",
        instance.name(),
        path.display()
    );
    if !consent.confirm(&prompt) {
        info!("leave {:?} untouched", path.display());
        return Ok(false);
    }

    let mut addition = String::new();
    if !content.is_empty() && !content.ends_with('\n') {
        addition.push('\n');
    }
    addition.push_str(&entry);
    addition.push('\n');

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| file.write_all(addition.as_bytes()))
        .map_err(|err| AllowlistError::Append { source: err, path: path.clone() })?;

    info!("added {entry:?} to {:?}", path.display());
    Ok(true)
}

/// Allow-list error types.
#[derive(Debug, thiserror::Error)]
pub enum AllowlistError {
    /// Allow-list cannot be read.
    #[error("failed to read symlink allow-list at {:?}", path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Allow-list cannot be appended to.
    #[error("failed to update symlink allow-list at {:?}", path.display())]
    Append {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = AllowlistError> = std::result::Result<T, E>;
