// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Game version handling.
//!
//! Neither players nor Mojang rigidly follow semantic versioning. The first
//! release of each minor line is `1.20`, not `1.20.0`, snapshots look like
//! `23w51a`, and players like to write `1.19.*` when they mean "anything in
//! 1.19". Matching therefore tries a semantic version requirement first, and
//! falls back to shell-glob matching when either side refuses to parse.

use glob::Pattern;
use semver::{Version, VersionReq};

/// Append `.0` to versions of the form `MAJOR.MINOR`.
///
/// Anything else, e.g., snapshots, pre-releases, or full three component
/// versions, is returned unchanged.
pub fn normalize_version(version: &str) -> String {
    let mut parts = version.split('.');
    let is_major_minor = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None) if is_numeric_component(major) && is_numeric_component(minor)
    );

    if is_major_minor {
        format!("{version}.0")
    } else {
        version.to_string()
    }
}

/// Determine whether a version spec matches an actual game version.
///
/// The actual version is normalized through [`normalize_version`] before it
/// is treated as a semantic version. Bare comparators such as `1.19.2` mean an
/// exact match. If either side fails to parse, the actual version is
/// glob-matched against the spec verbatim. Never fails.
///
/// Snapshots are __not__ matched to their corresponding release range. Users
/// have to be explicit about those.
pub fn matches_version(spec: &str, actual: &str) -> bool {
    let normalized = normalize_version(actual);
    match (parse_requirement(spec), Version::parse(&normalized)) {
        (Some(requirement), Ok(version)) => requirement.matches(&version),
        _ => glob_matches(spec, actual),
    }
}

/// Determine whether an instance of given version requires a symlink
/// allow-list before it will follow linked content.
///
/// Releases from `1.20` onward (including their pre-releases and release
/// candidates) and snapshots from `23w18a` onward enforce the allow-list.
pub fn needs_symlink_allowlist(version: &str) -> bool {
    if let Some((year, week)) = parse_snapshot(version) {
        return year > 23 || (year == 23 && week >= 18);
    }

    let release = version.split('-').next().unwrap_or(version);
    let mut parts = release.split('.');
    let major = parts.next().and_then(|part| part.parse::<u64>().ok());
    let minor = parts.next().and_then(|part| part.parse::<u64>().ok());
    match (major, minor) {
        (Some(major), _) if major > 1 => true,
        (Some(1), Some(minor)) => minor >= 20,
        _ => false,
    }
}

fn is_numeric_component(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_requirement(spec: &str) -> Option<VersionReq> {
    // INVARIANT: A comparator without an operator means exact match.
    let comparators = spec
        .split(',')
        .map(str::trim)
        .map(|comparator| {
            let bare = comparator.starts_with(|c: char| c.is_ascii_digit());
            let wildcard = comparator.contains(['*', 'x', 'X']);
            if bare && !wildcard {
                format!("={comparator}")
            } else {
                comparator.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    VersionReq::parse(&comparators).ok()
}

/// Case-sensitive shell-glob match; an invalid pattern only matches itself.
pub(crate) fn glob_matches(spec: &str, actual: &str) -> bool {
    match Pattern::new(spec) {
        Ok(pattern) => pattern.matches(actual),
        Err(_) => spec == actual,
    }
}

fn parse_snapshot(version: &str) -> Option<(u32, u32)> {
    let (year, rest) = version.split_once('w')?;
    let week = rest.strip_suffix(|c: char| c.is_ascii_lowercase())?;
    if year.len() != 2 || !is_numeric_component(year) || !is_numeric_component(week) {
        return None;
    }

    Some((year.parse().ok()?, week.parse().ok()?))
}
