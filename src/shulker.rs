// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shulker box specification and matching.
//!
//! A __shulker box__ is a named, prioritized bundle of files and folders that
//! lives inside the central store, plus a rule set that selects which
//! instances receive it.
//!
//! # Shulker Box Configuration Layout
//!
//! Every shulker box folder carries a `shulkerbox.cfg` file at its top-level:
//!
//! ```ini
//! ; global/shulkerbox.cfg
//! [properties]
//! priority = 0
//!
//! [minecraft]
//! >=1.19.0
//! 23w*
//!
//! [modloader]
//! fabric-like
//!
//! [link-folders]
//! screenshots
//! logs
//! ```
//!
//! The `properties` section holds the link priority. The `link-folders`
//! section lists folders that are linked as a whole instead of file by file.
//! Every other section is a __match condition__ whose keys are the accepted
//! values. An instance matches the box if and only if it satisfies every
//! condition, and it satisfies a condition if it matches at least one of the
//! condition's values. In other words, match criteria are an AND of ORs.

use crate::{
    ini::{IniDocument, IniError, IniSection},
    instance::InstanceSpec,
    path::SHULKER_BOX_CONFIG_NAME,
    version::{glob_matches, matches_version},
};

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

const PROPERTIES: &str = "properties";
const LINK_FOLDERS: &str = "link-folders";
const PRIORITY: &str = "priority";
const LAST_MODIFIED: &str = "last_modified";
const GENERATED_BY: &str = "generated_by_enderchest_version";

/// Kind of match condition.
///
/// Resolved when a shulker box is parsed so an unknown condition is rejected
/// while loading, not silently skipped while matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// Glob-match against instance name.
    Instances,

    /// Glob-match against any instance tag.
    Tags,

    /// Glob-match against the alias-normalized mod loader.
    Modloaders,

    /// Version spec against any instance game version.
    MinecraftVersions,
}

impl FromStr for ConditionKind {
    type Err = ShulkerError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data.to_lowercase().as_str() {
            "instance" | "instances" => Ok(Self::Instances),
            "tag" | "tags" => Ok(Self::Tags),
            "modloader" | "modloaders" | "loader" | "loaders" => Ok(Self::Modloaders),
            "minecraft" | "version" | "versions" | "minecraft_version" | "minecraft_versions" => {
                Ok(Self::MinecraftVersions)
            }
            _ => Err(ShulkerError::UnknownCondition {
                condition: data.to_string(),
            }),
        }
    }
}

/// One match condition of a shulker box.
///
/// # Invariant
///
/// - Values are an ordered set, i.e., no duplicates, declaration order kept.
/// - Declared section name is kept verbatim for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCondition {
    section: String,
    kind: ConditionKind,
    values: Vec<String>,
}

impl MatchCondition {
    /// Construct new match condition from its declared section name.
    ///
    /// # Errors
    ///
    /// - Return [`ShulkerError::UnknownCondition`] if the section name does
    ///   not name a known condition kind.
    pub fn new(
        section: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let section = section.into();
        let kind = section.parse()?;
        let mut unique: Vec<String> = Vec::new();
        for value in values.into_iter().map(Into::into) {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }

        Ok(Self {
            section,
            kind,
            values: unique,
        })
    }

    /// Declared section name.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Resolved condition kind.
    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Accepted values.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Determine whether instance satisfies at least one value.
    pub fn matches(&self, instance: &InstanceSpec) -> bool {
        match self.kind {
            ConditionKind::Instances => self
                .values
                .iter()
                .any(|value| glob_matches(value, instance.name())),
            ConditionKind::Tags => self.values.iter().any(|value| {
                instance
                    .tags()
                    .iter()
                    .any(|tag| glob_matches(value, tag))
            }),
            ConditionKind::Modloaders => {
                let loaders = normalize_modloader(instance.modloader());
                self.values
                    .iter()
                    .flat_map(|value| normalize_modloader(Some(value)))
                    .any(|value| loaders.iter().any(|loader| glob_matches(&value, loader)))
            }
            ConditionKind::MinecraftVersions => self.values.iter().any(|value| {
                instance
                    .minecraft_versions()
                    .iter()
                    .any(|version| matches_version(value, version))
            }),
        }
    }
}

/// Specification of a shulker box.
///
/// Immutable once constructed. Link order is ascending `(priority, name)`,
/// so higher priority boxes are linked last and win path collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShulkerBox {
    priority: i64,
    name: String,
    root: PathBuf,
    match_criteria: Vec<MatchCondition>,
    link_folders: Vec<String>,
    properties: Vec<(String, String)>,
}

impl ShulkerBox {
    /// Construct new shulker box.
    pub fn new(
        priority: i64,
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        match_criteria: impl IntoIterator<Item = MatchCondition>,
        link_folders: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut folders: Vec<String> = Vec::new();
        for folder in link_folders.into_iter().map(Into::into) {
            if !folders.contains(&folder) {
                folders.push(folder);
            }
        }

        Self {
            priority,
            name: name.into(),
            root: root.into(),
            match_criteria: match_criteria.into_iter().collect(),
            link_folders: folders,
            properties: Vec::new(),
        }
    }

    /// Parse shulker box from its configuration file.
    ///
    /// The box is rooted at the folder holding the configuration file, and
    /// named after it.
    ///
    /// # Errors
    ///
    /// - Return [`ShulkerError::ReadConfig`] if the file cannot be read.
    /// - Return [`ShulkerError::Ini`] if the file is not valid INI.
    /// - Return [`ShulkerError::InvalidPriority`] if priority is not an
    ///   integer.
    /// - Return [`ShulkerError::UnknownCondition`] if a section names an
    ///   unknown match condition.
    #[instrument(skip(config_file), level = "debug")]
    pub fn from_cfg(config_file: impl AsRef<Path>) -> Result<Self> {
        let config_file = config_file.as_ref();
        debug!("parse shulker box at {:?}", config_file.display());
        let content = read_to_string(config_file).map_err(|err| ShulkerError::ReadConfig {
            source: err,
            path: config_file.to_path_buf(),
        })?;
        let document = IniDocument::parse(&content).map_err(|err| ShulkerError::Ini {
            source: err,
            path: config_file.to_path_buf(),
        })?;

        let root = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_document(root, &document)
    }

    /// Build shulker box rooted at given folder from a parsed document.
    ///
    /// # Errors
    ///
    /// - Return [`ShulkerError::InvalidPriority`] if priority is not an
    ///   integer.
    /// - Return [`ShulkerError::UnknownCondition`] if a section names an
    ///   unknown match condition.
    pub fn from_document(root: impl Into<PathBuf>, document: &IniDocument) -> Result<Self> {
        let root = root.into();
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut priority = 0;
        let mut properties = Vec::new();
        let mut match_criteria = Vec::new();
        let mut link_folders = Vec::new();

        for section in document.sections() {
            match section.name() {
                PROPERTIES => {
                    for key in section.keys() {
                        let value = section.get(key).unwrap_or_default();
                        match key {
                            PRIORITY => {
                                priority = value.trim().parse().map_err(|_| {
                                    ShulkerError::InvalidPriority {
                                        name: name.clone(),
                                        value: value.to_string(),
                                    }
                                })?;
                            }
                            LAST_MODIFIED | GENERATED_BY => continue,
                            _ => properties.push((key.to_string(), value.to_string())),
                        }
                    }
                }
                LINK_FOLDERS => link_folders.extend(listed_values(section)),
                condition => {
                    let condition = MatchCondition::new(condition, listed_values(section))
                        .map_err(|err| err.in_box(&name))?;
                    match_criteria.push(condition);
                }
            }
        }

        let mut shulker_box = Self::new(priority, name, root, match_criteria, link_folders);
        shulker_box.properties = properties;

        Ok(shulker_box)
    }

    /// Render shulker box configuration as an INI document.
    ///
    /// Properties this crate does not understand are carried over. A fresh
    /// modification timestamp and generator version are stamped in.
    pub fn to_document(&self) -> IniDocument {
        let mut document = IniDocument::new();

        let mut properties = IniSection::new(PROPERTIES);
        properties.set(PRIORITY, self.priority.to_string());
        for (key, value) in &self.properties {
            properties.set(key, value);
        }
        properties.set(
            LAST_MODIFIED,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        );
        properties.set(GENERATED_BY, env!("CARGO_PKG_VERSION"));
        document.push_section(properties);

        for condition in &self.match_criteria {
            let mut section = IniSection::new(&condition.section);
            for value in &condition.values {
                section.set_key(value);
            }
            document.push_section(section);
        }

        let mut folders = IniSection::new(LINK_FOLDERS);
        for folder in &self.link_folders {
            folders.set_key(folder);
        }
        document.push_section(folders);

        document
    }

    /// Write shulker box configuration to file.
    ///
    /// A one line comment recording the path of the file relative to the
    /// central store is written before the configuration itself. The root
    /// of the box is not written.
    ///
    /// # Errors
    ///
    /// - Return [`ShulkerError::WriteConfig`] if the file cannot be written.
    #[instrument(skip(self, config_file), level = "debug")]
    pub fn write_to_cfg(&self, config_file: impl AsRef<Path>) -> Result<()> {
        let config_file = config_file.as_ref();
        let folder = config_file
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone());
        let content = format!(
            "; {folder}/{SHULKER_BOX_CONFIG_NAME}\n{}",
            self.to_document()
        );

        debug!("write shulker box {:?} to {:?}", self.name, config_file.display());
        write(config_file, content).map_err(|err| ShulkerError::WriteConfig {
            source: err,
            path: config_file.to_path_buf(),
        })
    }

    /// Determine whether the shulker box matches the given instance.
    ///
    /// Pure predicate. Conditions are checked in declaration order.
    pub fn matches(&self, instance: &InstanceSpec) -> bool {
        self.first_unmet_condition(instance).is_none()
    }

    /// First condition in declaration order that instance does not satisfy.
    pub fn first_unmet_condition(&self, instance: &InstanceSpec) -> Option<&MatchCondition> {
        self.match_criteria
            .iter()
            .find(|condition| !condition.matches(instance))
    }

    /// Compare link order, i.e., ascending priority with ties broken by name.
    pub fn link_order(&self, other: &ShulkerBox) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.root.cmp(&other.root))
    }

    /// Link priority.
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Name of shulker box.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folder of shulker box, i.e., the source of all of its links.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Match conditions in declaration order.
    pub fn match_criteria(&self) -> &[MatchCondition] {
        &self.match_criteria
    }

    /// Folders linked as a whole.
    pub fn link_folders(&self) -> &[String] {
        &self.link_folders
    }

    /// Copy of shulker box with a different priority.
    pub fn with_priority(&self, priority: i64) -> Self {
        Self {
            priority,
            ..self.clone()
        }
    }

    /// Copy of shulker box with different match criteria.
    pub fn with_match_criteria(&self, match_criteria: impl IntoIterator<Item = MatchCondition>) -> Self {
        Self {
            match_criteria: match_criteria.into_iter().collect(),
            ..self.clone()
        }
    }
}

impl Display for ShulkerBox {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let folder = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        write!(fmt, "{}. {folder}", self.priority)?;
        if folder != self.name {
            write!(fmt, " ({})", self.name)?;
        }

        Ok(())
    }
}

/// Values of a key-only section.
///
/// Values holding an `=`, e.g., `>=1.19.0`, are split into key and value by
/// the INI parser, so they are stitched back together here.
fn listed_values(section: &IniSection) -> Vec<String> {
    section
        .keys()
        .map(|key| match section.get(key) {
            Some(value) => format!("{key}={value}"),
            None => key.to_string(),
        })
        .collect()
}

/// Expand a mod loader name into the canonical names it stands for.
///
/// Lookup ignores case, spaces, hyphens, underscores, and slashes. A missing
/// loader and the `none` or `vanilla` aliases all mean the empty string.
/// Unknown loaders pass through verbatim.
pub fn normalize_modloader(loader: Option<&str>) -> Vec<String> {
    let Some(loader) = loader else {
        return vec![String::new()];
    };

    let key = loader
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '/'))
        .collect::<String>();

    match key.as_str() {
        "none" | "vanilla" => vec![String::new()],
        "fabric" | "fabricloader" => vec!["Fabric Loader".into()],
        "quilt" | "quiltloader" => vec!["Quilt Loader".into()],
        "fabricquilt" | "quiltfabric" | "fabriclike" | "fabriccompatible" => {
            vec!["Fabric Loader".into(), "Quilt Loader".into()]
        }
        "forge" | "forgeloader" | "minecraftforge" => vec!["Forge".into()],
        _ => vec![loader.to_string()],
    }
}

/// Shulker box error types.
#[derive(Debug, thiserror::Error)]
pub enum ShulkerError {
    /// Configuration file cannot be read.
    #[error("failed to read shulker box config at {:?}", path.display())]
    ReadConfig {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Configuration file cannot be written.
    #[error("failed to write shulker box config at {:?}", path.display())]
    WriteConfig {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Configuration file is not valid INI.
    #[error("could not parse shulker box config at {:?}", path.display())]
    Ini {
        #[source]
        source: IniError,
        path: PathBuf,
    },

    /// Priority is not an integer.
    #[error("shulker box {name:?} has non-integer priority {value:?}")]
    InvalidPriority { name: String, value: String },

    /// Section names no known match condition.
    #[error("don't know how to apply match condition {condition:?}")]
    UnknownCondition { condition: String },

    /// Shulker box declares a match condition with no known evaluator.
    #[error("shulker box {name:?} declares unknown match condition {condition:?}")]
    UnknownConditionInBox { name: String, condition: String },
}

impl ShulkerError {
    fn in_box(self, name: &str) -> Self {
        match self {
            Self::UnknownCondition { condition } => Self::UnknownConditionInBox {
                name: name.to_string(),
                condition,
            },
            other => other,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = ShulkerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;
    use tempfile::TempDir;

    fn axolotl() -> InstanceSpec {
        InstanceSpec::new("axolotl", "instances/axolotl/.minecraft", ["1.19.2"], None, [""; 0])
            .unwrap()
    }

    fn bee() -> InstanceSpec {
        InstanceSpec::new(
            "bee",
            "instances/bee/.minecraft",
            ["1.20"],
            Some("Fabric Loader".into()),
            ["pvp", "aesthetic"],
        )
        .unwrap()
    }

    fn shulker_with(conditions: &[(&str, &[&str])]) -> ShulkerBox {
        let criteria = conditions
            .iter()
            .map(|(section, values)| MatchCondition::new(*section, values.iter().copied()).unwrap());
        ShulkerBox::new(0, "test", "EnderChest/test", criteria, [""; 0])
    }

    #[test_case("minecraft", "^1.19.0", true; "version range")]
    #[test_case("modloaders", "forge", false; "forge against vanilla")]
    #[test_case("modloader", "vanilla", true; "vanilla alias")]
    #[test_case("modloader", "None", true; "none alias")]
    #[test_case("instances", "axo*", true; "instance glob")]
    #[test_case("instance", "bee", false; "instance name mismatch")]
    #[test_case("tags", "*", false; "no tags means no tag matches")]
    #[test]
    fn matches_axolotl(section: &str, value: &str, expect: bool) {
        let shulker = shulker_with(&[(section, &[value])]);
        pretty_assertions::assert_eq!(shulker.matches(&axolotl()), expect);
    }

    #[test_case("Fabric", "fabric-loader"; "hyphenated")]
    #[test_case("Fabric", "FabricLoader"; "camel case")]
    #[test_case("fabric_like", "Quilt Loader"; "compound alias covers quilt")]
    #[test_case("FABRIC / QUILT", "fabric"; "compound alias covers fabric")]
    #[test_case("Minecraft Forge", "forge"; "forge family")]
    #[test]
    fn modloader_aliases_are_equivalent(declared: &str, loader: &str) {
        let instance = axolotl();
        let instance = InstanceSpec::new(
            instance.name(),
            instance.root(),
            instance.minecraft_versions(),
            Some(loader.into()),
            [""; 0],
        )
        .unwrap();
        let shulker = shulker_with(&[("modloader", &[declared])]);
        assert!(shulker.matches(&instance));
    }

    #[test]
    fn conditions_are_anded_values_are_ored() {
        let shulker = shulker_with(&[
            ("instances", &["axolotl", "bee"][..]),
            ("tags", &["pvp"][..]),
        ]);
        assert!(shulker.matches(&bee()));

        // Each condition is satisfiable on its own, never by the same instance.
        let shulker = shulker_with(&[("minecraft", &["1.19.2"]), ("modloader", &["fabric"])]);
        assert!(!shulker.matches(&axolotl()));
        assert!(!shulker.matches(&bee()));
        assert_eq!(
            shulker.first_unmet_condition(&axolotl()).map(MatchCondition::section),
            Some("modloader")
        );
        assert_eq!(
            shulker.first_unmet_condition(&bee()).map(MatchCondition::section),
            Some("minecraft")
        );
    }

    #[test]
    fn matches_is_pure() {
        let shulker = shulker_with(&[("minecraft", &["1.20.*", "1.19.2"][..]), ("tags", &["*"][..])]);
        let instance = bee();
        let before = (shulker.clone(), instance.clone());

        let first = shulker.matches(&instance);
        let second = shulker.matches(&instance);

        assert_eq!(first, second);
        assert_eq!((shulker, instance), before);
    }

    #[test]
    fn no_conditions_matches_everything() {
        let shulker = shulker_with(&[]);
        assert!(shulker.matches(&axolotl()));
        assert!(shulker.matches(&bee()));
    }

    #[test]
    fn unknown_condition_is_rejected_at_parse_time() -> anyhow::Result<()> {
        let document = IniDocument::parse(indoc! {r#"
            [properties]
            priority = 1

            [biomes]
            lush_caves
        "#})?;
        let result = ShulkerBox::from_document("EnderChest/lush", &document);

        assert!(matches!(
            result,
            Err(ShulkerError::UnknownConditionInBox { ref name, ref condition })
                if name == "lush" && condition == "biomes"
        ));

        Ok(())
    }

    #[test]
    fn from_cfg_reads_box_folder() -> anyhow::Result<()> {
        let chest = TempDir::new()?;
        let root = chest.path().join("optifine");
        std::fs::create_dir(&root)?;
        let config = root.join(SHULKER_BOX_CONFIG_NAME);
        write(
            &config,
            indoc! {r#"
                ; optifine/shulkerbox.cfg
                [properties]
                priority = 3
                author = steve

                [minecraft]
                1.19.*

                [modloader]
                vanilla
                optifine

                [link-folders]
                shaderpacks
            "#},
        )?;

        let result = ShulkerBox::from_cfg(&config)?;

        assert_eq!(result.name(), "optifine");
        assert_eq!(result.root(), root.as_path());
        assert_eq!(result.priority(), 3);
        assert_eq!(result.link_folders(), ["shaderpacks"]);
        let sections = result
            .match_criteria()
            .iter()
            .map(|condition| (condition.section(), condition.values().to_vec()))
            .collect::<Vec<_>>();
        assert_eq!(
            sections,
            vec![
                ("minecraft", vec!["1.19.*".to_string()]),
                ("modloader", vec!["vanilla".to_string(), "optifine".to_string()]),
            ]
        );
        assert_eq!(result.to_string(), "3. optifine");

        Ok(())
    }

    #[test]
    fn version_specs_with_operators_survive_parsing() -> anyhow::Result<()> {
        let document = IniDocument::parse(indoc! {r#"
            [minecraft]
            >=1.19.0, <1.20.0
        "#})?;
        let result = ShulkerBox::from_document("EnderChest/1.19", &document)?;

        assert_eq!(result.match_criteria()[0].values(), [">=1.19.0, <1.20.0"]);
        assert!(result.matches(&axolotl()));
        assert!(!result.matches(&bee()));

        let rewritten = IniDocument::parse(&result.to_document().to_string())?;
        let result = ShulkerBox::from_document("EnderChest/1.19", &rewritten)?;
        assert_eq!(result.match_criteria()[0].values(), [">=1.19.0, <1.20.0"]);

        Ok(())
    }

    #[test]
    fn key_only_values_keep_colons() -> anyhow::Result<()> {
        let document = IniDocument::parse(indoc! {r#"
            [tags]
            season:winter
        "#})?;
        let result = ShulkerBox::from_document("EnderChest/winter", &document)?;

        assert_eq!(result.match_criteria()[0].values(), ["season:winter"]);
        assert!(result.matches(&axolotl().with_tags(["season:winter"])));
        assert!(!result.matches(&axolotl().with_tags(["season:summer"])));

        Ok(())
    }

    #[test]
    fn copies_leave_original_untouched() -> anyhow::Result<()> {
        let original = shulker_with(&[("instances", &["bee"])]);

        let widened = original.with_match_criteria([MatchCondition::new("minecraft", ["*"])?]);
        assert!(!original.matches(&axolotl()));
        assert!(widened.matches(&axolotl()));

        let promoted = original.with_priority(5);
        assert_eq!(original.priority(), 0);
        assert_eq!(promoted.priority(), 5);
        assert_eq!(original.link_order(&promoted), Ordering::Less);
        assert_eq!(promoted.match_criteria(), original.match_criteria());

        Ok(())
    }

    #[test]
    fn from_cfg_rejects_bad_priority() -> anyhow::Result<()> {
        let document = IniDocument::parse(indoc! {r#"
            [properties]
            priority = high
        "#})?;
        let result = ShulkerBox::from_document("EnderChest/global", &document);

        assert!(matches!(result, Err(ShulkerError::InvalidPriority { .. })));

        Ok(())
    }

    #[test]
    fn write_to_cfg_preserves_conditions_and_folders() -> anyhow::Result<()> {
        let chest = TempDir::new()?;
        let root = chest.path().join("1.19");
        std::fs::create_dir(&root)?;
        let config = root.join(SHULKER_BOX_CONFIG_NAME);

        let shulker = ShulkerBox::new(
            1,
            "1.19",
            &root,
            [
                MatchCondition::new("minecraft", ["1.19", "1.19.*"])?,
                MatchCondition::new("Tags", ["aesthetic"])?,
            ],
            ["saves", "screenshots"],
        );
        shulker.write_to_cfg(&config)?;

        let written = read_to_string(&config)?;
        assert!(written.starts_with("; 1.19/shulkerbox.cfg\n[properties]\n"));
        assert!(written.contains("generated_by_enderchest_version"));

        let result = ShulkerBox::from_cfg(&config)?;
        assert_eq!(result, shulker);

        Ok(())
    }

    #[test]
    fn link_order_breaks_priority_ties_by_name() {
        let mut boxes = vec![
            ShulkerBox::new(1, "vanilla", "EnderChest/vanilla", [], [""; 0]),
            ShulkerBox::new(0, "global", "EnderChest/global", [], [""; 0]),
            ShulkerBox::new(1, "1.19", "EnderChest/1.19", [], [""; 0]),
        ];
        boxes.sort_by(ShulkerBox::link_order);

        let names = boxes.iter().map(ShulkerBox::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["global", "1.19", "vanilla"]);
    }
}
