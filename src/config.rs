// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Instance registry layout.
//!
//! Specify the layout of the `enderchest.cfg` file that sits at the top of the
//! central store, to simplify the process of serialization and
//! deserialization. File I/O is left to the caller to figure out.
//!
//! # General Layout
//!
//! ```ini
//! [properties]
//! offer-to-update-symlink-allowlist = true
//!
//! [official]
//! root = ~/.minecraft
//! minecraft_version = 1.20.1 1.19.4
//! tags = vanilla
//!
//! [bee]
//! root = instances/bee/.minecraft
//! minecraft_version = 1.20.1
//! modloader = Fabric Loader
//! tags = pvp, aesthetic
//! ```
//!
//! The `properties` and `remotes` sections are reserved. Every other section
//! registers one instance under the section's name.

use crate::{
    ini::{IniDocument, IniError, IniSection},
    instance::InstanceSpec,
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::warn;

const PROPERTIES: &str = "properties";
const REMOTES: &str = "remotes";
const OFFER_ALLOWLIST: &str = "offer-to-update-symlink-allowlist";

/// Instance registry of a central store.
///
/// Instance sections that fail to parse are isolated: they are reported, left
/// out of [`EnderChestConfig::instances`], and written back verbatim so a
/// rewrite never loses them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnderChestConfig {
    /// Store-wide settings.
    pub properties: ChestProperties,

    /// Registered instances in declaration order.
    pub instances: Vec<InstanceSpec>,

    remotes: Option<IniSection>,
    unparsed: Vec<IniSection>,
}

impl EnderChestConfig {
    /// Register an instance, replacing any registered under the same name.
    pub fn register(&mut self, instance: InstanceSpec) {
        match self
            .instances
            .iter_mut()
            .find(|registered| registered.name() == instance.name())
        {
            Some(registered) => *registered = instance,
            None => self.instances.push(instance),
        }
    }

    /// Names of registry sections that could not be parsed as instances.
    pub fn unparsed_sections(&self) -> impl Iterator<Item = &str> {
        self.unparsed.iter().map(IniSection::name)
    }
}

impl FromStr for EnderChestConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let document = IniDocument::parse(data)?;
        let mut config = EnderChestConfig::default();

        for section in document.sections() {
            match section.name() {
                PROPERTIES => config.properties = ChestProperties::from_section(section)?,
                REMOTES => config.remotes = Some(section.clone()),
                name => match InstanceSpec::from_section(section) {
                    Ok(instance) => config.instances.push(instance),
                    Err(err) => {
                        warn!("skip instance {name:?} in registry: {err}");
                        config.unparsed.push(section.clone());
                    }
                },
            }
        }

        Ok(config)
    }
}

impl Display for EnderChestConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let mut document = IniDocument::new();
        document.push_section(self.properties.to_section());
        if let Some(remotes) = &self.remotes {
            document.push_section(remotes.clone());
        }
        for instance in &self.instances {
            document.push_section(instance.to_section());
        }
        for section in &self.unparsed {
            document.push_section(section.clone());
        }

        write!(fmt, "{document}")
    }
}

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestProperties {
    /// Offer to add the central store to the allow-list of instances that
    /// enforce one.
    pub offer_to_update_symlink_allowlist: bool,

    extra: Vec<(String, String)>,
}

impl Default for ChestProperties {
    fn default() -> Self {
        Self {
            offer_to_update_symlink_allowlist: true,
            extra: Vec::new(),
        }
    }
}

impl ChestProperties {
    fn from_section(section: &IniSection) -> Result<Self> {
        let mut properties = Self::default();
        for key in section.keys() {
            let value = section.get(key).unwrap_or_default();
            if key == OFFER_ALLOWLIST {
                properties.offer_to_update_symlink_allowlist =
                    parse_bool(value).ok_or_else(|| ConfigError::InvalidProperty {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
            } else {
                properties.extra.push((key.to_string(), value.to_string()));
            }
        }

        Ok(properties)
    }

    fn to_section(&self) -> IniSection {
        let mut section = IniSection::new(PROPERTIES);
        section.set(
            OFFER_ALLOWLIST,
            self.offer_to_update_symlink_allowlist.to_string(),
        );
        for (key, value) in &self.extra {
            section.set(key, value);
        }

        section
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Registry is not valid INI.
    #[error(transparent)]
    Ini(#[from] IniError),

    /// Property holds a value of the wrong type.
    #[error("property {key:?} has invalid value {value:?}")]
    InvalidProperty { key: String, value: String },
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_registry() -> anyhow::Result<()> {
        let result: EnderChestConfig = indoc! {r#"
            [properties]
            offer-to-update-symlink-allowlist = False

            [official]
            root = ~/.minecraft
            minecraft_version = 1.20.1 1.19.4
            tags = vanilla

            [axolotl]
            root = instances/axolotl/.minecraft
            minecraft_version = 1.19.2
        "#}
        .parse()?;

        assert!(!result.properties.offer_to_update_symlink_allowlist);
        let expect = vec![
            InstanceSpec::new(
                "official",
                "~/.minecraft",
                ["1.20.1", "1.19.4"],
                None,
                ["vanilla"],
            )?,
            InstanceSpec::new(
                "axolotl",
                "instances/axolotl/.minecraft",
                ["1.19.2"],
                None,
                [""; 0],
            )?,
        ];
        assert_eq!(result.instances, expect);

        Ok(())
    }

    #[test]
    fn bad_instance_section_is_isolated_and_kept() -> anyhow::Result<()> {
        let result: EnderChestConfig = indoc! {r#"
            [properties]

            [broken]
            root = instances/broken/.minecraft

            [axolotl]
            root = instances/axolotl/.minecraft
            minecraft_version = 1.19.2
        "#}
        .parse()?;

        assert!(result.properties.offer_to_update_symlink_allowlist);
        assert_eq!(result.instances.len(), 1);
        assert_eq!(result.unparsed_sections().collect::<Vec<_>>(), vec!["broken"]);

        let rewritten: EnderChestConfig = result.to_string().parse()?;
        assert_eq!(rewritten, result);

        Ok(())
    }

    #[test]
    fn instance_named_default_is_registered() -> anyhow::Result<()> {
        let result: EnderChestConfig = indoc! {r#"
            [properties]

            [default]
            root = instances/default/.minecraft
            minecraft_version = 1.20

            [bee]
            root = instances/bee/.minecraft
            minecraft_version = 1.20.1
        "#}
        .parse()?;

        let names = result.instances.iter().map(InstanceSpec::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["default", "bee"]);

        Ok(())
    }

    #[test]
    fn invalid_property_is_an_error() {
        let result = indoc! {r#"
            [properties]
            offer-to-update-symlink-allowlist = maybe
        "#}
        .parse::<EnderChestConfig>();

        assert!(matches!(result, Err(ConfigError::InvalidProperty { .. })));
    }

    #[test]
    fn register_replaces_same_name() -> anyhow::Result<()> {
        let mut config = EnderChestConfig::default();
        config.register(InstanceSpec::new("bee", "a", ["1.20"], None, [""; 0])?);
        config.register(InstanceSpec::new("bee", "b", ["1.20"], None, [""; 0])?);

        assert_eq!(config.instances.len(), 1);
        assert_eq!(config.instances[0].root(), std::path::Path::new("b"));

        Ok(())
    }
}
