// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Share files across Minecraft instances through links.
//!
//! EnderChest keeps shared content, e.g., resource packs, shaders, options,
//! and logs, in one __central store__ next to your instances. The central
//! store is split into __shulker boxes__, each carrying a set of rules that
//! pick which instances receive it. Placement then links the contents of every
//! matching shulker box into each instance.

pub mod config;
pub mod ini;
pub mod instance;
pub mod path;
pub mod place;
pub mod shulker;
pub mod store;
pub mod version;

pub use config::EnderChestConfig;
pub use instance::InstanceSpec;
pub use place::{place_ender_chest, PlaceOptions, PlacementReport};
pub use shulker::{MatchCondition, ShulkerBox};
pub use store::{EnderChest, LauncherKind};
