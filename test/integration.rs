// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

#![cfg(unix)]

use crate::{CountingConsent, MinecraftRootFixture};

use enderchest::{
    place::{allowlist::FixedConsent, place_ender_chest, Conflict, ConflictKind, PlaceOptions},
    LauncherKind,
};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::{
    fs::{create_dir_all, read_link, read_to_string},
    os::unix::fs::symlink,
    path::Path,
};

const GLOBAL_BOX: &str = indoc! {r#"
    ; global/shulkerbox.cfg
    [minecraft]
    *

    [link-folders]
    screenshots
    logs
"#};

fn with_global_box() -> Result<MinecraftRootFixture> {
    let fixture = MinecraftRootFixture::with_instances()?;
    fixture.write_box("global", GLOBAL_BOX)?;
    fixture.write_file("EnderChest/global/screenshots/sunset.png", "pretty")?;
    fixture.write_file(
        "EnderChest/global/logs/bumpona.log",
        "Like a bump on a bump on a log, baby.\n",
    )?;
    fixture.write_file("EnderChest/global/resourcepacks/stuff.zip", "dfgwhgsadfhsd")?;

    Ok(fixture)
}

fn is_link(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

#[test]
fn place_links_folders_as_units_and_files_one_by_one() -> Result<()> {
    let fixture = with_global_box()?;

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert!(report.is_clean());
    for name in ["axolotl", "bee"] {
        let instance = fixture.instance_root(name);
        assert_eq!(
            read_link(instance.join("screenshots"))?,
            fixture.box_root("global").join("screenshots")
        );
        assert!(instance.join("screenshots").join("sunset.png").exists());
        assert!(!is_link(&instance.join("resourcepacks")));
        assert!(instance.join("resourcepacks").is_dir());
        assert_eq!(
            read_link(instance.join("resourcepacks").join("stuff.zip"))?,
            fixture.box_root("global").join("resourcepacks").join("stuff.zip")
        );
        assert!(instance.join("shulkerbox.cfg").symlink_metadata().is_err());
    }

    Ok(())
}

#[test]
fn second_placement_changes_nothing() -> Result<()> {
    let fixture = with_global_box()?;

    let first = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;
    let second = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert!(first.mutations() > 0);
    assert_eq!(second.mutations(), 0);
    assert!(second.is_clean());

    Ok(())
}

#[test]
fn non_empty_directory_is_preserved_and_reported() -> Result<()> {
    let fixture = with_global_box()?;
    let existing = fixture.instance_root("axolotl").join("screenshots").join("thumbs.db");
    fixture.write_file(&existing, "opposable")?;

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    let expect = vec![Conflict {
        instance: "axolotl".into(),
        path: fixture.instance_root("axolotl").join("screenshots"),
        kind: ConflictKind::NonEmptyDirectory,
    }];
    assert_eq!(report.conflicts, expect);
    assert!(!report.is_clean());
    assert_eq!(read_to_string(&existing)?, "opposable");
    assert!(!is_link(&fixture.instance_root("axolotl").join("screenshots")));

    // INVARIANT: A conflict only blocks its own path.
    assert!(is_link(&fixture.instance_root("axolotl").join("logs")));
    assert!(is_link(&fixture.instance_root("bee").join("screenshots")));

    Ok(())
}

#[test]
fn regular_file_is_preserved_and_reported() -> Result<()> {
    let fixture = with_global_box()?;
    let existing = fixture.instance_root("bee").join("resourcepacks").join("stuff.zip");
    fixture.write_file(&existing, "other_stuff")?;

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].instance, "bee");
    assert_eq!(report.conflicts[0].kind, ConflictKind::File);
    assert_eq!(read_to_string(&existing)?, "other_stuff");

    Ok(())
}

#[test]
fn existing_link_is_replaced() -> Result<()> {
    let fixture = with_global_box()?;
    fixture.write_file("workspace/other_stuff.zip", "working stuff")?;
    let existing = fixture.instance_root("axolotl").join("resourcepacks").join("stuff.zip");
    create_dir_all(existing.parent().unwrap())?;
    symlink(fixture.path().join("workspace").join("other_stuff.zip"), &existing)?;

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert!(report.is_clean());
    assert_eq!(report.links_replaced, 1);
    assert_eq!(read_to_string(&existing)?, "dfgwhgsadfhsd");
    assert_eq!(
        read_to_string(fixture.path().join("workspace").join("other_stuff.zip"))?,
        "working stuff"
    );

    Ok(())
}

#[test]
fn empty_directory_is_replaced_unless_strict() -> Result<()> {
    let fixture = with_global_box()?;
    let logs = fixture.instance_root("axolotl").join("logs");
    create_dir_all(&logs)?;

    let strict = PlaceOptions {
        replace_empty_dirs: false,
        ..PlaceOptions::default()
    };
    let report = place_ender_chest(fixture.store(), strict, &mut FixedConsent(false))?;

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].kind, ConflictKind::EmptyDirectory);
    assert!(logs.is_dir() && !is_link(&logs));

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert!(report.is_clean());
    assert_eq!(report.dirs_replaced, 1);
    assert_eq!(read_link(&logs)?, fixture.box_root("global").join("logs"));

    Ok(())
}

#[test]
fn broken_links_into_store_are_pruned() -> Result<()> {
    let fixture = with_global_box()?;
    let shaderpacks = fixture.instance_root("axolotl").join("shaderpacks");
    create_dir_all(&shaderpacks)?;
    let stale = shaderpacks.join("Seuss CitH.zip.txt");
    let foreign = shaderpacks.join("mine.zip");
    symlink(fixture.box_root("global").join("Seuss CitH.zip.txt"), &stale)?;
    symlink(fixture.path().join("i-do-not-exist.txt"), &foreign)?;

    let keep = PlaceOptions {
        clean_broken_links: false,
        ..PlaceOptions::default()
    };
    let report = place_ender_chest(fixture.store(), keep, &mut FixedConsent(false))?;
    assert_eq!(report.broken_links_removed, 0);
    assert!(is_link(&stale));

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert_eq!(report.broken_links_removed, 1);
    assert!(stale.symlink_metadata().is_err());
    assert!(is_link(&foreign));

    Ok(())
}

#[test]
fn higher_priority_box_wins_shared_folder() -> Result<()> {
    let fixture = MinecraftRootFixture::with_instances()?;
    fixture.write_box("a", "[properties]\npriority = 0\n\n[link-folders]\nlogs\n")?;
    fixture.write_box("b", "[properties]\npriority = 1\n\n[link-folders]\nlogs\n")?;
    fixture.write_file("EnderChest/a/logs/a.log", "from a")?;
    fixture.write_file("EnderChest/b/logs/b.log", "from b")?;

    place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;
    let second = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    let logs = fixture.instance_root("axolotl").join("logs");
    assert_eq!(read_link(&logs)?, fixture.box_root("b").join("logs"));
    assert_eq!(read_to_string(logs.join("b.log"))?, "from b");
    assert_eq!(second.mutations(), 0);

    Ok(())
}

#[test]
fn boxes_only_reach_matching_instances() -> Result<()> {
    let fixture = MinecraftRootFixture::with_instances()?;
    fixture.write_box("fabric", "[modloader]\nfabric\n")?;
    fixture.write_file("EnderChest/fabric/config/sodium-options.json", "{}")?;
    fixture.write_box("aquarium", "[minecraft]\n1.19.*\n\n[tags]\naquatic\n")?;
    fixture.write_file("EnderChest/aquarium/options.txt", "fov:90")?;
    fixture.write_box("forge", "[modloader]\nforge\n")?;
    fixture.write_file("EnderChest/forge/mods/jei.jar", "")?;

    place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    let axolotl = fixture.instance_root("axolotl");
    let bee = fixture.instance_root("bee");
    assert!(is_link(&bee.join("config").join("sodium-options.json")));
    assert!(!axolotl.join("config").exists());
    assert!(is_link(&axolotl.join("options.txt")));
    assert!(!bee.join("options.txt").exists());
    assert!(!axolotl.join("mods").exists());
    assert!(!bee.join("mods").exists());

    let matches = fixture.store().shulker_box_matches("fabric");
    assert_eq!(matches.iter().map(|instance| instance.name()).collect::<Vec<_>>(), vec!["bee"]);

    Ok(())
}

#[test]
fn allowlist_is_updated_only_with_consent() -> Result<()> {
    let fixture = with_global_box()?;
    let store_path = fixture.store().folder().to_string_lossy().into_owned();
    let bee_allowlist = fixture.instance_root("bee").join("allowed_symlinks.txt");
    let axolotl_allowlist = fixture.instance_root("axolotl").join("allowed_symlinks.txt");

    let mut refuse = CountingConsent::answering(false);
    place_ender_chest(fixture.store(), PlaceOptions::default(), &mut refuse)?;
    assert_eq!(refuse.asked, 1);
    assert!(!bee_allowlist.exists());

    let mut accept = CountingConsent::answering(true);
    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut accept)?;
    assert_eq!(accept.asked, 1);
    assert_eq!(report.allowlists_updated, 1);
    assert_eq!(read_to_string(&bee_allowlist)?, format!("{store_path}\n"));
    assert!(!axolotl_allowlist.exists());

    place_ender_chest(fixture.store(), PlaceOptions::default(), &mut accept)?;
    assert_eq!(accept.asked, 1);

    Ok(())
}

#[test]
fn allowlist_is_never_offered_when_disabled() -> Result<()> {
    let fixture = with_global_box()?;
    let mut config = fixture.store().load_config()?;
    config.properties.offer_to_update_symlink_allowlist = false;
    fixture.store().write_config(&config)?;

    let mut consent = CountingConsent::answering(true);
    place_ender_chest(fixture.store(), PlaceOptions::default(), &mut consent)?;

    assert_eq!(consent.asked, 0);
    assert!(!fixture.instance_root("bee").join("allowed_symlinks.txt").exists());

    Ok(())
}

#[test]
fn unloadable_shulker_box_fails_placement() -> Result<()> {
    let fixture = with_global_box()?;
    fixture.write_box("lush", "[biomes]\nlush_caves\n")?;
    fixture.write_file("EnderChest/lush/options.txt", "renderDistance:32\n")?;

    let report = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false))?;

    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].subject, "lush");
    assert!(report.failures[0].reason.contains("biomes"));
    assert!(is_link(&fixture.instance_root("bee").join("screenshots")));
    assert!(!fixture.instance_root("bee").join("options.txt").exists());

    Ok(())
}

#[test]
fn placement_requires_registry() -> Result<()> {
    let fixture = MinecraftRootFixture::new()?;
    std::fs::remove_file(fixture.store().config_path())?;

    let result = place_ender_chest(fixture.store(), PlaceOptions::default(), &mut FixedConsent(false));

    assert!(result.is_err());

    Ok(())
}

#[test]
fn gather_registers_new_instances_once() -> Result<()> {
    let fixture = MinecraftRootFixture::new()?;
    fixture.write_file("official/.minecraft/versions/1.20/1.20.json", r#"{"id": "1.20"}"#)?;
    fixture.write_file(
        "other/.minecraft/versions/1.19.4/1.19.4.json",
        r#"{"id": "1.19.4"}"#,
    )?;
    fixture.write_file("instances/bee/instance.cfg", "InstanceType=OneSix\nname=Busy Bee\n")?;
    fixture.write_file(
        "instances/bee/mmc-pack.json",
        r#"{"components": [{"uid": "net.minecraft", "version": "1.20.1"}, {"uid": "org.quiltmc.quilt-loader", "version": "0.19.1"}]}"#,
    )?;
    create_dir_all(fixture.path().join("instances/bee/.minecraft"))?;

    let registered = fixture
        .store()
        .register_instances([fixture.path()], LauncherKind::Any)?;

    let result = registered
        .iter()
        .map(|instance| (instance.name().to_string(), instance.root().to_path_buf()))
        .collect::<Vec<_>>();
    let expect = vec![
        ("Busy Bee".to_string(), Path::new("instances/bee/.minecraft").to_path_buf()),
        ("official".to_string(), Path::new("official/.minecraft").to_path_buf()),
        ("official.1".to_string(), Path::new("other/.minecraft").to_path_buf()),
    ];
    assert_eq!(result, expect);
    assert_eq!(registered[0].modloader(), Some("Quilt Loader"));

    let again = fixture
        .store()
        .register_instances([fixture.path()], LauncherKind::Any)?;
    assert!(again.is_empty());
    assert_eq!(fixture.store().load_instances().len(), 3);

    let official_only = fixture
        .store()
        .gather_instances(fixture.path(), LauncherKind::Official);
    assert_eq!(official_only.len(), 2);

    Ok(())
}
