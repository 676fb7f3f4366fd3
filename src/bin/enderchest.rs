// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use enderchest::{
    path::default_official_minecraft_dir,
    place::{
        allowlist::{Consent, FixedConsent, InquireConsent},
        place_ender_chest, PlaceOptions,
    },
    store::{EnderChest, LauncherKind},
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  enderchest [options] <enderchest-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Craft(opts) => run_craft(opts),
            Command::Place(opts) => run_place(opts),
            Command::List(opts) => run_list(opts),
            Command::Gather(opts) => run_gather(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create central store and empty instance registry.
    #[command(override_usage = "enderchest craft [root]")]
    Craft(CraftOptions),

    /// Create or update links of every registered instance.
    #[command(override_usage = "enderchest place [options] [root]")]
    Place(PlaceCliOptions),

    /// Show instances, shulker boxes, or which instances a shulker box links to.
    #[command(override_usage = "enderchest list [options] <what> [root]")]
    List(ListOptions),

    /// Search for instances and register them.
    #[command(override_usage = "enderchest gather [options] [<search_path>]...")]
    Gather(GatherOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CraftOptions {
    /// Minecraft root holding the central store.
    #[arg(value_name = "root", default_value = ".")]
    pub root: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PlaceCliOptions {
    /// Minecraft root holding the central store.
    #[arg(value_name = "root", default_value = ".")]
    pub root: PathBuf,

    /// Never replace empty directories with links.
    #[arg(short, long)]
    pub strict: bool,

    /// Leave broken links into the central store alone.
    #[arg(long)]
    pub keep_broken_links: bool,

    /// Update symlink allow-lists without asking.
    #[arg(short, long, group = "consent")]
    pub yes: bool,

    /// Never update symlink allow-lists.
    #[arg(short, long, group = "consent")]
    pub no: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    #[command(subcommand)]
    pub what: ListTarget,
}

#[derive(Debug, Clone, Subcommand)]
enum ListTarget {
    /// List registered instances.
    Instances {
        /// Minecraft root holding the central store.
        #[arg(value_name = "root", default_value = ".")]
        root: PathBuf,
    },

    /// List shulker boxes in link order.
    Boxes {
        /// Minecraft root holding the central store.
        #[arg(value_name = "root", default_value = ".")]
        root: PathBuf,
    },

    /// List instances that link to a shulker box.
    Matches {
        /// Name of shulker box.
        #[arg(value_name = "shulker_box")]
        shulker_box: String,

        /// Minecraft root holding the central store.
        #[arg(value_name = "root", default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GatherOptions {
    /// Minecraft root holding the central store.
    #[arg(short, long, value_name = "root", default_value = ".")]
    pub root: PathBuf,

    /// Directories to search for instances.
    #[arg(value_name = "search_path")]
    pub search_paths: Vec<PathBuf>,

    /// Only look for official launcher instances.
    #[arg(long, group = "launcher")]
    pub official: bool,

    /// Only look for MultiMC-style instances.
    #[arg(long, group = "launcher")]
    pub mmc: bool,
}

fn main() {
    let layer = fmt::layer().compact().without_time().with_target(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_craft(opts: CraftOptions) -> Result<()> {
    EnderChest::open(opts.root).craft()?;

    Ok(())
}

fn run_place(opts: PlaceCliOptions) -> Result<()> {
    let store = EnderChest::open(opts.root);
    let options = PlaceOptions {
        replace_empty_dirs: !opts.strict,
        clean_broken_links: !opts.keep_broken_links,
    };
    let mut consent: Box<dyn Consent> = if opts.yes {
        Box::new(FixedConsent(true))
    } else if opts.no {
        Box::new(FixedConsent(false))
    } else {
        Box::new(InquireConsent)
    };

    let report = place_ender_chest(&store, options, consent.as_mut())?;
    if !report.is_clean() {
        for conflict in &report.conflicts {
            error!("{conflict}");
        }
        for failure in &report.failures {
            error!("{failure}");
        }
        bail!(
            "placement finished with {} conflicts and {} failures",
            report.conflicts.len(),
            report.failures.len()
        );
    }

    Ok(())
}

fn run_list(opts: ListOptions) -> Result<()> {
    match opts.what {
        ListTarget::Instances { root } => {
            EnderChest::open(root).load_instances();
        }
        ListTarget::Boxes { root } => {
            EnderChest::open(root).load_shulker_boxes();
        }
        ListTarget::Matches { shulker_box, root } => {
            EnderChest::open(root).shulker_box_matches(shulker_box);
        }
    }

    Ok(())
}

fn run_gather(opts: GatherOptions) -> Result<()> {
    let launcher = if opts.official {
        LauncherKind::Official
    } else if opts.mmc {
        LauncherKind::MultiMc
    } else {
        LauncherKind::Any
    };

    let search_paths = if opts.search_paths.is_empty() {
        vec![default_official_minecraft_dir()?]
    } else {
        opts.search_paths
    };

    let store = EnderChest::open(opts.root);
    let registered = store.register_instances(search_paths, launcher)?;
    info!("registered {} new instances", registered.len());

    Ok(())
}
