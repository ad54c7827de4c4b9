//! Contains all the definition of command line arguments.

mod assemble;
mod list;
mod shell;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::core::manifest::{baked_in_manifest, EnvironmentManifest, TomlParser};
use crate::core::variant::VariantId;
use crate::utils;

/// Assemble isolated cross-compilation build environments.
#[derive(Parser, Debug)]
#[command(version, about, arg_required_else_help(true))]
pub struct CrossEnv {
    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Suppress non-critical messages
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
    #[command(subcommand)]
    command: Subcommands,
}

#[derive(Subcommand, Debug)]
enum Subcommands {
    /// Assemble a ready-to-use environment for a toolchain variant
    Assemble {
        /// Toolchain variant to install, e.g. 'mipsel32r6-uClibc'
        #[arg(long, value_name = "VARIANT")]
        variant: Option<VariantId>,
        /// Base OS image to layer the environment on, e.g. 'ubuntu:24.04'
        #[arg(long, value_name = "IMAGE")]
        base_image: Option<String>,
        /// Specify a path of a manifest file describing the environment
        #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,
        /// Where to build the environment snapshot
        #[arg(long, value_name = "PATH", value_hint = ValueHint::DirPath)]
        snapshot: Option<PathBuf>,
    },
    /// Show base images and toolchain variants the stores can resolve
    List {
        /// Specify a path of a manifest file describing the environment
        #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,
        #[command(subcommand)]
        command: Option<list::ListCommand>,
    },
    /// Enter an assembled environment
    Shell {
        /// Toolchain variant whose environment to enter
        #[arg(long, value_name = "VARIANT")]
        variant: Option<VariantId>,
        /// Snapshot of the environment to enter
        #[arg(long, value_name = "PATH", value_hint = ValueHint::DirPath)]
        snapshot: Option<PathBuf>,
        /// Specify a path of a manifest file describing the environment
        #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,
        /// Run a single command instead of an interactive shell
        #[arg(short, long, value_name = "CMD")]
        command: Option<String>,
    },
}

macro_rules! return_if_executed {
    ($($fn:expr),+) => {
        $(
            if $fn {
                return Ok(());
            }
        )*
    };
}

impl Subcommands {
    fn execute(&self) -> Result<()> {
        return_if_executed! {
            assemble::execute(self)?,
            list::execute(self)?,
            shell::execute(self)?
        }
        Ok(())
    }
}

/// Load the manifest from a given path, falling back to the baked-in one.
fn load_manifest(path: Option<&PathBuf>) -> Result<EnvironmentManifest> {
    match path {
        Some(p) => EnvironmentManifest::load(p),
        None => baked_in_manifest(),
    }
}

pub fn run() -> Result<()> {
    let cli = CrossEnv::parse();
    setup(cli.verbose, cli.quiet)?;

    cli.command.execute()
}

fn setup(verbose: bool, quiet: bool) -> Result<()> {
    utils::Logger::new().verbose(verbose).quiet(quiet).setup()
}
