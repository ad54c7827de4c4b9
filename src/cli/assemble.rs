//! Separated module to handle assembly related behaviors in command line.

use anyhow::Result;
use log::info;

use super::Subcommands;
use crate::core::assembler::{default_snapshot_dir, AssembleConfig, Assembler};
use crate::core::packages::AptIndex;

/// Execute `assemble` command.
pub(super) fn execute(subcommand: &Subcommands) -> Result<bool> {
    let Subcommands::Assemble {
        variant,
        base_image,
        manifest,
        snapshot,
    } = subcommand
    else {
        return Ok(false);
    };

    let mut manifest = super::load_manifest(manifest.as_ref())?;
    if let Some(variant) = variant {
        manifest.variant = variant.clone();
    }
    if let Some(image) = base_image {
        manifest.base_image = image.clone();
    }

    let snapshot = snapshot
        .clone()
        .unwrap_or_else(|| default_snapshot_dir(&manifest.variant));
    let config = AssembleConfig::new(manifest, snapshot)?;

    let env = Assembler::new(config, &AptIndex).assemble()?;

    info!(
        "toolchain executables resolve from '{}'",
        env.toolchain_bin().display()
    );
    info!(
        "enter the environment with `{} shell --snapshot '{}'`",
        env!("CARGO_PKG_NAME"),
        env.root().display()
    );
    Ok(true)
}
