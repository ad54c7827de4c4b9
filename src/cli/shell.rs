use anyhow::Result;

use super::Subcommands;
use crate::core::assembler::{default_snapshot_dir, ProvisionedEnvironment};

/// Execute `shell` command.
pub(super) fn execute(subcommand: &Subcommands) -> Result<bool> {
    let Subcommands::Shell {
        variant,
        snapshot,
        manifest,
        command,
    } = subcommand
    else {
        return Ok(false);
    };

    let mut manifest = super::load_manifest(manifest.as_ref())?;
    if let Some(variant) = variant {
        manifest.variant = variant.clone();
    }

    let snapshot = snapshot
        .clone()
        .unwrap_or_else(|| default_snapshot_dir(&manifest.variant));

    let env = ProvisionedEnvironment::open(snapshot, &manifest.install_dir, &manifest.workdir)?;
    env.command_shell(command.as_deref())?;
    Ok(true)
}
