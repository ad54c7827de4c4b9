use anyhow::Result;
use clap::Subcommand;

use super::Subcommands;
use crate::core::image::ImageStore;
use crate::core::toolchain::BundleStore;

#[derive(Subcommand, Debug)]
pub(super) enum ListCommand {
    /// Show base images the image store can resolve
    Images,
    /// Show toolchain variants the bundle store can resolve
    Variants,
}

/// Execute `list` command.
pub(super) fn execute(subcommand: &Subcommands) -> Result<bool> {
    let Subcommands::List { manifest, command } = subcommand else {
        return Ok(false);
    };

    let manifest = super::load_manifest(manifest.as_ref())?;
    let image_store = manifest
        .image_store
        .map(ImageStore::new)
        .unwrap_or_else(|| ImageStore::new(ImageStore::default_location()));
    let bundle_store = manifest
        .bundle_store
        .map(BundleStore::new)
        .unwrap_or_else(|| BundleStore::new(BundleStore::default_location()));

    match command {
        Some(ListCommand::Images) => print_images(&image_store)?,
        Some(ListCommand::Variants) => print_variants(&bundle_store)?,
        None => {
            print_images(&image_store)?;
            print_variants(&bundle_store)?;
        }
    }
    Ok(true)
}

fn print_images(store: &ImageStore) -> Result<()> {
    println!("base images ({}):", store.root().display());
    for image in store.list()? {
        println!("  {image}");
    }
    Ok(())
}

fn print_variants(store: &BundleStore) -> Result<()> {
    println!("toolchain variants ({}):", store.root().display());
    for variant in store.list()? {
        println!("  {variant}");
    }
    Ok(())
}
