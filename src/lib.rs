#![deny(unused_must_use)]

pub mod cli;
mod core;
pub mod utils;

// Exports
pub use crate::core::assembler::{
    default_snapshot_dir, AssembleConfig, Assembler, AssemblyState, ProvisionedEnvironment,
};
pub use crate::core::error::ProvisionError;
pub use crate::core::image::ImageStore;
pub use crate::core::manifest::{baked_in_manifest, EnvironmentManifest};
pub use crate::core::packages::{AptIndex, PackageIndex};
pub use crate::core::toolchain::BundleStore;
pub use crate::core::variant::{VariantId, DEFAULT_VARIANT};
