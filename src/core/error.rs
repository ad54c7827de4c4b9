use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an environment assembly.
///
/// Every variant is fatal: assembly stops at the first failing step, nothing
/// is retried, and the caller is expected to discard the snapshot rather than
/// resume from a partial state.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The base image identifier cannot be resolved in the image store.
    #[error("base image '{0}' cannot be resolved")]
    ImageNotFound(String),
    /// A declared runtime package is not present in the package index.
    #[error("runtime dependency '{name}' could not be installed")]
    DependencyInstall { name: String },
    /// No toolchain bundle exists for the requested variant.
    #[error("no toolchain bundle found for variant '{0}'")]
    VariantNotFound(String),
    /// The working directory path is already occupied by non-empty content.
    #[error("working directory '{}' already exists and is not empty", .0.display())]
    DirectoryConflict(PathBuf),
}
