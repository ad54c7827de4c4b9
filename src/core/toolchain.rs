use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::ProvisionError;
use super::variant::VariantId;
use crate::utils::{self, Extractable};

/// On-host storage of pre-built toolchain bundles, keyed by variant.
///
/// A variant resolves to either a directory `<root>/<variant>/` or an archive
/// `<root>/<variant>.tar.{gz,xz}`. A bundle is expected to carry a `bin`
/// subdirectory with the cross tools in it.
#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

enum BundleSource {
    Dir(PathBuf),
    Archive(PathBuf),
}

const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar.xz"];

impl BundleStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The store location used when the manifest doesn't specify one.
    pub fn default_location() -> PathBuf {
        utils::assembler_home().join("bundles")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn source_for(&self, variant: &VariantId) -> Option<BundleSource> {
        let dir = self.root.join(&**variant);
        if dir.is_dir() {
            return Some(BundleSource::Dir(dir));
        }
        for suffix in ARCHIVE_SUFFIXES {
            let archive = self.root.join(format!("{variant}{suffix}"));
            if archive.is_file() {
                return Some(BundleSource::Archive(archive));
            }
        }
        None
    }

    /// List every variant this store can resolve, sorted by name.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(vec![]);
        }
        let mut res = vec![];
        for entry in utils::walk_dir(&self.root)? {
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if entry.is_dir() {
                res.push(name.to_string());
            } else if let Some(stripped) = ARCHIVE_SUFFIXES
                .iter()
                .find_map(|suffix| name.strip_suffix(suffix))
            {
                res.push(stripped.to_string());
            }
        }
        res.sort();
        res.dedup();
        Ok(res)
    }

    /// Copy the bundle of `variant` into the snapshot, placing it at the
    /// environment-absolute `install_dir`.
    ///
    /// The copy is atomic from the environment's point of view: the bundle is
    /// staged into a temporary directory under the snapshot (so the final
    /// rename stays on one filesystem) and only renamed into place once fully
    /// written. A failed installation leaves nothing at the install path.
    ///
    /// # Errors
    ///
    /// Fails with [`ProvisionError::VariantNotFound`] if no bundle exists for
    /// the given variant.
    pub fn install(
        &self,
        variant: &VariantId,
        snapshot: &Path,
        install_dir: &Path,
    ) -> Result<PathBuf> {
        let source = self
            .source_for(variant)
            .ok_or_else(|| ProvisionError::VariantNotFound(variant.to_string()))?;

        let relative = install_dir.strip_prefix("/").unwrap_or(install_dir);
        let target = snapshot.join(relative);

        let staging = tempfile::Builder::new()
            .prefix(".bundle-stage_")
            .tempdir_in(snapshot)
            .with_context(|| {
                format!(
                    "unable to create staging directory under '{}'",
                    snapshot.display()
                )
            })?;
        let staged = staging.path().join(&**variant);

        info!("installing toolchain bundle '{variant}'");
        match source {
            BundleSource::Dir(dir) => utils::copy_dir_contents(&dir, &staged)?,
            BundleSource::Archive(file) => {
                utils::ensure_dir(&staged)?;
                Extractable::load(&file)?.extract_to(&staged)?;
            }
        }

        utils::ensure_parent_dir(&target)?;
        if target.exists() {
            // A leftover from an earlier aborted assembly against this
            // snapshot; it was never exposed as complete, replace it.
            debug!("removing stale install path '{}'", target.display());
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staged, &target).with_context(|| {
            format!("failed to move staged bundle into '{}'", target.display())
        })?;

        Ok(target)
    }
}
