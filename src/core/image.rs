use anyhow::{bail, Result};
use log::info;
use std::path::{Path, PathBuf};

use super::error::ProvisionError;
use crate::utils::{self, Extractable};

/// On-host storage of base image rootfs sources.
///
/// An image identifier `<distribution>:<version>` resolves to either a
/// directory `<root>/<identifier>/` holding an unpacked rootfs, or an archive
/// `<root>/<identifier>.tar.{gz,xz}`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

enum ImageSource {
    Rootfs(PathBuf),
    Archive(PathBuf),
}

const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar.xz"];

impl ImageStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The store location used when the manifest doesn't specify one.
    pub fn default_location() -> PathBuf {
        utils::assembler_home().join("images")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn source_for(&self, image: &str) -> Option<ImageSource> {
        let dir = self.root.join(image);
        if dir.is_dir() {
            return Some(ImageSource::Rootfs(dir));
        }
        for suffix in ARCHIVE_SUFFIXES {
            let archive = self.root.join(format!("{image}{suffix}"));
            if archive.is_file() {
                return Some(ImageSource::Archive(archive));
            }
        }
        None
    }

    /// List every image identifier this store can resolve, sorted by name.
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

    /// Instantiate a private snapshot of `image` at `snapshot`.
    ///
    /// The target directory is created if missing, and must be empty; two
    /// assemblies never share one snapshot.
    ///
    /// # Errors
    ///
    /// Fails with [`ProvisionError::ImageNotFound`] if the identifier does not
    /// resolve to anything in this store.
    pub fn instantiate(&self, image: &str, snapshot: &Path) -> Result<()> {
        let source = self
            .source_for(image)
            .ok_or_else(|| ProvisionError::ImageNotFound(image.to_string()))?;

        if snapshot.exists() && !utils::is_dir_empty(snapshot)? {
            bail!(
                "snapshot target '{}' already exists and is not empty",
                snapshot.display()
            );
        }
        utils::ensure_dir(snapshot)?;

        info!("instantiating base image '{image}'");
        match source {
            ImageSource::Rootfs(dir) => utils::copy_dir_contents(&dir, snapshot),
            ImageSource::Archive(file) => Extractable::load(&file)?.extract_to(snapshot),
        }
    }
}
