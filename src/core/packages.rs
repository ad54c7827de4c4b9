use anyhow::{Context, Result};
use log::debug;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crate::utils;

/// Package-index operations the assembler performs against a snapshot.
///
/// The index is an explicit collaborator passed into the assembler rather
/// than ambient state, so two assemblies against different snapshots never
/// observe each other, and tests can substitute a double.
pub trait PackageIndex {
    /// Refresh the package index inside the snapshot.
    fn refresh(&self, root: &Path) -> Result<()>;
    /// Upgrade every installed package to the index's latest version.
    fn upgrade(&self, root: &Path) -> Result<()>;
    /// Whether `package` can be installed from the current index.
    fn available(&self, root: &Path, package: &str) -> Result<bool>;
    /// Install the given set of packages. Packages already satisfied by the
    /// base image are a no-op.
    fn install(&self, root: &Path, packages: &[&str]) -> Result<()>;
    /// Drop cached index metadata to keep the snapshot small. Must only be
    /// called after [`install`](PackageIndex::install) completed.
    fn purge_cache(&self, root: &Path) -> Result<()>;
}

/// Debian's apt, invoked inside the snapshot through `chroot`.
pub struct AptIndex;

const APT_LISTS_DIR: &str = "var/lib/apt/lists";

fn chroot_args<'a, I>(root: &Path, command: I) -> Vec<OsString>
where
    I: IntoIterator<Item = &'a str>,
{
    std::iter::once(root.as_os_str().to_owned())
        .chain(command.into_iter().map(OsString::from))
        .collect()
}

impl PackageIndex for AptIndex {
    fn refresh(&self, root: &Path) -> Result<()> {
        utils::execute("chroot", &chroot_args(root, ["apt-get", "update"]))
    }

    fn upgrade(&self, root: &Path) -> Result<()> {
        utils::execute_with_env(
            "chroot",
            &chroot_args(root, ["apt-get", "upgrade", "-y"]),
            [("DEBIAN_FRONTEND", "noninteractive")],
        )
    }

    fn available(&self, root: &Path, package: &str) -> Result<bool> {
        let code = utils::execute_for_ret_code(
            "chroot",
            &chroot_args(root, ["apt-cache", "show", package]),
        )?;
        Ok(code == 0)
    }

    fn install(&self, root: &Path, packages: &[&str]) -> Result<()> {
        let command = ["apt-get", "install", "-y"]
            .into_iter()
            .chain(packages.iter().copied());
        utils::execute_with_env(
            "chroot",
            &chroot_args(root, command),
            [("DEBIAN_FRONTEND", "noninteractive")],
        )
    }

    fn purge_cache(&self, root: &Path) -> Result<()> {
        let lists = root.join(APT_LISTS_DIR);
        if lists.exists() {
            debug!("purging package index metadata at '{}'", lists.display());
            fs::remove_dir_all(&lists)
                .with_context(|| format!("failed to purge '{}'", lists.display()))?;
            // apt expects the directory itself to remain.
            utils::ensure_dir(&lists)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroot_invocation_shape() {
        let args = chroot_args(Path::new("/tmp/snap"), ["apt-get", "install", "-y", "libmpc3"]);
        let rendered: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
        assert_eq!(
            rendered,
            ["/tmp/snap", "apt-get", "install", "-y", "libmpc3"]
        );
    }

    #[test]
    fn cache_purge_empties_lists_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let lists = temp_dir.path().join(APT_LISTS_DIR);
        utils::ensure_dir(&lists).unwrap();
        std::fs::write(lists.join("archive.ubuntu.com_dists"), "metadata").unwrap();

        AptIndex.purge_cache(temp_dir.path()).unwrap();

        assert!(lists.is_dir());
        assert!(utils::is_dir_empty(&lists).unwrap());
    }

    #[test]
    fn cache_purge_without_lists_dir_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        AptIndex.purge_cache(temp_dir.path()).unwrap();
        assert!(!temp_dir.path().join(APT_LISTS_DIR).exists());
    }
}
