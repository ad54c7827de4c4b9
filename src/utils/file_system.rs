use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get a path to user's "home" directory.
///
/// # Panic
///
/// Will panic if such directory cannot be determined,
/// which could be the result of missing certain environment variable at runtime,
/// check [`home::home_dir`] for more information.
pub fn home_dir() -> PathBuf {
    home::home_dir().expect("home directory cannot be determined.")
}

/// Get a path to the root directory of this program's data, typically `$HOME/.<PKG_NAME>`.
///
/// The image store and bundle store live under it by default.
pub fn assembler_home() -> PathBuf {
    home_dir().join(format!(".{}", env!("CARGO_PKG_NAME")))
}

/// Wrapper to [`std::fs::read_to_string`] but with additional error context.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read '{}'", path.as_ref().display()))
}

pub fn stringify_path<P: AsRef<Path>>(path: P) -> Result<String> {
    path.as_ref()
        .to_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            anyhow!(
                "failed to stringify path '{}'",
                path.as_ref().to_string_lossy().to_string()
            )
        })
}

pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(path.as_ref()).with_context(|| {
        format!(
            "unable to create specified directory '{}'",
            path.as_ref().display()
        )
    })
}

pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

pub fn write_file<P: AsRef<Path>>(path: P, content: &str, append: bool) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    if append {
        options.append(true);
    } else {
        options.truncate(true).write(true);
    }
    let mut file = options.create(true).open(path)?;
    writeln!(file, "{content}")?;
    file.sync_data()?;
    Ok(())
}

/// Check whether a directory exists and has no entries in it.
///
/// A non-existing path is not considered empty.
pub fn is_dir_empty<P: AsRef<Path>>(path: P) -> Result<bool> {
    if !path.as_ref().is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(path.as_ref())
        .with_context(|| format!("unable to read directory '{}'", path.as_ref().display()))?;
    Ok(entries.next().is_none())
}

/// List direct entries of a directory.
pub fn walk_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut res = vec![];
    for dir_entry in
        fs::read_dir(dir).with_context(|| format!("unable to read directory '{}'", dir.display()))?
    {
        res.push(dir_entry?.path());
    }
    Ok(res)
}

/// Recursively copy everything under `from` into `to`, which will be created
/// if missing. File permissions are carried over by [`fs::copy`], and symlinks
/// are re-created rather than followed, as a toolchain bundle or rootfs is
/// full of linker symlinks that must stay relative.
pub fn copy_dir_contents(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        bail!("'{}' is not a directory", from.display());
    }
    ensure_dir(to)?;

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let src = entry.path();
        let dest = to.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            let target = fs::read_link(&src)?;
            std::os::unix::fs::symlink(&target, &dest)
                .with_context(|| format!("failed to re-create symlink '{}'", dest.display()))?;
        } else if file_type.is_dir() {
            copy_dir_contents(&src, &dest)?;
        } else {
            fs::copy(&src, &dest).with_context(|| {
                format!("failed to copy '{}' to '{}'", src.display(), dest.display())
            })?;
        }
    }
    Ok(())
}

/// Get the parent directory of current running binary.
pub fn parent_dir_of_cur_exe() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("cannot locate current executable")?;
    exe_path
        .parent()
        .map(ToOwned::to_owned)
        .ok_or_else(|| anyhow!("unable to locate the parent directory of current binary"))
}

/// Get the file name of current running binary, in lowercase.
pub fn lowercase_program_name() -> Option<String> {
    let program_path = std::env::args().next()?;
    let file_name = Path::new(&program_path).file_stem()?;
    Some(file_name.to_string_lossy().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dir_detection() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(is_dir_empty(temp_dir.path()).unwrap());

        std::fs::write(temp_dir.path().join("marker"), "x").unwrap();
        assert!(!is_dir_empty(temp_dir.path()).unwrap());

        assert!(!is_dir_empty(temp_dir.path().join("not_there")).unwrap());
    }

    #[test]
    fn dir_contents_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let src = temp_dir.path().join("src");
        ensure_dir(src.join("bin")).unwrap();
        std::fs::write(src.join("bin").join("tool"), "#!/bin/sh").unwrap();
        std::fs::write(src.join("readme"), "hello").unwrap();
        std::os::unix::fs::symlink("tool", src.join("bin").join("tool-alias")).unwrap();

        let dest = temp_dir.path().join("dest");
        copy_dir_contents(&src, &dest).unwrap();

        assert!(dest.join("bin").join("tool").is_file());
        assert!(dest.join("readme").is_file());
        let link = dest.join("bin").join("tool-alias");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_link(link).unwrap(), PathBuf::from("tool"));
    }
}
