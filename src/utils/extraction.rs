use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xz2::read::XzDecoder;

use super::progress_bar::CliProgress;

#[derive(Debug, Clone, Copy)]
enum ExtractableKind {
    /// `gzip` compressed tarballs, ended with `.tar.gz` or `.tgz`
    Gz,
    /// `xz` compressed tarballs, ended with `.tar.xz`
    Xz,
}

/// A rootfs or toolchain-bundle archive that can be unpacked into a directory.
pub struct Extractable<'a> {
    path: &'a Path,
    kind: ExtractableKind,
}

impl<'a> Extractable<'a> {
    pub fn load(path: &'a Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .with_context(|| {
                format!(
                    "'{}' is not extractable because it appears to have no file extension",
                    path.display()
                )
            })?;

        let kind = match ext {
            "gz" | "tgz" => ExtractableKind::Gz,
            "xz" => ExtractableKind::Xz,
            _ => bail!("'{ext}' is not a supported extractable file format"),
        };

        Ok(Self { path, kind })
    }

    /// Extract the archive's content into a specific directory.
    ///
    /// This will extract files under the `root`, make sure it's an empty folder
    /// before using this function.
    pub fn extract_to(&self, root: &Path) -> Result<()> {
        info!("extracting archive '{}'", self.path.display());

        // The archive is walked twice, once to count entries so the progress
        // bar has a total, once to unpack.
        let total = self.open_archive()?.entries()?.count();

        let indicator = CliProgress::new();
        let bar = (indicator.start)(
            total.try_into()?,
            format!("extracting file '{}'", self.path.display()),
        )?;

        let mut archive = self.open_archive()?;
        for (idx, entry) in archive.entries()?.enumerate() {
            let mut entry = entry?;
            // `unpack_in` refuses entries that would escape `root`.
            let unpacked = entry.unpack_in(root)?;
            if !unpacked {
                bail!(
                    "archive '{}' contains an entry pointing outside of the extraction root",
                    self.path.display()
                );
            }
            (indicator.update)(&bar, (idx + 1).try_into()?);
        }
        (indicator.stop)(&bar, "extraction complete.".into());

        Ok(())
    }

    fn open_archive(&self) -> Result<tar::Archive<Box<dyn Read>>> {
        let file = File::open(self.path)
            .with_context(|| format!("failed to open archive '{}'", self.path.display()))?;
        let reader: Box<dyn Read> = match self.kind {
            ExtractableKind::Gz => Box::new(GzDecoder::new(file)),
            ExtractableKind::Xz => Box::new(XzDecoder::new(file)),
        };
        let mut archive = tar::Archive::new(reader);
        archive.set_preserve_permissions(true);
        Ok(archive)
    }
}

impl<'a> TryFrom<&'a Path> for Extractable<'a> {
    type Error = anyhow::Error;
    fn try_from(value: &'a Path) -> std::result::Result<Self, Self::Error> {
        Self::load(value)
    }
}
