use anyhow::Result;
use indexmap::IndexSet;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml::{de, ser};

use super::variant::VariantId;
use crate::utils;

pub(crate) trait TomlParser {
    /// Deserialize a certain type from [`str`] value.
    fn from_str(from: &str) -> Result<Self>
    where
        Self: Sized + DeserializeOwned,
    {
        Ok(de::from_str(from)?)
    }

    /// Serialize data of a type into [`String`].
    fn to_toml(&self) -> Result<String>
    where
        Self: Sized + Serialize,
    {
        Ok(ser::to_string(self)?)
    }

    /// Load TOML data directly from a certain file path.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized + DeserializeOwned,
    {
        let raw = utils::read_to_string(path)?;
        Self::from_str(&raw)
    }
}

/// Declarative description of the environment to assemble.
///
/// Everything the assembler needs besides the stores themselves: which base
/// image to layer on, which toolchain variant to install by default, and the
/// runtime packages the toolchain binaries link against.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvironmentManifest {
    /// Base OS image to layer the environment on, as `<distribution>:<version>`.
    pub base_image: String,
    /// Toolchain bundle to install when no other variant was requested.
    #[serde(default)]
    pub variant: VariantId,
    /// Runtime shared-library packages required by the toolchain binaries.
    ///
    /// Order is preserved and duplicates are collapsed.
    #[serde(default)]
    pub dependencies: IndexSet<String>,
    /// Absolute path inside the environment the toolchain bundle is copied to.
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
    /// Absolute path inside the environment of the default execution context.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Host directory holding base image rootfs sources.
    ///
    /// Defaults to `images` under [`utils::assembler_home`].
    pub image_store: Option<PathBuf>,
    /// Host directory holding toolchain bundles.
    ///
    /// Defaults to `bundles` under [`utils::assembler_home`].
    pub bundle_store: Option<PathBuf>,
}

impl TomlParser for EnvironmentManifest {}

fn default_install_dir() -> PathBuf {
    PathBuf::from("/compiling")
}

fn default_workdir() -> PathBuf {
    PathBuf::from("/workdir")
}

/// The manifest shipped inside this binary, used when no `--manifest` was given.
pub fn baked_in_manifest() -> Result<EnvironmentManifest> {
    EnvironmentManifest::from_str(include_str!("../../resources/environment.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baked_in_manifest_loads() {
        let manifest = baked_in_manifest().unwrap();
        assert_eq!(manifest.base_image, "ubuntu:24.04");
        assert_eq!(&*manifest.variant, "mipsel32r6-uClibc");
        assert_eq!(
            manifest.dependencies.iter().collect::<Vec<_>>(),
            ["libmpc3", "libmpfr6"]
        );
        assert_eq!(manifest.install_dir, PathBuf::from("/compiling"));
        assert_eq!(manifest.workdir, PathBuf::from("/workdir"));
        assert!(manifest.image_store.is_none());
        assert!(manifest.bundle_store.is_none());
    }

    #[test]
    fn minimal_manifest_uses_defaults() {
        let manifest = EnvironmentManifest::from_str(r#"base-image = "ubuntu:24.04""#).unwrap();
        assert_eq!(&*manifest.variant, super::super::variant::DEFAULT_VARIANT);
        assert!(manifest.dependencies.is_empty());
        assert_eq!(manifest.install_dir, PathBuf::from("/compiling"));
        assert_eq!(manifest.workdir, PathBuf::from("/workdir"));
    }

    #[test]
    fn duplicated_dependencies_collapse() {
        let manifest = EnvironmentManifest::from_str(
            r#"
base-image = "ubuntu:24.04"
dependencies = ["libmpfr6", "libmpc3", "libmpfr6"]
"#,
        )
        .unwrap();
        assert_eq!(
            manifest.dependencies.iter().collect::<Vec<_>>(),
            ["libmpfr6", "libmpc3"]
        );
    }

    #[test]
    fn manifest_roundtrip() {
        let manifest = baked_in_manifest().unwrap();
        let reparsed = EnvironmentManifest::from_str(&manifest.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed.base_image, manifest.base_image);
        assert_eq!(reparsed.variant, manifest.variant);
        assert_eq!(reparsed.dependencies, manifest.dependencies);
    }
}
