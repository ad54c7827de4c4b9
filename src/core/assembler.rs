use anyhow::{bail, Result};
use indexmap::IndexSet;
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::error::ProvisionError;
use super::image::ImageStore;
use super::manifest::EnvironmentManifest;
use super::packages::PackageIndex;
use super::profile;
use super::toolchain::BundleStore;
use super::variant::VariantId;
use crate::utils;

/// Search path entries every base image starts out with; the toolchain's
/// `bin` directory is appended after them, never ahead of them.
const BASE_SEARCH_PATH: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

/// Progress of one assembly pass. `Ready` is terminal, and no transition
/// leads back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Uninitialized,
    ImageLoaded,
    DependenciesInstalled,
    ToolchainInstalled,
    PathConfigured,
    Ready,
}

impl AssemblyState {
    fn next(self) -> Option<Self> {
        match self {
            Self::Uninitialized => Some(Self::ImageLoaded),
            Self::ImageLoaded => Some(Self::DependenciesInstalled),
            Self::DependenciesInstalled => Some(Self::ToolchainInstalled),
            Self::ToolchainInstalled => Some(Self::PathConfigured),
            Self::PathConfigured => Some(Self::Ready),
            Self::Ready => None,
        }
    }
}

/// Everything one assembly pass needs to know, resolved from a manifest.
#[derive(Debug)]
pub struct AssembleConfig {
    pub base_image: String,
    pub variant: VariantId,
    pub dependencies: IndexSet<String>,
    /// Environment-absolute path the toolchain bundle lands at.
    pub install_dir: PathBuf,
    /// Environment-absolute path of the default execution context.
    pub workdir: PathBuf,
    /// Host path the snapshot is built at.
    pub snapshot: PathBuf,
    image_store: ImageStore,
    bundle_store: BundleStore,
}

impl AssembleConfig {
    pub fn new(manifest: EnvironmentManifest, snapshot: PathBuf) -> Result<Self> {
        if !manifest.install_dir.is_absolute() || !manifest.workdir.is_absolute() {
            bail!("'install-dir' and 'workdir' must be absolute paths inside the environment");
        }
        if manifest.workdir == manifest.install_dir || manifest.workdir.starts_with(&manifest.install_dir)
        {
            bail!(
                "'workdir' ('{}') must not coincide with the toolchain install path ('{}')",
                manifest.workdir.display(),
                manifest.install_dir.display()
            );
        }

        let image_store = manifest
            .image_store
            .map(ImageStore::new)
            .unwrap_or_else(|| ImageStore::new(ImageStore::default_location()));
        let bundle_store = manifest
            .bundle_store
            .map(BundleStore::new)
            .unwrap_or_else(|| BundleStore::new(BundleStore::default_location()));

        Ok(Self {
            base_image: manifest.base_image,
            variant: manifest.variant,
            dependencies: manifest.dependencies,
            install_dir: manifest.install_dir,
            workdir: manifest.workdir,
            snapshot,
            image_store,
            bundle_store,
        })
    }

    fn bin_dir(&self) -> PathBuf {
        self.install_dir.join("bin")
    }
}

/// The snapshot location used when `--snapshot` wasn't given.
pub fn default_snapshot_dir(variant: &VariantId) -> PathBuf {
    utils::assembler_home().join("snapshots").join(&**variant)
}

/// Drives one assembly pass from `Uninitialized` to `Ready`.
///
/// Steps run in a fixed order and any failure aborts the whole pass; the
/// caller discards the snapshot and retries from scratch, there is no
/// partial-environment recovery and no automatic retry of a step.
pub struct Assembler<'i> {
    config: AssembleConfig,
    index: &'i dyn PackageIndex,
    state: AssemblyState,
}

impl<'i> Assembler<'i> {
    pub fn new(config: AssembleConfig, index: &'i dyn PackageIndex) -> Self {
        Self {
            config,
            index,
            state: AssemblyState::Uninitialized,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Run every assembly step, consuming the assembler.
    pub fn assemble(mut self) -> Result<ProvisionedEnvironment> {
        info!(
            "assembling environment for '{}' on top of '{}'",
            self.config.variant, self.config.base_image
        );
        self.load_image()?;
        self.install_dependencies()?;
        self.install_toolchain()?;
        self.configure_search_path()?;
        let env = self.create_workdir()?;
        info!("environment ready at '{}'", env.root().display());
        Ok(env)
    }

    fn transition(&mut self, next: AssemblyState) {
        assert_eq!(
            self.state.next(),
            Some(next),
            "internal error: invalid assembly transition {:?} -> {next:?}",
            self.state
        );
        debug!("assembly state: {:?} -> {next:?}", self.state);
        self.state = next;
    }

    // Step 1: instantiate a private filesystem snapshot from the base image.
    fn load_image(&mut self) -> Result<()> {
        self.config
            .image_store
            .instantiate(&self.config.base_image, &self.config.snapshot)?;
        self.transition(AssemblyState::ImageLoaded);
        Ok(())
    }

    // Steps 2-4: refresh + upgrade, install the declared set, purge metadata.
    fn install_dependencies(&mut self) -> Result<()> {
        let root = &self.config.snapshot;

        info!("refreshing package index");
        self.index.refresh(root)?;
        info!("upgrading base packages");
        self.index.upgrade(root)?;

        for name in &self.config.dependencies {
            if !self.index.available(root, name)? {
                return Err(ProvisionError::DependencyInstall { name: name.clone() }.into());
            }
        }
        if !self.config.dependencies.is_empty() {
            let packages: Vec<&str> = self.config.dependencies.iter().map(String::as_str).collect();
            info!("installing runtime dependencies: {}", packages.join(", "));
            self.index.install(root, &packages)?;
        }

        // Cleanup only; must not run before the install above completed.
        self.index.purge_cache(root)?;

        self.transition(AssemblyState::DependenciesInstalled);
        Ok(())
    }

    // Step 5: copy the toolchain bundle to the fixed install path.
    fn install_toolchain(&mut self) -> Result<()> {
        self.config.bundle_store.install(
            &self.config.variant,
            &self.config.snapshot,
            &self.config.install_dir,
        )?;
        self.transition(AssemblyState::ToolchainInstalled);
        Ok(())
    }

    // Step 6: append the toolchain's bin directory to the search path.
    // This is the terminal path edit of the whole pass.
    fn configure_search_path(&mut self) -> Result<()> {
        profile::append_search_path(&self.config.snapshot, &self.config.bin_dir())?;
        self.transition(AssemblyState::PathConfigured);
        Ok(())
    }

    // Step 7: fresh, empty working directory as the default execution context.
    fn create_workdir(mut self) -> Result<ProvisionedEnvironment> {
        let relative = self
            .config
            .workdir
            .strip_prefix("/")
            .unwrap_or(&self.config.workdir);
        let target = self.config.snapshot.join(relative);

        if target.exists() && !utils::is_dir_empty(&target)? {
            return Err(ProvisionError::DirectoryConflict(self.config.workdir.clone()).into());
        }
        utils::ensure_dir(&target)?;

        self.transition(AssemblyState::Ready);

        let search_path = BASE_SEARCH_PATH
            .iter()
            .map(PathBuf::from)
            .chain([self.config.bin_dir()])
            .collect();
        Ok(ProvisionedEnvironment {
            root: self.config.snapshot,
            search_path,
            workdir: self.config.workdir,
        })
    }
}

/// The filesystem state and context produced once assembly reaches `Ready`.
///
/// Immutable thereafter; torn down by discarding the snapshot directory.
#[derive(Debug)]
pub struct ProvisionedEnvironment {
    root: PathBuf,
    search_path: Vec<PathBuf>,
    workdir: PathBuf,
}

impl ProvisionedEnvironment {
    /// Re-open a previously assembled environment without re-running assembly.
    ///
    /// Only sanity checks are performed: the snapshot must exist and carry a
    /// toolchain `bin` directory at the expected install path.
    pub fn open(root: PathBuf, install_dir: &Path, workdir: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("no assembled environment found at '{}'", root.display());
        }
        let bin_dir = install_dir.join("bin");
        let host_bin = root.join(bin_dir.strip_prefix("/").unwrap_or(&bin_dir));
        if !host_bin.is_dir() {
            bail!(
                "'{}' does not look like an assembled environment, \
                missing toolchain directory '{}'",
                root.display(),
                bin_dir.display()
            );
        }

        let search_path = BASE_SEARCH_PATH
            .iter()
            .map(PathBuf::from)
            .chain([bin_dir])
            .collect();
        Ok(Self {
            root,
            search_path,
            workdir: workdir.to_path_buf(),
        })
    }

    /// Host path of the snapshot root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ordered directories consulted to resolve a bare executable name
    /// inside the environment. The toolchain's `bin` directory is the last
    /// entry.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Environment-absolute path of the toolchain's executables.
    pub fn toolchain_bin(&self) -> &Path {
        // Construction guarantees the appended bin dir is last.
        self.search_path.last().unwrap()
    }

    /// Environment-absolute path of the default execution context.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The `PATH` value the environment resolves executables with.
    pub fn path_var(&self) -> Result<String> {
        let parts = self
            .search_path
            .iter()
            .map(utils::stringify_path)
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(":"))
    }

    /// Launch the environment's default entry point: an interactive `bash`
    /// rooted at the working directory. With `command`, runs that single
    /// command instead and returns once it exits.
    ///
    /// The shell is started as a login shell so the search path persisted in
    /// `etc/profile` takes effect.
    pub fn command_shell(&self, command: Option<&str>) -> Result<()> {
        let inner = command.unwrap_or("exec bash -i");
        let script = format!("cd {} && {inner}", self.workdir.display());
        utils::execute_interactive(
            "chroot",
            &[
                utils::stringify_path(&self.root)?,
                "/bin/bash".to_string(),
                "-lc".to_string(),
                script,
            ],
        )
    }
}
