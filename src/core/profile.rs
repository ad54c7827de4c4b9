use anyhow::{Context, Result};
use std::path::Path;

use crate::utils;

pub(crate) const PROFILE_SECTION_START: &str = "# ===== crossenv path section START =====";
pub(crate) const PROFILE_SECTION_END: &str = "# ===== crossenv path section END =====";

/// Persist the search path extension inside the snapshot.
///
/// Appends a labeled section to the snapshot's `etc/profile` that puts the
/// toolchain's `bin` directory (given as an environment-absolute path) at the
/// end of `PATH`. Login shells entering the environment pick it up, and the
/// host's standard directories keep their precedence for their own names.
///
/// If the section is already present, nothing is written, so re-running
/// assembly against an equivalent snapshot yields the same profile.
pub(crate) fn append_search_path(snapshot: &Path, bin_dir: &Path) -> Result<()> {
    let profile = snapshot.join("etc").join("profile");
    utils::ensure_parent_dir(&profile)?;

    let export_line = format!("export PATH=\"$PATH:{}\"", bin_dir.display());
    let section = format!("{PROFILE_SECTION_START}\n{export_line}\n{PROFILE_SECTION_END}");

    let to_write = match utils::read_to_string(&profile) {
        // Assume the path is configured if the section label presents.
        Ok(content) if content.contains(PROFILE_SECTION_END) => return Ok(()),
        Ok(content) if !content.ends_with('\n') => format!("\n{section}"),
        _ => section,
    };

    utils::write_file(&profile, &to_write, true).with_context(|| {
        format!(
            "failed to append search path to shell profile: '{}'",
            profile.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_appended_to_existing_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot = temp_dir.path();
        utils::ensure_dir(snapshot.join("etc")).unwrap();
        std::fs::write(snapshot.join("etc/profile"), "umask 022\n").unwrap();

        append_search_path(snapshot, Path::new("/compiling/bin")).unwrap();

        let content = utils::read_to_string(snapshot.join("etc/profile")).unwrap();
        assert!(content.starts_with("umask 022\n"));
        assert!(content.contains(PROFILE_SECTION_START));
        assert!(content.contains("export PATH=\"$PATH:/compiling/bin\""));
        assert!(content.contains(PROFILE_SECTION_END));
    }

    #[test]
    fn profile_created_when_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        append_search_path(temp_dir.path(), Path::new("/compiling/bin")).unwrap();
        let content = utils::read_to_string(temp_dir.path().join("etc/profile")).unwrap();
        assert!(content.contains("/compiling/bin"));
    }

    #[test]
    fn second_append_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        append_search_path(temp_dir.path(), Path::new("/compiling/bin")).unwrap();
        let first = utils::read_to_string(temp_dir.path().join("etc/profile")).unwrap();

        append_search_path(temp_dir.path(), Path::new("/compiling/bin")).unwrap();
        let second = utils::read_to_string(temp_dir.path().join("etc/profile")).unwrap();

        assert_eq!(first, second);
    }
}
