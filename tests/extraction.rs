use std::path::PathBuf;

use crossenv::utils::{self, Extractable};

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn extracting_gz_bundle() {
    let temp_dir = tempfile::Builder::new()
        .prefix("extract_test_")
        .tempdir()
        .unwrap();

    let path = data_file("mipsel32r6-uClibc.tar.gz");
    let extractable = Extractable::try_from(path.as_path()).unwrap();
    extractable.extract_to(temp_dir.path()).unwrap();

    assert!(temp_dir.path().join("bin").is_dir());
    assert!(temp_dir
        .path()
        .join("bin")
        .join("mipsel32r6-linux-gcc")
        .is_file());
    assert!(temp_dir.path().join("lib").join("libgcc.a").is_file());
}

#[test]
fn extracting_gz_bundle_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::Builder::new()
        .prefix("extract_test_")
        .tempdir()
        .unwrap();

    let path = data_file("mipsel32r6-uClibc.tar.gz");
    Extractable::load(&path)
        .unwrap()
        .extract_to(temp_dir.path())
        .unwrap();

    let gcc = temp_dir.path().join("bin").join("mipsel32r6-linux-gcc");
    let mode = gcc.metadata().unwrap().permissions().mode();
    assert_ne!(mode & 0o111, 0, "extracted tool should stay executable");
}

#[test]
fn extracting_xz_bundle() {
    let temp_dir = tempfile::Builder::new()
        .prefix("extract_test_")
        .tempdir()
        .unwrap();

    let path = data_file("armv7-musl.tar.xz");
    Extractable::load(&path)
        .unwrap()
        .extract_to(temp_dir.path())
        .unwrap();

    assert!(temp_dir
        .path()
        .join("bin")
        .join("mipsel32r6-linux-gcc")
        .is_file());
}

#[test]
fn unsupported_format_is_refused() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("bundle.rar");
    std::fs::write(&path, "").unwrap();
    assert!(Extractable::load(&path).is_err());

    let no_ext = temp_dir.path().join("bundle");
    std::fs::write(&no_ext, "").unwrap();
    assert!(Extractable::load(&no_ext).is_err());
}

#[test]
fn archived_image_store_entry_is_listed_and_instantiable() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store_root = temp_dir.path().join("images");
    utils::ensure_dir(&store_root).unwrap();
    std::fs::copy(
        data_file("mipsel32r6-uClibc.tar.gz"),
        store_root.join("ubuntu:24.04.tar.gz"),
    )
    .unwrap();

    let store = crossenv::ImageStore::new(&store_root);
    assert_eq!(store.list().unwrap(), ["ubuntu:24.04"]);

    let snapshot = temp_dir.path().join("snapshot");
    store.instantiate("ubuntu:24.04", &snapshot).unwrap();
    assert!(snapshot.join("bin").is_dir());
}
