//! Integration tests checking that the disk and in-memory stores agree.
//!
//! The import resolver is written against `FileStore` only, so both
//! implementations must answer the same questions the same way.

use std::fs;
use std::path::Path;

use quarto_vfs::{FileStore, MemoryFileStore, NativeFileStore};

const FILES: &[(&str, &str)] = &[
    ("site.scss", "@import 'base';"),
    ("_base.scss", "body { margin: 0; }"),
    ("vendor/theme/_colors.scss", "$primary: #336699;"),
];

fn native_fixture() -> (tempfile::TempDir, NativeFileStore) {
    let temp = tempfile::tempdir().unwrap();
    for (path, contents) in FILES {
        let full = temp.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    let store = NativeFileStore::new(temp.path());
    (temp, store)
}

#[test]
fn test_native_and_memory_agree() {
    let (_temp, native) = native_fixture();
    let memory = MemoryFileStore::from_files(FILES.iter().copied());

    let probes = [
        "site.scss",
        "_base.scss",
        "base.scss",
        "vendor",
        "vendor/theme",
        "vendor/theme/_colors.scss",
        "vendor/theme/../theme/_colors.scss",
        "vendor/theme/colors.scss",
    ];

    for probe in probes {
        let path = Path::new(probe);
        assert_eq!(
            native.is_file(path).unwrap(),
            memory.is_file(path).unwrap(),
            "is_file disagrees for {probe}"
        );
        assert_eq!(
            native.is_dir(path).unwrap(),
            memory.is_dir(path).unwrap(),
            "is_dir disagrees for {probe}"
        );
    }

    for (path, contents) in FILES {
        let path = Path::new(path);
        assert_eq!(native.read_string(path).unwrap(), *contents);
        assert_eq!(memory.read_string(path).unwrap(), *contents);
    }
}

#[test]
fn test_shared_across_threads() {
    let (_temp, native) = native_fixture();
    let store: std::sync::Arc<dyn FileStore> = std::sync::Arc::new(native);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || store.read_string(Path::new("_base.scss")).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "body { margin: 0; }");
    }
}
