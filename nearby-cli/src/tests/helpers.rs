//! Test helpers for writing catalog fixtures.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const CATALOG_JSON: &str = r#"[
    {
        "id": "mcgill",
        "name": "McGill University",
        "category": "education",
        "coordinate": {"latitude": 45.5048, "longitude": -73.5772},
        "rating": 4.6
    },
    {
        "id": "jean-talon",
        "name": "Jean-Talon Market",
        "category": "shopping",
        "coordinate": {"latitude": 45.5362, "longitude": -73.6146}
    },
    {
        "id": "old-port",
        "name": "Old Port",
        "category": "entertainment",
        "coordinate": {"latitude": 45.5075, "longitude": -73.5541}
    }
]"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}
