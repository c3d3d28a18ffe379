//! Filesystem helpers built on `cap-std` and `camino`.
//!
//! Paths are resolved against ambient authority once, at the parent
//! directory; the file itself is then opened relative to that handle.

use std::io::{self, Read};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Resolve the parent directory of `path` and return it with the file name.
///
/// # Errors
///
/// Fails when `path` has no file name or its parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Whether `path` is a regular file.
///
/// # Errors
///
/// Fails with [`io::ErrorKind::NotFound`] when nothing exists at `path`, or
/// with the underlying error when the parent cannot be opened.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Read a UTF-8 text file.
///
/// # Errors
///
/// Fails when the file cannot be opened or is not valid UTF-8.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    let mut file = dir.open(name.as_str())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn scratch() -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, root)
    }

    #[rstest]
    fn reads_file_contents(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let path = root.join("places.json");
        std::fs::write(&path, "[]").expect("write fixture");

        assert_eq!(read_to_string(&path).expect("read file"), "[]");
    }

    #[rstest]
    fn file_is_file_distinguishes_directories(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let file = root.join("a.json");
        let nested = root.join("nested");
        std::fs::write(&file, "{}").expect("write fixture");
        std::fs::create_dir(&nested).expect("create dir");

        assert!(file_is_file(&file).expect("stat file"));
        assert!(!file_is_file(&nested).expect("stat dir"));
        let missing = file_is_file(&root.join("missing.json")).expect_err("missing file");
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn missing_file_is_an_error(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let err = read_to_string(&root.join("missing.json")).expect_err("should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn root_has_no_file_name() {
        assert!(open_dir_and_file(Utf8Path::new("/")).is_err());
    }
}
