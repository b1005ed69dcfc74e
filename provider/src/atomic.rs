//! Atomic, create-once document writes.
//!
//! Documents in the public tree are written to a temporary file in the
//! destination directory, synced, and then linked into place. Readers either
//! see no file or the complete file. An existing destination is never
//! replaced.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};

/// Permission bits for published documents.
#[cfg(unix)]
const PUBLIC_FILE_MODE: u32 = 0o644;

/// Publish `contents` at `path` atomically.
///
/// # Errors
///
/// Returns [`io::ErrorKind::AlreadyExists`] when `path` exists, or any I/O
/// error raised while writing the temporary file.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let parent = parent_dir(path);
    let mut temp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(parent)?;

    temp.write_all(contents)?;

    // Temporary files start out private.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(PUBLIC_FILE_MODE))?;
    }

    temp.as_file().sync_all()?;
    temp.persist_noclobber(path).map_err(|err| err.error)?;
    Ok(())
}

/// Serialise `value` as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns the serialisation error unchanged.
pub fn to_json_document<T: serde::Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn parent_dir(path: &Utf8Path) -> Utf8PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
        _ => Utf8PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        (temp, path)
    }

    #[test]
    fn writes_complete_document() {
        let (_temp, root) = temp_root();
        let path = root.join("provider-metadata.json");

        write_atomic(&path, b"{}\n").expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "{}\n");
    }

    #[test]
    fn never_replaces_existing_document() {
        let (_temp, root) = temp_root();
        let path = root.join("provider-metadata.json");
        std::fs::write(&path, b"original").expect("seed");

        let err = write_atomic(&path, b"replacement").expect_err("must not clobber");

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "original");
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let (_temp, root) = temp_root();
        let path = root.join("provider-metadata.json");
        std::fs::write(&path, b"original").expect("seed");

        write_atomic(&path, b"replacement").expect_err("must not clobber");
        write_atomic(&root.join("other.json"), b"{}").expect("write");

        let names: Vec<String> = std::fs::read_dir(&root)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert!(
            names.iter().all(|name| !name.starts_with(".tmp-")),
            "stray temporary files: {names:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn published_documents_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, root) = temp_root();
        let path = root.join("doc.json");
        write_atomic(&path, b"{}").expect("write");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, PUBLIC_FILE_MODE);
    }

    #[test]
    fn json_documents_end_with_newline() {
        let bytes = to_json_document(&serde_json::json!({ "role": "csaf_provider" }))
            .expect("serialise");
        assert_eq!(bytes.last(), Some(&b'\n'));
    }
}
