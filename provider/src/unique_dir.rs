//! Collision-free storage directory allocation.
//!
//! Each non-native classification stores its advisories in a directory
//! named `<label>-<random suffix>` under the advisory storage root. A fresh
//! name is generated on every allocation so that independent provisioning
//! runs never share a directory.

use crate::fs::create_public_dir_all;
use camino::{Utf8Path, Utf8PathBuf};
use std::io;

/// Number of random characters appended to the prefix.
const SUFFIX_LEN: usize = 8;

/// Create a new, uniquely named directory under `base`.
///
/// `base` is created with public permissions if it does not exist yet. The
/// returned directory is kept on disk; it is never cleaned up automatically.
///
/// # Errors
///
/// Returns the I/O error when `base` cannot be created or no unique name
/// could be claimed.
pub fn allocate(base: &Utf8Path, prefix: &str) -> io::Result<Utf8PathBuf> {
    create_public_dir_all(base)?;

    let name_prefix = format!("{prefix}-");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&name_prefix).rand_bytes(SUFFIX_LEN);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(
            crate::fs::PUBLIC_DIR_MODE,
        ));
    }

    let dir = builder.tempdir_in(base)?;
    Utf8PathBuf::try_from(dir.keep())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_base() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        (temp, path)
    }

    #[test]
    fn allocated_directory_carries_prefix() {
        let (_temp, base) = temp_base();

        let dir = allocate(&base, "amber").expect("allocate");

        assert!(dir.is_dir());
        assert_eq!(dir.parent(), Some(base.as_path()));
        let name = dir.file_name().expect("file name");
        assert!(name.starts_with("amber-"), "unexpected name {name}");
        assert_eq!(name.len(), "amber-".len() + SUFFIX_LEN);
    }

    #[test]
    fn repeated_allocations_never_collide() {
        let (_temp, base) = temp_base();

        let first = allocate(&base, "red").expect("first");
        let second = allocate(&base, "red").expect("second");

        assert_ne!(first, second);
        assert!(first.is_dir());
        assert!(second.is_dir());
    }

    #[test]
    fn missing_base_is_created() {
        let (_temp, base) = temp_base();
        let storage = base.join("advisories");

        let dir = allocate(&storage, "green").expect("allocate");

        assert!(storage.is_dir());
        assert!(dir.starts_with(&storage));
    }

    #[cfg(unix)]
    #[test]
    fn allocated_directory_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, base) = temp_base();
        let dir = allocate(&base, "amber").expect("allocate");

        let mode = std::fs::metadata(&dir).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o005, 0o005, "others need read and traverse: {mode:o}");
    }

    #[test]
    fn file_in_place_of_base_fails() {
        let (_temp, base) = temp_base();
        let blocker = base.join("storage");
        std::fs::write(&blocker, b"not a directory").expect("write blocker");

        assert!(allocate(&blocker, "amber").is_err());
    }
}
