//! Filesystem abstraction used by every provisioning step.
//!
//! Steps only talk to the disk through [`Filesystem`], so they can be
//! exercised against a mock in unit tests and against [`HostFilesystem`]
//! everywhere else.

use crate::{atomic, unique_dir};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};

/// Permission bits for directories created in the public tree.
#[cfg(unix)]
pub(crate) const PUBLIC_DIR_MODE: u32 = 0o755;

/// Kind of entry found at a path after following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
    /// A socket, FIFO, device or anything else.
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Directory => "a directory",
            Self::File => "a regular file",
            Self::Other => "a special file",
        };
        f.write_str(text)
    }
}

/// Filesystem operations needed to provision the well-known tree.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem {
    /// Return the kind of entry at `path`, following symbolic links.
    ///
    /// Returns `Ok(None)` when nothing exists there, including a dangling
    /// symbolic link.
    ///
    /// # Errors
    ///
    /// Returns any other error raised while inspecting the path.
    fn entry_kind(&self, path: &Utf8Path) -> io::Result<Option<EntryKind>>;

    /// Return true when any entry exists at `path` itself, without
    /// following a final symbolic link.
    ///
    /// A dangling symbolic link counts as an existing entry.
    ///
    /// # Errors
    ///
    /// Returns any error other than [`io::ErrorKind::NotFound`] raised while
    /// inspecting the path.
    fn entry_exists(&self, path: &Utf8Path) -> io::Result<bool>;

    /// Create `path` and any missing ancestors as world-readable
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from directory creation.
    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;

    /// Resolve `path` to its canonical location, following every symbolic
    /// link.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::NotFound`] when nothing exists at `path` or
    /// a link along the way dangles.
    fn resolve(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf>;

    /// Create a symbolic link at `link` pointing to the directory `target`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from link creation, for example
    /// [`io::ErrorKind::AlreadyExists`].
    fn symlink(&self, target: &Utf8Path, link: &Utf8Path) -> io::Result<()>;

    /// Create a new file at `path`, write `contents` and sync it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::AlreadyExists`] if the file exists, or any
    /// error raised while writing.
    fn create_new_file(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;

    /// Create a fresh directory named `<prefix>-<random>` under `base`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when no directory could be created.
    fn allocate_unique_dir(&self, base: &Utf8Path, prefix: &str) -> io::Result<Utf8PathBuf>;

    /// Atomically publish `contents` at `path`, never replacing an
    /// existing file.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::AlreadyExists`] if `path` already exists, or
    /// any error raised while writing.
    fn write_atomic(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;
}

/// [`Filesystem`] backed by the host operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFilesystem;

impl Filesystem for HostFilesystem {
    fn entry_kind(&self, path: &Utf8Path) -> io::Result<Option<EntryKind>> {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(metadata) if metadata.is_file() => Ok(Some(EntryKind::File)),
            Ok(_) => Ok(Some(EntryKind::Other)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn entry_exists(&self, path: &Utf8Path) -> io::Result<bool> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        create_public_dir_all(path)
    }

    fn resolve(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf> {
        let resolved = fs::canonicalize(path)?;
        Utf8PathBuf::try_from(resolved)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn symlink(&self, target: &Utf8Path, link: &Utf8Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }

        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_dir(target, link)
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = (target, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "symbolic links are not supported on this platform",
            ))
        }
    }

    fn create_new_file(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn allocate_unique_dir(&self, base: &Utf8Path, prefix: &str) -> io::Result<Utf8PathBuf> {
        unique_dir::allocate(base, prefix)
    }

    fn write_atomic(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        atomic::write_atomic(path, contents)
    }
}

/// Create `path` and its ancestors with public directory permissions.
pub(crate) fn create_public_dir_all(path: &Utf8Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PUBLIC_DIR_MODE);
    }

    builder.create(path)
}
