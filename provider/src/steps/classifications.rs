//! Links every non-native classification to its storage directory.

use super::{LinkOutcome, StepOutcome};
use crate::classification::{ClassificationLabel, ClassificationSet};
use crate::error::{StepError, StepResult};
use crate::fs::{EntryKind, Filesystem};
use crate::layout::WellKnownLayout;
use camino::Utf8Path;
use log::{debug, info};
use std::io;

/// Make sure `.well-known/csaf/<label>` resolves to a storage directory for
/// every classification except the native one.
///
/// Labels are handled in configuration order. A link that already resolves
/// to a directory is kept as it is. A missing link gets a freshly allocated
/// directory under `storage_root`.
///
/// # Errors
///
/// Returns [`StepError::StructuralConflict`] when an existing link resolves
/// to something other than a directory, [`StepError::Allocation`] when no
/// storage directory could be created, or [`StepError::Filesystem`] for any
/// other I/O failure, including a dangling link left at the link path.
/// Labels after the failing one are not processed.
pub fn link_classifications(
    fs: &dyn Filesystem,
    layout: &WellKnownLayout,
    storage_root: &Utf8Path,
    classifications: &ClassificationSet,
) -> StepResult<Vec<LinkOutcome>> {
    classifications
        .linked()
        .map(|label| link_classification(fs, layout, storage_root, label))
        .collect()
}

fn link_classification(
    fs: &dyn Filesystem,
    layout: &WellKnownLayout,
    storage_root: &Utf8Path,
    label: &ClassificationLabel,
) -> StepResult<LinkOutcome> {
    let link = layout.classification_link(label);

    match fs.resolve(&link) {
        Ok(target) => {
            match fs
                .entry_kind(&target)
                .map_err(|source| StepError::filesystem("inspect", &target, source))?
            {
                Some(EntryKind::Directory) => {}
                Some(found) => return Err(StepError::StructuralConflict { path: link, found }),
                None => {
                    return Err(StepError::filesystem(
                        "inspect",
                        target,
                        io::Error::from(io::ErrorKind::NotFound),
                    ));
                }
            }
            debug!("{link} already resolves to {target}");
            Ok(LinkOutcome {
                label: label.clone(),
                link,
                target,
                outcome: StepOutcome::AlreadyPresent,
            })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // A dangling link also fails to resolve; it is never replaced.
            let occupied = fs
                .entry_exists(&link)
                .map_err(|source| StepError::filesystem("inspect", &link, source))?;
            if occupied {
                return Err(StepError::filesystem("resolve", link, err));
            }

            let target = fs
                .allocate_unique_dir(storage_root, label.as_str())
                .map_err(|source| StepError::Allocation {
                    base: storage_root.to_owned(),
                    label: label.to_string(),
                    source,
                })?;
            fs.symlink(&target, &link)
                .map_err(|source| StepError::filesystem("create link", &link, source))?;
            info!("linked {link} to {target}");
            Ok(LinkOutcome {
                label: label.clone(),
                link,
                target,
                outcome: StepOutcome::Created,
            })
        }
        Err(source) => Err(StepError::filesystem("resolve", link, source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFilesystem;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    #[fixture]
    fn layout() -> WellKnownLayout {
        WellKnownLayout::new(Utf8Path::new("/srv/www"))
    }

    #[fixture]
    fn classifications() -> ClassificationSet {
        let labels = ["amber", "red", "white"]
            .into_iter()
            .map(|name| ClassificationLabel::new(name).expect("valid label"))
            .collect();
        ClassificationSet::new(labels, ClassificationLabel::new("white").expect("valid label"))
            .expect("valid set")
    }

    fn not_found() -> io::Error {
        io::Error::from(io::ErrorKind::NotFound)
    }

    #[rstest]
    fn missing_links_get_fresh_storage(
        layout: WellKnownLayout,
        classifications: ClassificationSet,
    ) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve().times(2).returning(|_| Err(not_found()));
        fs.expect_entry_exists().times(2).returning(|_| Ok(false));
        fs.expect_allocate_unique_dir()
            .withf(|base, _| base.as_str() == "/var/www")
            .times(2)
            .returning(|base, prefix| Ok(base.join(format!("{prefix}-abcdefgh"))));
        fs.expect_symlink()
            .withf(|target, link| {
                target.as_str() == "/var/www/amber-abcdefgh"
                    && link.as_str() == "/srv/www/.well-known/csaf/amber"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        fs.expect_symlink()
            .withf(|target, link| {
                target.as_str() == "/var/www/red-abcdefgh"
                    && link.as_str() == "/srv/www/.well-known/csaf/red"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let outcomes =
            link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
                .expect("links created");

        let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["amber", "red"]);
        assert!(outcomes.iter().all(|o| o.outcome == StepOutcome::Created));
    }

    #[rstest]
    fn resolving_links_are_kept(layout: WellKnownLayout, classifications: ClassificationSet) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve().times(2).returning(|link| {
            let name = link.file_name().unwrap_or_default();
            Ok(Utf8PathBuf::from(format!("/var/www/{name}-existing")))
        });
        fs.expect_entry_kind()
            .times(2)
            .returning(|_| Ok(Some(EntryKind::Directory)));
        fs.expect_allocate_unique_dir().never();
        fs.expect_symlink().never();

        let outcomes =
            link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
                .expect("links kept");

        assert!(outcomes.iter().all(|o| o.outcome == StepOutcome::AlreadyPresent));
        assert_eq!(
            outcomes.first().map(|o| o.target.as_str()),
            Some("/var/www/amber-existing")
        );
    }

    #[rstest]
    fn link_to_regular_file_conflicts(layout: WellKnownLayout, classifications: ClassificationSet) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve()
            .times(1)
            .returning(|_| Ok(Utf8PathBuf::from("/var/www/notes.txt")));
        fs.expect_entry_kind()
            .returning(|_| Ok(Some(EntryKind::File)));

        let err = link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
            .expect_err("conflict");

        assert!(matches!(
            err,
            StepError::StructuralConflict { ref path, found: EntryKind::File }
                if path.as_str() == "/srv/www/.well-known/csaf/amber"
        ));
    }

    #[rstest]
    fn unexpected_resolution_errors_abort(
        layout: WellKnownLayout,
        classifications: ClassificationSet,
    ) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve()
            .times(1)
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        fs.expect_allocate_unique_dir().never();

        let err = link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
            .expect_err("permission denied");

        assert!(matches!(err, StepError::Filesystem { action: "resolve", .. }));
    }

    #[rstest]
    fn allocation_failure_is_reported(layout: WellKnownLayout, classifications: ClassificationSet) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve().returning(|_| Err(not_found()));
        fs.expect_entry_exists().returning(|_| Ok(false));
        fs.expect_allocate_unique_dir()
            .times(1)
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        fs.expect_symlink().never();

        let err = link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
            .expect_err("allocation fails");

        assert!(matches!(
            err,
            StepError::Allocation { ref label, .. } if label == "amber"
        ));
    }

    #[rstest]
    fn link_collision_is_a_filesystem_error(
        layout: WellKnownLayout,
        classifications: ClassificationSet,
    ) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve().returning(|_| Err(not_found()));
        fs.expect_entry_exists().returning(|_| Ok(false));
        fs.expect_allocate_unique_dir()
            .times(1)
            .returning(|base, prefix| Ok(base.join(format!("{prefix}-abcdefgh"))));
        fs.expect_symlink()
            .times(1)
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::AlreadyExists)));

        let err = link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
            .expect_err("link exists");

        assert!(matches!(err, StepError::Filesystem { action: "create link", .. }));
    }

    #[rstest]
    fn dangling_link_aborts_before_allocating(
        layout: WellKnownLayout,
        classifications: ClassificationSet,
    ) {
        let mut fs = MockFilesystem::new();
        fs.expect_resolve().times(1).returning(|_| Err(not_found()));
        fs.expect_entry_exists()
            .withf(|path| path.as_str() == "/srv/www/.well-known/csaf/amber")
            .times(1)
            .returning(|_| Ok(true));
        fs.expect_allocate_unique_dir().never();
        fs.expect_symlink().never();

        let err = link_classifications(&fs, &layout, Utf8Path::new("/var/www"), &classifications)
            .expect_err("dangling link");

        assert!(matches!(
            err,
            StepError::Filesystem { action: "resolve", ref path, .. }
                if path.as_str() == "/srv/www/.well-known/csaf/amber"
        ));
    }

    #[cfg(unix)]
    #[rstest]
    fn dangling_link_never_leaks_storage_directories(classifications: ClassificationSet) {
        use crate::fs::HostFilesystem;

        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        let layout = WellKnownLayout::new(&root.join("html"));
        let storage = root.join("storage");
        std::fs::create_dir_all(layout.csaf_dir()).expect("create csaf dir");
        std::fs::create_dir_all(&storage).expect("create storage");
        std::os::unix::fs::symlink(root.join("gone"), layout.csaf_dir().join("amber"))
            .expect("dangling link");

        for _ in 0..3 {
            let err = link_classifications(&HostFilesystem, &layout, &storage, &classifications)
                .expect_err("dangling link is kept");
            assert!(matches!(err, StepError::Filesystem { action: "resolve", .. }));
        }

        let leaked = std::fs::read_dir(&storage).expect("read storage").count();
        assert_eq!(leaked, 0);
    }
}
