//! Directory housekeeping around the pipeline stages.
//!
//! These helpers never fail on a single bad entry: each problem is logged and
//! the rest of the directory is still processed. Only a directory that cannot
//! be listed at all is reported as an error.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::PrepError;

/// Name of the directory [`copy_annotations`] creates under its target.
pub const ANNOTATIONS_DIR_NAME: &str = "annotations";
/// Trainer output directory cleared by [`clear_runs_directory`].
pub const RUNS_DIR_NAME: &str = "runs";

/// Empties `dir` while keeping `dir` itself.
///
/// With `extensions` set, only files with one of those extensions (without
/// the dot, case-insensitive) are deleted. Sub-folders are only removed when
/// `remove_folders` is true. A missing directory is not an error.
pub fn clear_directory(
    dir: &Path,
    extensions: Option<&[&str]>,
    remove_folders: bool,
) -> Result<(), PrepError> {
    if !dir.exists() {
        info!("Directory '{}' does not exist.", dir.display());
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Failed to read an entry of {}: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();

        if path.is_dir() {
            if !remove_folders {
                continue;
            }
            match fs::remove_dir_all(&path) {
                Ok(()) => debug!("Deleted folder: {}", path.display()),
                Err(err) => warn!("Failed to delete {}. Reason: {}", path.display(), err),
            }
        } else if matches_extension(&path, extensions) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Deleted file: {}", path.display()),
                Err(err) => warn!("Failed to delete {}. Reason: {}", path.display(), err),
            }
        }
    }

    info!("Directory '{}' cleared successfully.", dir.display());
    Ok(())
}

/// Replaces `<target_base>/annotations` with a copy of `source_dir`.
///
/// A missing `source_dir` is logged and nothing is copied.
pub fn copy_annotations(source_dir: &Path, target_base: &Path) -> Result<(), PrepError> {
    if !source_dir.is_dir() {
        warn!(
            "Source directory '{}' does not exist. Skipping copy.",
            source_dir.display()
        );
        return Ok(());
    }

    let target = target_base.join(ANNOTATIONS_DIR_NAME);
    fs::create_dir_all(target_base)?;
    if target.exists() {
        fs::remove_dir_all(&target)?;
    }

    copy_tree(source_dir, &target)?;
    info!("Annotations copied to '{}'.", target.display());
    Ok(())
}

/// Deletes every folder under `<base>/runs`, leaving plain files alone.
pub fn clear_runs_directory(base: &Path) -> Result<(), PrepError> {
    clear_folders(&base.join(RUNS_DIR_NAME))
}

/// Deletes every folder directly inside `dir`, leaving plain files alone.
pub fn clear_folders(dir: &Path) -> Result<(), PrepError> {
    if !dir.is_dir() {
        info!("'{}' does not exist. Nothing to delete.", dir.display());
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            info!("Deleting folder: {}", path.display());
            if let Err(err) = fs::remove_dir_all(&path) {
                warn!("Failed to delete {}. Reason: {}", path.display(), err);
            }
        } else {
            debug!("Skipping non-folder item: {}", path.display());
        }
    }

    Ok(())
}

/// Recursively copies `source` into `destination`, creating directories.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<(), PrepError> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|source_err| PrepError::DirectoryWalk {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = destination.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn matches_extension(path: &Path, extensions: Option<&[&str]>) -> bool {
    let Some(extensions) = extensions else {
        return true;
    };
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_directory_keeps_folders_unless_asked() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = temp.path();
        fs::write(dir.join("a.txt"), "x").expect("write a");
        fs::create_dir_all(dir.join("sub")).expect("create sub");
        fs::write(dir.join("sub/b.txt"), "x").expect("write b");

        clear_directory(dir, None, false).expect("clear");
        assert!(!dir.join("a.txt").exists());
        assert!(dir.join("sub/b.txt").exists());

        clear_directory(dir, None, true).expect("clear folders");
        assert!(!dir.join("sub").exists());
        assert!(dir.exists());
    }

    #[test]
    fn clear_directory_filters_by_extension() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = temp.path();
        fs::write(dir.join("a.txt"), "x").expect("write a");
        fs::write(dir.join("b.log"), "x").expect("write b");
        fs::write(dir.join("c.png"), "x").expect("write c");

        clear_directory(dir, Some(&[".txt", "log"][..]), false).expect("clear");
        assert!(!dir.join("a.txt").exists());
        assert!(!dir.join("b.log").exists());
        assert!(dir.join("c.png").exists());
    }

    #[test]
    fn clear_missing_directory_is_ok() {
        let temp = tempfile::tempdir().expect("create temp dir");
        clear_directory(&temp.path().join("nope"), None, true).expect("missing dir is fine");
    }

    #[test]
    fn copy_annotations_replaces_target() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("annotations_yolo");
        let data = temp.path().join("data");
        fs::create_dir_all(&source).expect("create source");
        fs::write(source.join("new.txt"), "0 0.5 0.5 0.1 0.1\n").expect("write new");
        fs::create_dir_all(data.join("annotations")).expect("create target");
        fs::write(data.join("annotations/old.txt"), "stale").expect("write old");

        copy_annotations(&source, &data).expect("copy");

        assert!(data.join("annotations/new.txt").is_file());
        assert!(!data.join("annotations/old.txt").exists());
    }

    #[test]
    fn copy_annotations_without_source_is_a_noop() {
        let temp = tempfile::tempdir().expect("create temp dir");
        copy_annotations(&temp.path().join("missing"), &temp.path().join("data"))
            .expect("noop");
        assert!(!temp.path().join("data/annotations").exists());
    }

    #[test]
    fn clear_runs_removes_only_folders() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let runs = temp.path().join("runs");
        fs::create_dir_all(runs.join("detect/train")).expect("create run");
        fs::write(runs.join("notes.md"), "keep").expect("write file");

        clear_runs_directory(temp.path()).expect("clear runs");

        assert!(!runs.join("detect").exists());
        assert!(runs.join("notes.md").is_file());
    }
}
