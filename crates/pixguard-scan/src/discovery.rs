//! Locating resource directories

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Role of a child directory of `res`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    /// `drawable*` or `mipmap*`
    Image,
    /// `values*`
    Values,
    /// `layout*`
    Layout,
}

impl DirectoryKind {
    /// Classify by directory name, ignoring ASCII case
    #[must_use]
    pub fn of(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("drawable") || lower.starts_with("mipmap") {
            Some(Self::Image)
        } else if lower.starts_with("values") {
            Some(Self::Values)
        } else if lower.starts_with("layout") {
            Some(Self::Layout)
        } else {
            None
        }
    }
}

/// Resource directories grouped by role, each list sorted by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDirs {
    /// Image directories
    pub image: Vec<PathBuf>,
    /// Themed values directories
    pub values: Vec<PathBuf>,
    /// Layout directories
    pub layout: Vec<PathBuf>,
}

/// Every directory named exactly `res` below `root`, in sorted order
///
/// A found `res` directory is not searched for nested `res` directories.
pub fn find_res_dirs(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walk = WalkDir::new(root).sort_by_file_name().into_iter();
    while let Some(entry) = walk.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory");
                continue;
            }
        };
        if entry.file_type().is_dir() && entry.file_name() == "res" {
            debug!(path = %entry.path().display(), "Found resource directory");
            found.push(entry.into_path());
            walk.skip_current_dir();
        }
    }
    found
}

/// Immediate children of `dir` matching `keep`, sorted by name
pub(crate) fn children(dir: &Path, keep: impl Fn(&walkdir::DirEntry) -> bool) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| keep(entry))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Group the role directories of every `res` directory
pub fn classify_res_dirs(res_dirs: &[PathBuf]) -> ResourceDirs {
    let mut dirs = ResourceDirs::default();
    for res in res_dirs {
        for child in children(res, |e| e.file_type().is_dir()) {
            let kind = child
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(DirectoryKind::of);
            match kind {
                Some(DirectoryKind::Image) => dirs.image.push(child),
                Some(DirectoryKind::Values) => dirs.values.push(child),
                Some(DirectoryKind::Layout) => dirs.layout.push(child),
                None => {}
            }
        }
    }
    dirs.image.sort();
    dirs.values.sort();
    dirs.layout.sort();
    dirs
}

/// `*.xml` files directly inside `dir`, sorted by name
pub(crate) fn xml_files(dir: &Path) -> Vec<PathBuf> {
    children(dir, |e| {
        e.file_type().is_file()
            && e.path()
                .extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| x.eq_ignore_ascii_case("xml"))
    })
}
