//! Finding the backing file of a resource name and its sub-kind

use std::path::{Path, PathBuf};

use pixguard_types::{ResourceName, ResourceSubKind};

use crate::discovery::children;
use crate::error::{ScanError, ScanResultOf};
use crate::references::root_tag;

/// Raster file extensions, lowercase
pub const RASTER_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

const NINE_PATCH_SUFFIX: &str = ".9.png";

/// Whether `file_name` is a candidate backing file for `name`
///
/// Matches `<name>.<png|jpg|jpeg|webp|xml>` and `<name>.9.png`, ignoring
/// ASCII case.
#[must_use]
pub fn file_matches(file_name: &str, name: &ResourceName) -> bool {
    let lower = file_name.to_ascii_lowercase();
    if let Some(stem) = lower.strip_suffix(NINE_PATCH_SUFFIX) {
        if stem == name.key() {
            return true;
        }
    }
    match lower.rsplit_once('.') {
        Some((stem, ext)) => {
            stem == name.key() && (ext == "xml" || RASTER_EXTENSIONS.contains(&ext))
        }
        None => false,
    }
}

/// First file backing `name`
///
/// `image_dirs` are visited in the given order and files within a
/// directory in sorted name order. The first directory holding a match
/// wins.
#[must_use]
pub fn locate_image_file(image_dirs: &[PathBuf], name: &ResourceName) -> Option<PathBuf> {
    image_dirs.iter().find_map(|dir| {
        children(dir, |e| {
            e.file_type().is_file() && e.file_name().to_str().is_some_and(|f| file_matches(f, name))
        })
        .into_iter()
        .next()
    })
}

/// Whether a path names a raster file (including nine-patch)
#[must_use]
pub fn is_raster_path(path: &Path) -> bool {
    path.extension()
        .and_then(|x| x.to_str())
        .is_some_and(|x| RASTER_EXTENSIONS.contains(&x.to_ascii_lowercase().as_str()))
}

/// Sub-kind of a located backing file
///
/// # Errors
///
/// Fails when an XML descriptor cannot be read or is not well formed.
pub fn sub_kind_of(path: &Path) -> ScanResultOf<ResourceSubKind> {
    if is_raster_path(path) {
        return Ok(ResourceSubKind::Raster);
    }
    let text = std::fs::read_to_string(path).map_err(|e| ScanError::io_error(path, e))?;
    let tag = root_tag(&text).map_err(|e| ScanError::xml_error(path, &e))?;
    Ok(ResourceSubKind::from_root_tag(&tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_test_utils::{drawable_xml, ResourceTree};
    use pretty_assertions::assert_eq;

    #[test]
    fn matching_rules() {
        let icon = ResourceName::new("icon");
        assert!(file_matches("icon.png", &icon));
        assert!(file_matches("ICON.WebP", &icon));
        assert!(file_matches("icon.9.png", &icon));
        assert!(file_matches("icon.xml", &icon));
        assert!(!file_matches("icon.gif", &icon));
        assert!(!file_matches("icon_large.png", &icon));
        assert!(!file_matches("icon", &icon));
        assert!(!file_matches("my.icon.png", &icon));
    }

    #[test]
    fn first_directory_with_match_wins() {
        let tree = ResourceTree::new();
        let a = tree.root().join("res/drawable");
        let b = tree.root().join("res/drawable-xhdpi");
        tree.write("res/drawable/other.png", b"");
        tree.write("res/drawable-xhdpi/icon.png", b"");
        tree.write("res/mipmap/icon.xml", b"");

        let dirs = vec![a, b.clone(), tree.root().join("res/mipmap")];
        assert_eq!(
            locate_image_file(&dirs, &ResourceName::new("Icon")),
            Some(b.join("icon.png"))
        );
        assert_eq!(locate_image_file(&dirs, &ResourceName::new("missing")), None);
    }

    #[test]
    fn sub_kinds_from_files() {
        let tree = ResourceTree::new();
        let png = tree.write("d/photo.9.png", b"");
        let vector = tree.write("d/arrow.xml", drawable_xml("animated-vector"));
        let shape = tree.write("d/bg.xml", drawable_xml("ripple"));
        let color = tree.write("d/tint.xml", drawable_xml("color"));
        let other = tree.write("d/inset.xml", drawable_xml("inset"));
        let broken = tree.write("d/broken.xml", "<shape");

        assert_eq!(sub_kind_of(&png).unwrap(), ResourceSubKind::Raster);
        assert_eq!(sub_kind_of(&vector).unwrap(), ResourceSubKind::Vector);
        assert_eq!(sub_kind_of(&shape).unwrap(), ResourceSubKind::Shape);
        assert_eq!(sub_kind_of(&color).unwrap(), ResourceSubKind::Color);
        assert_eq!(sub_kind_of(&other).unwrap(), ResourceSubKind::OtherDeclarative);
        assert!(matches!(sub_kind_of(&broken), Err(ScanError::Xml { .. })));
    }
}
