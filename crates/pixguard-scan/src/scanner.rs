//! Full resource scan

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use pixguard_types::{ImageType, ResourceName, ResourceSubKind};
use tracing::{debug, info, warn};

use crate::discovery::{classify_res_dirs, find_res_dirs, xml_files};
use crate::error::ScanError;
use crate::references::{layout_references, values_references, ImageReference};
use crate::resolve::{locate_image_file, sub_kind_of};

/// Outcome of scanning a project's resource trees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Sub-kind of every used name whose backing file was found
    pub sub_kinds: BTreeMap<ResourceName, ResourceSubKind>,
    /// Every referenced image name, found on disk or not
    pub used: BTreeSet<ResourceName>,
    /// Tables each used name was referenced through
    pub image_types: BTreeMap<ResourceName, BTreeSet<ImageType>>,
    /// Image directories in visiting order
    pub image_dirs: Vec<PathBuf>,
}

impl ScanResult {
    /// Sub-kind of a used name, `None` when its file was never found
    #[must_use]
    pub fn sub_kind(&self, name: &ResourceName) -> Option<ResourceSubKind> {
        self.sub_kinds.get(name).copied()
    }

    /// Used names classified as raster, in name order
    pub fn raster_names(&self) -> impl Iterator<Item = &ResourceName> + '_ {
        self.sub_kinds
            .iter()
            .filter(|(_, kind)| kind.is_raster())
            .map(|(name, _)| name)
    }

    /// Tables `name` was referenced through, `drawable` before `mipmap`
    pub fn image_types_of(&self, name: &ResourceName) -> impl Iterator<Item = ImageType> + '_ {
        self.image_types.get(name).into_iter().flatten().copied()
    }

    /// Used names with no backing file
    pub fn unresolved(&self) -> impl Iterator<Item = &ResourceName> + '_ {
        self.used.iter().filter(|n| !self.sub_kinds.contains_key(*n))
    }
}

/// Scan every `res` directory below `root`
///
/// Never fails. Unreadable files and malformed XML are logged and skipped.
pub fn scan(root: &Path) -> ScanResult {
    let res_dirs = find_res_dirs(root);
    let dirs = classify_res_dirs(&res_dirs);
    debug!(
        res = res_dirs.len(),
        image = dirs.image.len(),
        values = dirs.values.len(),
        layout = dirs.layout.len(),
        "Resource directories"
    );

    let mut image_types = BTreeMap::new();
    for dir in &dirs.values {
        collect(dir, values_references, &mut image_types);
    }
    for dir in &dirs.layout {
        collect(dir, layout_references, &mut image_types);
    }
    let used: BTreeSet<ResourceName> = image_types.keys().cloned().collect();

    let mut sub_kinds = BTreeMap::new();
    for name in &used {
        let Some(file) = locate_image_file(&dirs.image, name) else {
            debug!(name = %name, "No backing file for referenced image");
            continue;
        };
        match sub_kind_of(&file) {
            Ok(kind) => {
                debug!(name = %name, kind = %kind, file = %file.display(), "Classified image");
                sub_kinds.insert(name.clone(), kind);
            }
            Err(e) => warn!(name = %name, error = %e, "Skipping unclassifiable image"),
        }
    }

    info!(
        used = used.len(),
        classified = sub_kinds.len(),
        "Resource scan complete"
    );

    ScanResult {
        sub_kinds,
        used,
        image_types,
        image_dirs: dirs.image,
    }
}

fn collect(
    dir: &Path,
    extract: fn(&str) -> Result<Vec<ImageReference>, roxmltree::Error>,
    image_types: &mut BTreeMap<ResourceName, BTreeSet<ImageType>>,
) {
    for file in xml_files(dir) {
        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %ScanError::io_error(&file, e), "Skipping unreadable descriptor");
                continue;
            }
        };
        match extract(&text) {
            Ok(refs) => {
                for r in refs {
                    debug!(
                        name = %r.name,
                        image_type = %r.image_type,
                        file = %file.display(),
                        "Found image reference"
                    );
                    image_types
                        .entry(ResourceName::new(r.name))
                        .or_default()
                        .insert(r.image_type);
                }
            }
            Err(e) => warn!(error = %ScanError::xml_error(&file, &e), "Skipping malformed descriptor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_test_utils::{drawable_xml, layout_xml, png_bytes, values_xml, ResourceTree};
    use pretty_assertions::assert_eq;

    fn names<'a>(it: impl Iterator<Item = &'a ResourceName>) -> Vec<&'a str> {
        it.map(ResourceName::as_str).collect()
    }

    #[test]
    fn scans_multi_module_tree() {
        let tree = ResourceTree::new();
        tree.write_res(
            "app",
            "layout/main.xml",
            layout_xml(&[("background", "@drawable/icon"), ("src", "@drawable/arrow")]),
        );
        tree.write_res(
            "app",
            "values/themes.xml",
            values_xml(&[("android:windowBackground", "@mipmap/splash")]),
        );
        tree.write_res("app", "drawable/icon.png", png_bytes(10, 10, 64));
        tree.write_res("app", "drawable/arrow.xml", drawable_xml("vector"));
        tree.write_res("lib", "mipmap-hdpi/splash.webp", b"RIFF");
        tree.write_res("lib", "layout/row.xml", layout_xml(&[("src", "@drawable/ghost")]));
        tree.write_res("app", "drawable/unused.png", png_bytes(10, 10, 64));

        let result = scan(tree.root());

        assert_eq!(names(result.used.iter()), vec!["arrow", "ghost", "icon", "splash"]);
        assert_eq!(names(result.raster_names()), vec!["icon", "splash"]);
        assert_eq!(result.sub_kind(&"arrow".into()), Some(ResourceSubKind::Vector));
        assert_eq!(names(result.unresolved()), vec!["ghost"]);
        assert_eq!(result.image_dirs.len(), 2);
        assert_eq!(
            result.image_types_of(&"splash".into()).collect::<Vec<_>>(),
            vec![ImageType::Mipmap]
        );
    }

    #[test]
    fn reference_tables_are_kept_per_name() {
        let tree = ResourceTree::new();
        tree.write_res(
            "app",
            "layout/main.xml",
            layout_xml(&[("src", "@mipmap/badge"), ("background", "@drawable/Badge")]),
        );
        tree.write_res("app", "layout/row.xml", layout_xml(&[("src", "@mipmap/star")]));
        let result = scan(tree.root());

        assert_eq!(
            result.image_types_of(&"badge".into()).collect::<Vec<_>>(),
            vec![ImageType::Drawable, ImageType::Mipmap]
        );
        assert_eq!(
            result.image_types_of(&"star".into()).collect::<Vec<_>>(),
            vec![ImageType::Mipmap]
        );
        assert_eq!(result.image_types_of(&"absent".into()).count(), 0);
    }

    #[test]
    fn malformed_descriptors_are_skipped() {
        let tree = ResourceTree::new();
        tree.write_res("app", "layout/broken.xml", "<LinearLayout");
        tree.write_res("app", "layout/ok.xml", layout_xml(&[("src", "@drawable/icon")]));
        tree.write_res("app", "drawable/icon.xml", "<selector");

        let result = scan(tree.root());
        assert_eq!(names(result.used.iter()), vec!["icon"]);
        assert!(result.sub_kinds.is_empty());
    }

    #[test]
    fn case_insensitive_names_collapse() {
        let tree = ResourceTree::new();
        tree.write_res(
            "app",
            "layout/a.xml",
            layout_xml(&[("src", "@drawable/Icon"), ("background", "@drawable/icon")]),
        );
        tree.write_res("app", "drawable/ICON.PNG", b"");
        let result = scan(tree.root());
        assert_eq!(result.used.len(), 1);
        assert_eq!(names(result.raster_names()), vec!["Icon"]);
    }

    #[test]
    fn empty_root() {
        let tree = ResourceTree::new();
        assert_eq!(scan(tree.root()), ScanResult::default());
        assert_eq!(scan(&tree.root().join("missing")), ScanResult::default());
    }
}
