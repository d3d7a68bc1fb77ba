//! On-disk resource tree fixtures

use std::path::{Path, PathBuf};

use tempfile::TempDir;

const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// Temporary project directory that is removed on drop
#[derive(Debug)]
pub struct ResourceTree {
    dir: TempDir,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `<root>/<module>/src/main/res`
    pub fn res_dir(&self, module: &str) -> PathBuf {
        self.root().join(module).join("src/main/res")
    }

    /// Write `contents` at a path relative to the root
    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Write under `<module>/src/main/res/<rel>`
    pub fn write_res(&self, module: &str, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        self.write(&format!("{module}/src/main/res/{rel}"), contents)
    }
}

/// Layout with one `ImageView` per `(attribute, value)` pair
pub fn layout_xml(attrs: &[(&str, &str)]) -> String {
    let mut out = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<LinearLayout xmlns:android=\"{ANDROID_NS}\">\n"
    );
    for (name, value) in attrs {
        out.push_str(&format!("    <ImageView android:{name}=\"{value}\" />\n"));
    }
    out.push_str("</LinearLayout>\n");
    out
}

/// Values file with one style containing the given `(item name, text)` pairs
pub fn values_xml(items: &[(&str, &str)]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n    <style name=\"AppTheme\">\n");
    for (name, text) in items {
        out.push_str(&format!("        <item name=\"{name}\">{text}</item>\n"));
    }
    out.push_str("    </style>\n</resources>\n");
    out
}

/// Declarative drawable with the given root tag
pub fn drawable_xml(root_tag: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<{root_tag} xmlns:android=\"{ANDROID_NS}\" />\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_files() {
        let tree = ResourceTree::new();
        let path = tree.write_res("app", "drawable/icon.png", b"x");
        assert!(path.starts_with(tree.res_dir("app")));
        assert_eq!(std::fs::read(path).unwrap(), b"x");
    }

    #[test]
    fn layout_uses_android_prefix() {
        let xml = layout_xml(&[("src", "@drawable/icon")]);
        assert!(xml.contains("android:src=\"@drawable/icon\""));
        assert!(xml.contains(ANDROID_NS));
    }
}
