//! Extracting image references from values and layout descriptors

use pixguard_types::ImageType;
use roxmltree::Document;

/// Android attribute namespace
pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

const IMAGE_ATTRIBUTES: [&str; 2] = ["background", "src"];

/// One `@drawable/` or `@mipmap/` reference found in a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Table the reference points at
    pub image_type: ImageType,
    /// Referenced name as written
    pub name: String,
}

/// Parse an `@drawable/` or `@mipmap/` reference (prefix matched ignoring
/// ASCII case)
#[must_use]
pub fn image_reference(value: &str) -> Option<ImageReference> {
    ImageType::parse_reference(value).map(|(image_type, name)| ImageReference {
        image_type,
        name: name.to_owned(),
    })
}

/// Image references made by `<item>` elements of a values file
///
/// Only items whose `name` attribute mentions `background` or `src`
/// (ignoring case) are considered; their trimmed text is the reference.
///
/// # Errors
///
/// Returns the parser error for malformed XML.
pub fn values_references(text: &str) -> Result<Vec<ImageReference>, roxmltree::Error> {
    let doc = Document::parse(text)?;
    let refs = doc
        .descendants()
        .filter(|n| n.has_tag_name("item"))
        .filter(|n| {
            n.attribute("name").is_some_and(|name| {
                let lower = name.to_ascii_lowercase();
                IMAGE_ATTRIBUTES.iter().any(|a| lower.contains(a))
            })
        })
        .filter_map(|n| {
            let text: String = n
                .descendants()
                .filter(roxmltree::Node::is_text)
                .filter_map(|t| t.text())
                .collect();
            image_reference(&text)
        })
        .collect();
    Ok(refs)
}

/// Image references made by `android:background` / `android:src`
/// attributes anywhere in a layout file
///
/// # Errors
///
/// Returns the parser error for malformed XML.
pub fn layout_references(text: &str) -> Result<Vec<ImageReference>, roxmltree::Error> {
    let doc = Document::parse(text)?;
    let refs = doc
        .descendants()
        .filter(roxmltree::Node::is_element)
        .flat_map(|n| n.attributes())
        .filter(|a| a.namespace() == Some(ANDROID_NS) && IMAGE_ATTRIBUTES.contains(&a.name()))
        .filter_map(|a| image_reference(a.value()))
        .collect();
    Ok(refs)
}

/// Root element name of an XML descriptor
///
/// # Errors
///
/// Returns the parser error for malformed XML.
pub fn root_tag(text: &str) -> Result<String, roxmltree::Error> {
    let doc = Document::parse(text)?;
    Ok(doc.root_element().tag_name().name().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_test_utils::{layout_xml, values_xml};
    use pretty_assertions::assert_eq;

    fn described(refs: Vec<ImageReference>) -> Vec<String> {
        refs.into_iter()
            .map(|r| format!("{}/{}", r.image_type, r.name))
            .collect()
    }

    #[test]
    fn reference_prefixes() {
        assert_eq!(
            image_reference("  @Mipmap/launcher \n"),
            Some(ImageReference {
                image_type: ImageType::Mipmap,
                name: "launcher".into(),
            })
        );
        assert_eq!(image_reference("@color/primary"), None);
    }

    #[test]
    fn values_items_by_name() {
        let xml = values_xml(&[
            ("android:windowBackground", "@drawable/splash"),
            ("buttonSrc", "\n  @mipmap/button  \n"),
            ("colorPrimary", "@drawable/ignored"),
            ("android:background", "#ff0000"),
        ]);
        assert_eq!(
            described(values_references(&xml).unwrap()),
            vec!["drawable/splash", "mipmap/button"]
        );
    }

    #[test]
    fn layout_attributes_by_namespace() {
        let mut xml = layout_xml(&[
            ("background", "@drawable/icon"),
            ("src", "@mipmap/logo"),
            ("contentDescription", "@drawable/not_an_image_attr"),
        ]);
        // Same local name outside the android namespace
        xml = xml.replace(
            "</LinearLayout>",
            "<View xmlns:app=\"http://schemas.android.com/apk/res-auto\" app:src=\"@drawable/custom\" background=\"@drawable/bare\" /></LinearLayout>",
        );
        assert_eq!(
            described(layout_references(&xml).unwrap()),
            vec!["drawable/icon", "mipmap/logo"]
        );
    }

    #[test]
    fn root_tags_and_errors() {
        assert_eq!(root_tag("<vector xmlns:android=\"x\"/>").unwrap(), "vector");
        assert!(root_tag("<shape>").is_err());
        assert!(layout_references("not xml").is_err());
    }
}
