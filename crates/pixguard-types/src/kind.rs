//! Resource sub-kind classification

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// What a referenced drawable-like resource resolves to on disk
///
/// Assigned once per used name by the descriptor scanner. Only
/// [`ResourceSubKind::Raster`] resources are candidates for the pluggable loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceSubKind {
    /// Bitmap file (png, jpg, jpeg, webp, nine-patch)
    Raster,
    /// `<vector>` or `<animated-vector>` document
    Vector,
    /// `<selector>`, `<shape>`, `<layer-list>` or `<ripple>` document
    Shape,
    /// `<color>` document
    Color,
    /// Any other well-formed XML document
    OtherDeclarative,
}

impl ResourceSubKind {
    /// Classify an XML descriptor by its root element name
    #[must_use]
    pub fn from_root_tag(tag: &str) -> Self {
        match tag {
            "selector" | "shape" | "layer-list" | "ripple" => Self::Shape,
            "vector" | "animated-vector" => Self::Vector,
            "color" => Self::Color,
            _ => Self::OtherDeclarative,
        }
    }

    /// Stable lowercase label used in logs
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
            Self::Shape => "shape",
            Self::Color => "color",
            Self::OtherDeclarative => "other",
        }
    }

    /// Whether this kind is a decoded bitmap
    #[inline]
    #[must_use]
    pub const fn is_raster(self) -> bool {
        matches!(self, Self::Raster)
    }
}

impl Display for ResourceSubKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown sub-kind label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource sub-kind: '{0}'")]
pub struct SubKindParseError(pub String);

impl FromStr for ResourceSubKind {
    type Err = SubKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raster" => Ok(Self::Raster),
            "vector" => Ok(Self::Vector),
            "shape" => Ok(Self::Shape),
            "color" => Ok(Self::Color),
            "other" => Ok(Self::OtherDeclarative),
            other => Err(SubKindParseError(other.to_string())),
        }
    }
}

/// Resource type an image reference names (`@drawable/` or `@mipmap/`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageType {
    /// `drawable` table
    Drawable,
    /// `mipmap` table
    Mipmap,
}

impl ImageType {
    /// Every image-bearing type, in lookup order
    pub const ALL: [Self; 2] = [Self::Drawable, Self::Mipmap];

    /// Resource type name as it appears in identifier modules
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drawable => "drawable",
            Self::Mipmap => "mipmap",
        }
    }

    /// Split `@drawable/<name>` or `@mipmap/<name>` into type and name
    ///
    /// The prefix is matched ignoring ASCII case; surrounding whitespace is
    /// trimmed and an empty name is rejected.
    #[must_use]
    pub fn parse_reference(value: &str) -> Option<(Self, &str)> {
        let rest = value.trim().strip_prefix('@')?;
        let (head, name) = rest.split_once('/')?;
        let image_type = Self::ALL
            .into_iter()
            .find(|t| head.eq_ignore_ascii_case(t.as_str()))?;
        (!name.is_empty()).then_some((image_type, name))
    }
}

impl Display for ImageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
