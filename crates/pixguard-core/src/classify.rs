//! Size classification of used raster images
//!
//! Only names that are used, backed by a raster file, and resolvable in
//! the identifier table they were referenced through can become oversized.
//! Everything else is skipped without error.

use std::path::{Path, PathBuf};

use pixguard_scan::{locate_image_file, ScanResult};
use pixguard_symbol::SymbolTable;
use pixguard_types::{ImageType, OversizedSet, ResourceId, ResourceName};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::GuardConfig;

/// Size budget for raster images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Maximum width in pixels
    pub max_width: u32,
    /// Maximum height in pixels
    pub max_height: u32,
    /// Maximum file length in bytes
    pub max_file_size: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 400,
            max_file_size: 100 * 1024,
        }
    }
}

impl Thresholds {
    /// Whether a measurement is over budget
    ///
    /// Values equal to a limit are within budget. Without decodable
    /// dimensions only the file length counts.
    #[must_use]
    pub fn exceeded_by(&self, measurement: &Measurement) -> bool {
        let too_large = measurement.file_size > self.max_file_size;
        match measurement.dimensions {
            Some((width, height)) => {
                too_large
                    || width > u64::from(self.max_width)
                    || height > u64::from(self.max_height)
            }
            None => too_large,
        }
    }
}

/// What was read from a backing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Pixel dimensions, when the header decoded
    pub dimensions: Option<(u64, u64)>,
    /// File length in bytes
    pub file_size: u64,
}

impl Measurement {
    /// Measure a file from its header and length
    ///
    /// # Errors
    ///
    /// Fails only when the file's metadata cannot be read. An undecodable
    /// header yields a measurement without dimensions.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let file_size = std::fs::metadata(path)?.len();
        let dimensions = match imagesize::size(path) {
            Ok(size) => Some((to_u64(size.width), to_u64(size.height))),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Image header not decodable");
                None
            }
        };
        Ok(Self {
            dimensions,
            file_size,
        })
    }
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Why a raster image was or wasn't flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Flagged by the unconditional override
    Override,
    /// Measured over budget
    Oversized,
    /// Measured within budget
    WithinBudget,
}

impl Decision {
    /// Whether the id joins the oversized set
    #[inline]
    #[must_use]
    pub const fn is_oversized(self) -> bool {
        !matches!(self, Self::WithinBudget)
    }
}

/// Verdict for one used raster image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVerdict {
    /// Resource name
    pub name: ResourceName,
    /// Table the id was resolved in
    pub image_type: ImageType,
    /// Resolved id
    pub id: ResourceId,
    /// Backing file, when measured
    pub file: Option<PathBuf>,
    /// Measurement, when measured
    pub measurement: Option<Measurement>,
    /// Outcome
    pub decision: Decision,
}

/// Result of classifying one build variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Ids routed to the pluggable loader
    pub oversized: OversizedSet,
    /// Per-image verdicts in name order, then table order
    pub verdicts: Vec<ImageVerdict>,
}

#[derive(Clone, Copy)]
struct Candidate<'a> {
    name: &'a ResourceName,
    image_type: ImageType,
    id: ResourceId,
}

/// Decides which used raster ids are oversized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    thresholds: Thresholds,
    all_raster: bool,
}

impl Classifier {
    /// Create a classifier
    #[inline]
    #[must_use]
    pub fn new(thresholds: Thresholds, all_raster: bool) -> Self {
        Self {
            thresholds,
            all_raster,
        }
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.thresholds(), config.all_raster_uses_pluggable_loader)
    }

    /// Active thresholds
    #[inline]
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Classify every used raster name that resolves to an image id
    ///
    /// A name referenced as `@mipmap/` resolves only in the `mipmap` table,
    /// and likewise for `@drawable/`. Never fails; names without an id or
    /// whose file vanished are skipped.
    #[must_use]
    pub fn classify(&self, scan: &ScanResult, symbols: &SymbolTable) -> Classification {
        let candidates: Vec<Candidate<'_>> = scan
            .raster_names()
            .flat_map(|name| {
                scan.image_types_of(name)
                    .map(move |image_type| (name, image_type))
            })
            .filter_map(|(name, image_type)| match symbols.resolve_image(image_type, name) {
                Some(id) => Some(Candidate {
                    name,
                    image_type,
                    id,
                }),
                None => {
                    debug!(%name, %image_type, "Used raster has no image id");
                    None
                }
            })
            .collect();

        let verdicts: Vec<ImageVerdict> = candidates
            .par_iter()
            .filter_map(|candidate| self.judge(scan, candidate))
            .collect();

        let oversized = verdicts
            .iter()
            .filter(|v| v.decision.is_oversized())
            .map(|v| v.id)
            .collect::<OversizedSet>();

        info!(
            candidates = candidates.len(),
            oversized = oversized.len(),
            override_all = self.all_raster,
            "Classified raster images"
        );
        Classification {
            oversized,
            verdicts,
        }
    }

    fn judge(&self, scan: &ScanResult, candidate: &Candidate<'_>) -> Option<ImageVerdict> {
        let Candidate {
            name,
            image_type,
            id,
        } = *candidate;
        if self.all_raster {
            return Some(ImageVerdict {
                name: name.clone(),
                image_type,
                id,
                file: None,
                measurement: None,
                decision: Decision::Override,
            });
        }

        let Some(file) = locate_image_file(&scan.image_dirs, name) else {
            warn!(%name, "Backing file vanished, skipping");
            return None;
        };
        let measurement = match Measurement::of(&file) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Cannot measure image, skipping");
                return None;
            }
        };
        let decision = if self.thresholds.exceeded_by(&measurement) {
            Decision::Oversized
        } else {
            Decision::WithinBudget
        };
        debug!(
            %name,
            %id,
            width = measurement.dimensions.map(|d| d.0),
            height = measurement.dimensions.map(|d| d.1),
            bytes = measurement.file_size,
            ?decision,
            "Measured image"
        );
        Some(ImageVerdict {
            name: name.clone(),
            image_type,
            id,
            file: Some(file),
            measurement: Some(measurement),
            decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_scan::scan;
    use pixguard_test_utils::{drawable_xml, garbage_bytes, layout_xml, png_bytes, ResourceTree};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const LIMITS: Thresholds = Thresholds {
        max_width: 400,
        max_height: 400,
        max_file_size: 100 * 1024,
    };

    fn measured(width: u64, height: u64, file_size: u64) -> Measurement {
        Measurement {
            dimensions: Some((width, height)),
            file_size,
        }
    }

    #[test]
    fn limits_are_inclusive() {
        assert!(!LIMITS.exceeded_by(&measured(400, 400, 102_400)));
        assert!(LIMITS.exceeded_by(&measured(401, 400, 0)));
        assert!(LIMITS.exceeded_by(&measured(400, 401, 0)));
        assert!(LIMITS.exceeded_by(&measured(1, 1, 102_401)));
    }

    #[test]
    fn undecodable_uses_length_only() {
        let small = Measurement {
            dimensions: None,
            file_size: 10,
        };
        let large = Measurement {
            dimensions: None,
            file_size: 200_000,
        };
        assert!(!LIMITS.exceeded_by(&small));
        assert!(LIMITS.exceeded_by(&large));
    }

    proptest! {
        #[test]
        fn width_boundary(width in 0u64..2_000, max in 1u32..1_500) {
            let limits = Thresholds { max_width: max, ..LIMITS };
            prop_assert_eq!(
                limits.exceeded_by(&measured(width, 1, 0)),
                width > u64::from(max)
            );
        }

        #[test]
        fn size_boundary(size in 0u64..300_000) {
            prop_assert_eq!(
                LIMITS.exceeded_by(&measured(1, 1, size)),
                size > LIMITS.max_file_size
            );
        }
    }

    fn fixture() -> (ResourceTree, ScanResult, SymbolTable) {
        let tree = ResourceTree::new();
        tree.write_res(
            "app",
            "layout/main.xml",
            layout_xml(&[
                ("background", "@drawable/icon"),
                ("src", "@drawable/logo"),
                ("src", "@drawable/blob"),
                ("src", "@drawable/shape"),
                ("src", "@drawable/unmapped"),
            ]),
        );
        tree.write_res("app", "drawable/icon.png", png_bytes(500, 500, 50 * 1024));
        tree.write_res("app", "drawable/logo.png", png_bytes(300, 300, 50 * 1024));
        tree.write_res("app", "drawable/blob.webp", garbage_bytes(200 * 1024));
        tree.write_res("app", "drawable/shape.xml", drawable_xml("shape"));
        tree.write_res("app", "drawable/unmapped.png", png_bytes(900, 900, 10));

        let result = scan(tree.root());
        let mut symbols = SymbolTable::new();
        symbols.insert("drawable", "icon", ResourceId::new(0x7f08_0001));
        symbols.insert("drawable", "logo", ResourceId::new(0x7f08_0002));
        symbols.insert("drawable", "blob", ResourceId::new(0x7f08_0003));
        symbols.insert("drawable", "shape", ResourceId::new(0x7f08_0004));
        (tree, result, symbols)
    }

    #[test]
    fn measures_against_thresholds() {
        let (_tree, result, symbols) = fixture();
        let classification = Classifier::new(LIMITS, false).classify(&result, &symbols);

        let decisions: Vec<(&str, Decision)> = classification
            .verdicts
            .iter()
            .map(|v| (v.name.as_str(), v.decision))
            .collect();
        assert_eq!(
            decisions,
            vec![
                ("blob", Decision::Oversized),
                ("icon", Decision::Oversized),
                ("logo", Decision::WithinBudget),
            ]
        );
        assert_eq!(
            classification.oversized,
            OversizedSet::from_raw(&[0x7f08_0001, 0x7f08_0003])
        );
        let blob = &classification.verdicts[0];
        assert_eq!(blob.measurement.unwrap().dimensions, None);
    }

    #[test]
    fn override_flags_every_resolved_raster() {
        let (_tree, result, symbols) = fixture();
        let classification = Classifier::new(LIMITS, true).classify(&result, &symbols);
        assert_eq!(
            classification.oversized,
            OversizedSet::from_raw(&[0x7f08_0001, 0x7f08_0002, 0x7f08_0003])
        );
        assert!(classification
            .verdicts
            .iter()
            .all(|v| v.decision == Decision::Override && v.measurement.is_none()));
    }

    #[test]
    fn references_resolve_in_their_own_table() {
        let tree = ResourceTree::new();
        tree.write_res("app", "layout/main.xml", layout_xml(&[("src", "@mipmap/badge")]));
        tree.write_res("app", "mipmap-xxhdpi/badge.png", png_bytes(800, 800, 10));
        let result = scan(tree.root());

        let mut symbols = SymbolTable::new();
        symbols.insert("drawable", "badge", ResourceId::new(0x7f08_0042));
        symbols.insert("mipmap", "badge", ResourceId::new(0x7f0d_0042));

        let classification = Classifier::new(LIMITS, false).classify(&result, &symbols);
        assert_eq!(
            classification.oversized,
            OversizedSet::from_raw(&[0x7f0d_0042])
        );
        assert_eq!(classification.verdicts.len(), 1);
        assert_eq!(classification.verdicts[0].image_type, ImageType::Mipmap);

        let mut drawable_only = SymbolTable::new();
        drawable_only.insert("drawable", "badge", ResourceId::new(0x7f08_0042));
        let classification = Classifier::new(LIMITS, true).classify(&result, &drawable_only);
        assert!(classification.oversized.is_empty());
    }

    #[test]
    fn empty_symbols_flag_nothing() {
        let (_tree, result, _) = fixture();
        let classification = Classifier::new(LIMITS, true).classify(&result, &SymbolTable::new());
        assert!(classification.oversized.is_empty());
        assert!(classification.verdicts.is_empty());
    }
}
