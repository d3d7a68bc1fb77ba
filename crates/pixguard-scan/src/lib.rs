//! Resource descriptor scanning
//!
//! Walks resource trees to find which images are actually referenced from
//! layouts and themed values, then classifies each referenced name by the
//! file that backs it.
//!
//! # Overview
//!
//! - **discovery**: `res` directories and their role subdirectories
//! - **references**: `@drawable/` and `@mipmap/` references in XML
//! - **resolve**: backing-file lookup and sub-kind classification
//! - **scan**: the whole pass, producing a [`ScanResult`]
//!
//! # Example
//!
//! ```rust,no_run
//! use pixguard_scan::scan;
//! use std::path::Path;
//!
//! let result = scan(Path::new("app/src"));
//! for name in result.raster_names() {
//!     println!("{name}");
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod references;
pub mod resolve;
pub mod scanner;

pub use discovery::{classify_res_dirs, find_res_dirs, DirectoryKind, ResourceDirs};
pub use error::{ScanError, ScanResultOf};
pub use references::{
    image_reference, layout_references, values_references, ImageReference, ANDROID_NS,
};
pub use resolve::{file_matches, is_raster_path, locate_image_file, sub_kind_of};
pub use scanner::{scan, ScanResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scanning
    pub use crate::{locate_image_file, scan, ScanError, ScanResult};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
