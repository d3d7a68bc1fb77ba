//! pixguard shared vocabulary
//!
//! Types every stage of the image-guard pipeline agrees on.
//!
//! # Core Concepts
//!
//! - [`ResourceName`]: case-insensitive symbolic name of a declared resource
//! - [`ResourceId`]: 32-bit numeric id baked into compiled output
//! - [`ResourceSubKind`]: what a drawable-like resource actually is on disk
//! - [`ImageType`]: which identifier table an image reference names
//! - [`OversizedSet`]: frozen set of ids routed through the pluggable loader
//!
//! # Example
//!
//! ```rust
//! use pixguard_types::{OversizedSet, ResourceId, ResourceName};
//!
//! let set: OversizedSet = [ResourceId::new(0x7f08_0001)].into_iter().collect();
//! assert!(set.contains(ResourceId::new(0x7f08_0001)));
//! assert_eq!(ResourceName::new("Icon"), ResourceName::new("icon"));
//! ```

mod id;
mod kind;
mod name;

pub use id::{OversizedSet, ResourceId};
pub use kind::{ImageType, ResourceSubKind, SubKindParseError};
pub use name::ResourceName;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
