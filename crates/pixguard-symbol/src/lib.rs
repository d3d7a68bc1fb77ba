//! Resource identifier tables
//!
//! Reads the compiled identifier archive (a jar of `R$<type>` classes) and
//! exposes per-type name → id maps.
//!
//! # Overview
//!
//! - **SymbolTable**: type → (name → id), with narrowing and inversion
//! - **parse_archive**: one-shot archive decoding
//! - **SymbolCache**: concurrent cache keyed by (absolute path, namespace)
//!
//! # Example
//!
//! ```rust,no_run
//! use pixguard_symbol::SymbolCache;
//! use std::path::Path;
//!
//! let table = SymbolCache::global().load(Path::new("build/R.jar"), "com.example.app");
//! for name in table.types() {
//!     println!("{name}");
//! }
//! ```

pub mod archive;
pub mod cache;
pub mod error;
pub mod table;

pub use archive::{module_prefix, module_type, parse_archive, parse_zip};
pub use cache::{CacheKey, CacheStats, SymbolCache};
pub use error::{SymbolError, SymbolResult};
pub use table::{SymbolTable, TypeTable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for identifier lookups
    pub use crate::{SymbolCache, SymbolError, SymbolTable, TypeTable};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
