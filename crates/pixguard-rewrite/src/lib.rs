//! Call-site rewriting for compiled classes
//!
//! Redirects image and background assignments in application code to a
//! static dispatcher, leaving every other byte of each class unchanged.
//!
//! # Overview
//!
//! - **CallRule / RuleSet**: which virtual calls map to which static methods
//! - **Eligibility**: namespace filter (application in, runtime out)
//! - **ClassRewriter**: per-class rewriting plus directory and jar drivers
//!
//! # Example
//!
//! ```rust,no_run
//! use pixguard_rewrite::ClassRewriter;
//! use std::path::Path;
//!
//! let rewriter = ClassRewriter::with_defaults("com.example.app", "io.pixguard.runtime", "PixGuard");
//! let report = rewriter.rewrite_jar(Path::new("classes.jar"), Path::new("out/classes.jar"))?;
//! println!("{} call sites", report.call_sites);
//! # Ok::<(), pixguard_rewrite::RewriteError>(())
//! ```

pub mod batch;
pub mod eligibility;
pub mod error;
pub mod rewriter;
pub mod rule;

pub use batch::BatchReport;
pub use eligibility::Eligibility;
pub use error::{RewriteError, RewriteResult};
pub use rewriter::{ClassRewriter, RewriteOutcome};
pub use rule::{CallRule, MethodPattern, MethodTarget, RuleSet};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for rewriting
    pub use crate::{BatchReport, CallRule, ClassRewriter, Eligibility, RewriteError, RuleSet};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
