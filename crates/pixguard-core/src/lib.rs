//! pixguard build-time pipeline
//!
//! Ties the stages together for one project:
//!
//! 1. scan resource trees for used images ([`pixguard_scan`])
//! 2. load the compiled identifier tables ([`pixguard_symbol`])
//! 3. classify used rasters against size thresholds ([`classify`])
//! 4. emit the oversized-id artifact ([`emit`])
//! 5. rewrite call sites in compiled classes ([`pixguard_rewrite`])
//!
//! # Example
//!
//! ```rust,no_run
//! use pixguard_core::prelude::*;
//! use std::path::Path;
//!
//! let config = GuardConfig::load_or_default(Path::new("pixguard.toml"));
//! pixguard_core::logging::init(&config.logging);
//!
//! let pipeline = Pipeline::new(config, "app");
//! let report = pipeline.generate("debug")?;
//! println!("{} oversized", report.classification.oversized.len());
//! pipeline.rewrite_jar(Path::new("classes.jar"), Path::new("out/classes.jar"))?;
//! # Ok::<(), PipelineError>(())
//! ```

pub mod classify;
pub mod config;
pub mod emit;
pub mod logging;
pub mod pipeline;

pub use classify::{Classification, Classifier, Decision, ImageVerdict, Measurement, Thresholds};
pub use config::{ConfigError, GuardConfig, OutputLanguage};
pub use emit::{ConstantEmitter, EmitError, EmitOutcome};
pub use logging::LoggingConfig;
pub use pipeline::{GenerateReport, Pipeline, PipelineError, SYMBOL_ARCHIVE_DIR};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for build hosts
    pub use crate::{
        Classification, GenerateReport, GuardConfig, OutputLanguage, Pipeline, PipelineError,
        Thresholds,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
