//! Per-variant build hooks
//!
//! [`Pipeline::generate`] runs after resource linking and before
//! compilation: scan, load identifiers, classify, emit. The rewrite hooks
//! run during code transformation. Missing inputs degrade to an empty
//! oversized set; the artifact is still written and rewriting still runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pixguard_rewrite::{BatchReport, ClassRewriter, RewriteError};
use pixguard_scan::{scan, ScanResult};
use pixguard_symbol::{SymbolCache, SymbolTable};
use tracing::{info, info_span};

use crate::classify::{Classification, Classifier};
use crate::config::{ConfigError, GuardConfig};
use crate::emit::{ConstantEmitter, EmitError, EmitOutcome};

/// Directory of the compiled identifier archive, relative to the build dir
pub const SYMBOL_ARCHIVE_DIR: &str = "intermediates/compile_and_runtime_not_namespaced_r_class_jar";

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Artifact could not be written
    #[error("emit failed: {0}")]
    Emit(#[from] EmitError),

    /// Rewriting failed
    #[error("rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),

    /// Variant name unusable as a path segment
    #[error("invalid variant name: {0:?}")]
    InvalidVariant(String),
}

/// Outcome of [`Pipeline::generate`]
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// Variant name
    pub variant: String,
    /// Scan result
    pub scan: ScanResult,
    /// Identifier tables used
    pub symbols: Arc<SymbolTable>,
    /// Classification
    pub classification: Classification,
    /// Artifact on disk
    pub artifact: EmitOutcome,
}

/// Image guard for one project
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: GuardConfig,
    project_dir: PathBuf,
    build_dir: PathBuf,
    archives: HashMap<String, PathBuf>,
    cache: Option<Arc<SymbolCache>>,
}

impl Pipeline {
    /// Pipeline for `project_dir` with build output in `<project_dir>/build`
    #[must_use]
    pub fn new(config: GuardConfig, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let build_dir = project_dir.join("build");
        Self {
            config,
            project_dir,
            build_dir,
            archives: HashMap::new(),
            cache: None,
        }
    }

    /// With build output directory
    #[must_use]
    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    /// With an explicit identifier archive for `variant`
    #[must_use]
    pub fn with_archive(mut self, variant: &str, archive: impl Into<PathBuf>) -> Self {
        self.archives.insert(variant.to_owned(), archive.into());
        self
    }

    /// With a private identifier cache instead of the process-wide one
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SymbolCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Root scanned for resource trees
    #[must_use]
    pub fn resource_root(&self) -> PathBuf {
        self.project_dir.join("src")
    }

    /// Identifier archive for `variant`, explicit or conventional
    #[must_use]
    pub fn archive_path(&self, variant: &str) -> PathBuf {
        if let Some(path) = self.archives.get(variant) {
            return path.clone();
        }
        self.build_dir
            .join(SYMBOL_ARCHIVE_DIR)
            .join(variant)
            .join(format!("process{}Resources", capitalize(variant)))
            .join("R.jar")
    }

    /// Path of the generated artifact for `variant`
    #[must_use]
    pub fn artifact_path(&self, variant: &str) -> PathBuf {
        ConstantEmitter::from_config(&self.config).artifact_path(&self.build_dir, variant)
    }

    fn cache(&self) -> &SymbolCache {
        match &self.cache {
            Some(cache) => cache,
            None => SymbolCache::global(),
        }
    }

    /// Classify `variant` and write its artifact
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or variant name, or when the artifact
    /// cannot be written. Missing resources or identifiers are not errors.
    pub fn generate(&self, variant: &str) -> Result<GenerateReport, PipelineError> {
        validate_variant(variant)?;
        self.config.validate()?;
        let _span = info_span!("generate", variant).entered();

        let scan = scan(&self.resource_root());
        let archive = self.archive_path(variant);
        let symbols = self.cache().load(&archive, &self.config.namespace);
        if symbols.is_empty() {
            info!(archive = %archive.display(), "No identifiers available; nothing will be flagged");
        }

        let classification = Classifier::from_config(&self.config).classify(&scan, &symbols);
        let artifact = ConstantEmitter::from_config(&self.config).emit(
            &classification.oversized,
            &self.build_dir,
            variant,
        )?;

        info!(
            used = scan.used.len(),
            resolved = scan.sub_kinds.len(),
            oversized = classification.oversized.len(),
            written = artifact.was_written(),
            "Generated oversized-id artifact"
        );
        Ok(GenerateReport {
            variant: variant.to_owned(),
            scan,
            symbols,
            classification,
            artifact,
        })
    }

    /// Call-site rewriter for the configured namespaces
    #[must_use]
    pub fn rewriter(&self) -> ClassRewriter {
        ClassRewriter::with_defaults(
            self.config.instrumented_namespace(),
            &self.config.runtime_namespace,
            &self.config.dispatcher_class,
        )
    }

    /// Rewrite a directory of compiled classes
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, traversal or IO errors.
    pub fn rewrite_directory(&self, input: &Path, output: &Path) -> Result<BatchReport, PipelineError> {
        self.config.validate()?;
        Ok(self.rewriter().rewrite_directory(input, output)?)
    }

    /// Rewrite a jar of compiled classes
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or when either jar cannot be read or
    /// written.
    pub fn rewrite_jar(&self, input: &Path, output: &Path) -> Result<BatchReport, PipelineError> {
        self.config.validate()?;
        Ok(self.rewriter().rewrite_jar(input, output)?)
    }
}

fn validate_variant(variant: &str) -> Result<(), PipelineError> {
    let ok = !variant.is_empty()
        && variant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(PipelineError::InvalidVariant(variant.to_owned()))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn conventional_archive_path() {
        let pipeline = Pipeline::new(GuardConfig::default(), "/p");
        assert_eq!(
            pipeline.archive_path("freeDebug"),
            PathBuf::from(
                "/p/build/intermediates/compile_and_runtime_not_namespaced_r_class_jar/freeDebug/processFreeDebugResources/R.jar"
            )
        );
        let pipeline = pipeline.with_archive("freeDebug", "/elsewhere/R.jar");
        assert_eq!(pipeline.archive_path("freeDebug"), PathBuf::from("/elsewhere/R.jar"));
        assert_eq!(pipeline.resource_root(), PathBuf::from("/p/src"));
    }

    #[test]
    fn rejects_path_like_variants() {
        let pipeline = Pipeline::new(GuardConfig::default(), "/p");
        for bad in ["", "../debug", "a/b"] {
            assert!(matches!(
                pipeline.generate(bad),
                Err(PipelineError::InvalidVariant(_))
            ));
        }
    }

    #[test]
    fn missing_namespace_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(GuardConfig::default(), dir.path());

        assert!(matches!(
            pipeline.generate("debug"),
            Err(PipelineError::Config(ConfigError::Invalid { field: "namespace", .. }))
        ));
        assert!(!pipeline.artifact_path("debug").exists());

        let jar = dir.path().join("classes.jar");
        assert!(matches!(
            pipeline.rewrite_jar(&jar, &dir.path().join("out.jar")),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            pipeline.rewrite_directory(dir.path(), dir.path()),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn rewriter_follows_config() {
        let mut config = GuardConfig::default().with_namespace("com.example.app");
        config.dispatcher_class = "Guard".into();
        let rewriter = Pipeline::new(config, "/p").rewriter();
        assert_eq!(rewriter.eligibility().app_namespace(), "com.example.app");
        assert_eq!(
            rewriter.rules().rules()[0].replacement.owner(),
            "io/pixguard/runtime/Guard"
        );
    }
}
