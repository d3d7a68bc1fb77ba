//! Generated constant artifact
//!
//! The oversized set is frozen into a small source file that the host
//! compiles alongside its own code. Ids are written in ascending order, so
//! equal sets render to identical bytes.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use pixguard_types::OversizedSet;
use tracing::{debug, info};

use crate::config::{GuardConfig, OutputLanguage};

/// Emission errors
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Artifact could not be read or written
    #[error("cannot write artifact {path}: {source}")]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// What happened to the artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Content changed and was written
    Written(PathBuf),
    /// Existing file already had this content
    Unchanged(PathBuf),
}

impl EmitOutcome {
    /// Artifact path
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::Unchanged(path) => path,
        }
    }

    /// Whether the file was (re)written
    #[must_use]
    pub fn was_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Renders and writes the oversized-id artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantEmitter {
    package: String,
    name: String,
    language: OutputLanguage,
}

impl ConstantEmitter {
    /// Create an emitter
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>, language: OutputLanguage) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            language,
        }
    }

    /// Create from configuration
    #[must_use]
    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(
            config.generated_package.clone(),
            config.generated_constant_name.clone(),
            config.generated_language,
        )
    }

    /// `<build_dir>/generated/pixguard/<variant>/<package path>/<Name>.<ext>`
    #[must_use]
    pub fn artifact_path(&self, build_dir: &Path, variant: &str) -> PathBuf {
        let mut path = build_dir.join("generated").join("pixguard").join(variant);
        for segment in self.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.{}", self.name, self.language.extension()));
        path
    }

    /// Render the artifact source
    #[must_use]
    pub fn render(&self, set: &OversizedSet) -> String {
        Artifact { emitter: self, set }.to_string()
    }

    fn write_kotlin(&self, set: &OversizedSet, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "// Generated by pixguard. Do not edit.")?;
        writeln!(f, "package {}", self.package)?;
        writeln!(f)?;
        writeln!(f, "object {} {{", self.name)?;
        writeln!(f, "    @JvmField")?;
        if set.is_empty() {
            writeln!(f, "    val ids: Set<Int> = emptySet<Int>()")?;
        } else {
            writeln!(f, "    val ids: Set<Int> = setOf(")?;
            for (i, id) in set.iter().enumerate() {
                let sep = if i + 1 < set.len() { "," } else { "" };
                writeln!(f, "        {}{sep}", id.get())?;
            }
            writeln!(f, "    )")?;
        }
        writeln!(f, "}}")
    }

    fn write_rust(&self, set: &OversizedSet, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "// Generated by pixguard for {}. Do not edit.", self.package)?;
        writeln!(f)?;
        writeln!(f, "/// Ids routed through the pluggable image loader")?;
        writeln!(f, "pub struct {};", self.name)?;
        writeln!(f)?;
        writeln!(f, "impl {} {{", self.name)?;
        if set.is_empty() {
            writeln!(f, "    pub const IDS: &'static [i32] = &[];")?;
        } else {
            writeln!(f, "    pub const IDS: &'static [i32] = &[")?;
            for id in set {
                writeln!(f, "        {},", id.get())?;
            }
            writeln!(f, "    ];")?;
        }
        writeln!(f, "}}")
    }

    /// Write the artifact for `variant`, skipping the write when the
    /// existing file already has identical content
    ///
    /// # Errors
    ///
    /// Fails when the directory or file cannot be created or written.
    pub fn emit(&self, set: &OversizedSet, build_dir: &Path, variant: &str) -> Result<EmitOutcome, EmitError> {
        let path = self.artifact_path(build_dir, variant);
        let content = self.render(set);

        if std::fs::read(&path).is_ok_and(|existing| existing == content.as_bytes()) {
            debug!(path = %path.display(), "Artifact unchanged");
            return Ok(EmitOutcome::Unchanged(path));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EmitError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&path, content).map_err(|e| EmitError::Io {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), ids = set.len(), "Wrote oversized-id artifact");
        Ok(EmitOutcome::Written(path))
    }
}

struct Artifact<'a> {
    emitter: &'a ConstantEmitter,
    set: &'a OversizedSet,
}

impl Display for Artifact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.emitter.language {
            OutputLanguage::Kotlin => self.emitter.write_kotlin(self.set, f),
            OutputLanguage::Rust => self.emitter.write_rust(self.set, f),
        }
    }
}
