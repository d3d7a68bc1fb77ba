//! Guard configuration
//!
//! Every key except `namespace` is optional in the TOML file; omitted keys
//! take the defaults below. A configuration without a namespace loads but
//! fails [`GuardConfig::validate`].
//!
//! ```toml
//! max_width = 400
//! max_height = 400
//! max_file_size = 102400
//! all_raster_uses_pluggable_loader = false
//! namespace = "com.example.app"
//!
//! [logging]
//! filter = "pixguard=debug"
//! ```

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::Thresholds;
use crate::logging::LoggingConfig;

/// Language of the generated constant artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguage {
    /// `object <Name> { @JvmField val ids: Set<Int> }`
    #[default]
    Kotlin,
    /// `impl <Name> { pub const IDS: &[i32] }`
    Rust,
}

impl OutputLanguage {
    /// File extension of the artifact
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Kotlin => "kt",
            Self::Rust => "rs",
        }
    }
}

impl Display for OutputLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kotlin => "kotlin",
            Self::Rust => "rust",
        })
    }
}

/// Guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Widest raster that stays on the default path, in pixels
    pub max_width: u32,
    /// Tallest raster that stays on the default path, in pixels
    pub max_height: u32,
    /// Largest raster file that stays on the default path, in bytes
    pub max_file_size: u64,
    /// Route every used raster through the loader regardless of size
    pub all_raster_uses_pluggable_loader: bool,
    /// Declared name of the generated constant holder
    pub generated_constant_name: String,
    /// Package of the generated constant holder
    pub generated_package: String,
    /// Language of the generated artifact
    pub generated_language: OutputLanguage,
    /// Resource namespace (package of the identifier modules)
    pub namespace: String,
    /// Namespace whose classes are rewritten; falls back to `namespace`
    pub instrumented_namespace: Option<String>,
    /// Namespace of the runtime dispatcher, never rewritten
    pub runtime_namespace: String,
    /// Simple name of the dispatcher class
    pub dispatcher_class: String,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 400,
            max_file_size: 100 * 1024,
            all_raster_uses_pluggable_loader: true,
            generated_constant_name: "OversizedImages".to_owned(),
            generated_package: "io.pixguard.runtime".to_owned(),
            generated_language: OutputLanguage::Kotlin,
            namespace: String::new(),
            instrumented_namespace: None,
            runtime_namespace: "io.pixguard.runtime".to_owned(),
            dispatcher_class: "PixGuard".to_owned(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With resource namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// With size thresholds
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.max_width = thresholds.max_width;
        self.max_height = thresholds.max_height;
        self.max_file_size = thresholds.max_file_size;
        self
    }

    /// With the unconditional-loader override
    #[must_use]
    pub fn with_override(mut self, all_raster: bool) -> Self {
        self.all_raster_uses_pluggable_loader = all_raster;
        self
    }

    /// With artifact language
    #[must_use]
    pub fn with_language(mut self, language: OutputLanguage) -> Self {
        self.generated_language = language;
        self
    }

    /// Size thresholds
    #[inline]
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_width: self.max_width,
            max_height: self.max_height,
            max_file_size: self.max_file_size,
        }
    }

    /// Namespace whose classes get rewritten
    #[must_use]
    pub fn instrumented_namespace(&self) -> &str {
        self.instrumented_namespace
            .as_deref()
            .filter(|ns| !ns.trim().is_empty())
            .unwrap_or(&self.namespace)
    }

    /// Load from a TOML file; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML for this
    /// schema, or does not pass [`GuardConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load, downgrading any problem to defaults with a warning
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Using default configuration");
            Self::default()
        })
    }

    /// Check generated names and namespaces
    ///
    /// # Errors
    ///
    /// Returns the first field that is not a valid identifier or dotted
    /// package name. A blank `namespace` is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_package(&self.namespace) {
            return Err(ConfigError::invalid("namespace", &self.namespace));
        }
        if let Some(ns) = self.instrumented_namespace.as_deref() {
            if !ns.trim().is_empty() && !is_package(ns) {
                return Err(ConfigError::invalid("instrumented_namespace", ns));
            }
        }
        if !is_identifier(&self.generated_constant_name) {
            return Err(ConfigError::invalid("generated_constant_name", &self.generated_constant_name));
        }
        if !is_identifier(&self.dispatcher_class) {
            return Err(ConfigError::invalid("dispatcher_class", &self.dispatcher_class));
        }
        if !is_package(&self.generated_package) {
            return Err(ConfigError::invalid("generated_package", &self.generated_package));
        }
        if !is_package(&self.runtime_namespace) {
            return Err(ConfigError::invalid("runtime_namespace", &self.runtime_namespace));
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_package(s: &str) -> bool {
    s.split('.').all(is_identifier)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for the schema
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// A value failed validation
    #[error("invalid value for {field}: {value:?}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// Offending value
        value: String,
    },
}

impl ConfigError {
    /// Create validation error
    #[must_use]
    pub fn invalid(field: &'static str, value: &str) -> Self {
        Self::Invalid {
            field,
            value: value.to_owned(),
        }
    }
}
