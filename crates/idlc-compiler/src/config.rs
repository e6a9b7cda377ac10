//! Generator configuration.

use std::collections::BTreeMap;

/// Import path of the Go runtime library when not overridden.
pub const DEFAULT_THRIFT_IMPORT: &str = "github.com/upfluence/thrift/lib/go/thrift";

/// Configuration for Go emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Package name override for the generated program
    pub(crate) package: Option<String>,
    /// Prefix prepended to every include import path
    pub(crate) package_prefix: String,
    /// Import path of the runtime library
    pub(crate) thrift_import: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package: None,
            package_prefix: String::new(),
            thrift_import: DEFAULT_THRIFT_IMPORT.to_owned(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from generator options (`package`, `package_prefix`,
    /// `thrift_import`). Unknown keys are ignored.
    pub fn from_options(options: &BTreeMap<String, String>) -> Self {
        let mut config = Self::default();
        for (key, value) in options {
            match key.as_str() {
                "package" => config.package = Some(value.clone()),
                "package_prefix" => config.package_prefix = value.clone(),
                "thrift_import" => config.thrift_import = value.clone(),
                other => tracing::warn!(option = other, "unknown generator option ignored"),
            }
        }
        config
    }

    /// Set the package name of the generated program.
    pub fn package(mut self, name: impl Into<String>) -> Self {
        self.package = Some(name.into());
        self
    }

    /// Set the prefix for include import paths.
    pub fn package_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.package_prefix = prefix.into();
        self
    }

    /// Set the import path of the runtime library.
    pub fn thrift_import(mut self, path: impl Into<String>) -> Self {
        self.thrift_import = path.into();
        self
    }

    pub fn thrift_import_path(&self) -> &str {
        &self.thrift_import
    }
}
