//! In-memory result of a generation run.

use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::Warning;

/// One generated Go source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// File name inside the package directory.
    pub name: String,
    pub contents: String,
}

/// Generated Go package. Writing it to disk is the caller's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedPackage {
    pub package_name: String,
    /// Package directory relative to the output root.
    pub dir: PathBuf,
    pub files: Vec<GeneratedFile>,
    #[serde(serialize_with = "warning_messages")]
    pub warnings: Vec<Warning>,
}

impl GeneratedPackage {
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.contents.as_str())
    }

    /// Paths of every file, relative to the output root.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(|f| self.dir.join(&f.name))
    }
}

fn warning_messages<S: Serializer>(warnings: &[Warning], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(warnings.iter().map(ToString::to_string))
}
