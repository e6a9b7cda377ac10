//! `idlc gen`: generate, write, then format.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use idlc_compiler::{Config, GeneratedPackage, generate_program};

use super::model_loader::load_model;
use super::{CommandError, fail};

pub struct GenArgs {
    pub model_path: PathBuf,
    pub out_dir: PathBuf,
    pub options: BTreeMap<String, String>,
    /// Run `gofmt -w` on every written file.
    pub format: bool,
}

pub fn run(args: GenArgs) {
    if let Err(err) = execute(&args) {
        fail(&err);
    }
}

/// Returns the paths written, in generation order.
pub fn execute(args: &GenArgs) -> Result<Vec<PathBuf>, CommandError> {
    let program = load_model(&args.model_path)?;
    let config = Config::from_options(&args.options);
    let package = generate_program(&program, &config)?;

    let written = write_package(&package, &args.out_dir)?;
    if args.format {
        for path in &written {
            format_file(path);
        }
    }
    tracing::info!(
        package = %package.package_name,
        files = written.len(),
        dir = %args.out_dir.join(&package.dir).display(),
        "generated package"
    );
    Ok(written)
}

pub fn write_package(
    package: &GeneratedPackage,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, CommandError> {
    let dir = out_dir.join(&package.dir);
    fs::create_dir_all(&dir).map_err(|source| CommandError::Write {
        path: dir.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(package.files.len());
    for file in &package.files {
        let path = dir.join(&file.name);
        fs::write(&path, &file.contents).map_err(|source| CommandError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote file");
        written.push(path);
    }
    Ok(written)
}

/// Formatter failures are reported and otherwise ignored.
fn format_file(path: &Path) {
    let ok = Command::new("gofmt")
        .arg("-w")
        .arg(path)
        .status()
        .is_ok_and(|status| status.success());
    if !ok {
        tracing::warn!("WARNING - Running 'gofmt -w {}' failed.", path.display());
    }
}
