use std::collections::BTreeMap;
use std::path::PathBuf;

use idlc_compiler::{Config, GeneratedPackage, generate_program};

use super::model_loader::load_model;
use super::{CommandError, fail};

pub struct CheckArgs {
    pub model_path: PathBuf,
    pub options: BTreeMap<String, String>,
    pub json: bool,
}

pub fn run(args: CheckArgs) {
    let package = match execute(&args) {
        Ok(package) => package,
        Err(err) => fail(&err),
    };
    for warning in &package.warnings {
        eprintln!("warning: {warning}");
    }
    if args.json {
        match to_json(&package) {
            Ok(json) => println!("{json}"),
            Err(err) => fail(&err),
        }
    }
    // Silent on success otherwise (like cargo check)
}

/// Generate in memory without touching the output directory.
pub fn execute(args: &CheckArgs) -> Result<GeneratedPackage, CommandError> {
    let program = load_model(&args.model_path)?;
    let config = Config::from_options(&args.options);
    Ok(generate_program(&program, &config)?)
}

/// Pretty JSON: package name, directory, files with contents, warnings.
pub fn to_json(package: &GeneratedPackage) -> Result<String, CommandError> {
    serde_json::to_string_pretty(package).map_err(CommandError::Serialize)
}
