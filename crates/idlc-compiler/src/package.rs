//! Go module, package and import path rules.

use std::path::PathBuf;

use idlc_core::Program;
use idlc_core::utils::{module_leaf, module_path};

use crate::Config;

/// Dotted Go module of a program: `go` namespace, else the lower-cased name.
pub fn go_module(program: &Program) -> String {
    match program.namespace("go") {
        Some(ns) if !ns.is_empty() => ns.to_owned(),
        _ => program.name.to_ascii_lowercase(),
    }
}

/// Package identifier used to qualify references into `program`.
pub fn package_name(program: &Program) -> String {
    module_leaf(&go_module(program)).to_owned()
}

/// Package name of the program being generated (honors the override).
pub fn root_package_name(program: &Program, config: &Config) -> String {
    match &config.package {
        Some(name) => name.clone(),
        None => package_name(program),
    }
}

/// Output directory of the generated package, relative to the output root.
pub fn package_dir(program: &Program) -> PathBuf {
    go_module(program).split('.').collect()
}

/// Import path of an included program.
pub fn import_path(include: &Program, config: &Config) -> String {
    let module = module_path(&go_module(include));
    if include.std_path {
        format!("{}/{}", config.thrift_import, module)
    } else {
        format!("{}{}", config.package_prefix, module)
    }
}

/// Namespace string recorded in metadata and provider lookups.
pub fn namespace(program: &Program) -> String {
    match program.namespace("*") {
        Some(ns) => ns.to_owned(),
        None => program.name.clone(),
    }
}

/// File name for a service, keeping Go tooling from treating it as a test.
pub fn service_file_name(service: &str) -> String {
    let base = service.to_ascii_lowercase();
    if base.ends_with("_test") {
        format!("{base}_.go")
    } else {
        format!("{base}.go")
    }
}
