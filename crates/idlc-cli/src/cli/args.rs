//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Resolved program model (positional).
pub fn model_path_arg() -> Arg {
    Arg::new("model_path")
        .value_name("MODEL")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Resolved program model as JSON ('-' reads stdin)")
}

/// Output root directory (-o/--out).
pub fn out_dir_arg() -> Arg {
    Arg::new("out_dir")
        .short('o')
        .long("out")
        .value_name("DIR")
        .default_value("gen-go")
        .value_parser(value_parser!(PathBuf))
        .help("Directory the Go package is written under")
}

/// Generator option (--opt key=value), repeatable.
pub fn option_arg() -> Arg {
    Arg::new("options")
        .long("opt")
        .value_name("KEY=VALUE")
        .action(ArgAction::Append)
        .value_parser(parse_option)
        .help("Generator option: package, package_prefix, thrift_import")
}

/// Skip the gofmt pass (--no-format).
pub fn no_format_arg() -> Arg {
    Arg::new("no_format")
        .long("no-format")
        .action(ArgAction::SetTrue)
        .help("Don't run gofmt on generated files")
}

/// Print the generated package as JSON (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the generated package (files and warnings) as JSON")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .global(true)
        .action(ArgAction::Count)
        .help("Verbosity level (-v for info, -vv for debug); RUST_LOG takes precedence")
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
