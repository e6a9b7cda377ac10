//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("idlc")
        .about("Go code generator for resolved Thrift IDL models")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(gen_command())
        .subcommand(check_command())
}

/// Generate a Go package and format it.
pub fn gen_command() -> Command {
    Command::new("gen")
        .about("Generate a Go package from a program model")
        .override_usage("  idlc gen <MODEL> [-o <DIR>] [--opt <KEY=VALUE>]... [--no-format]")
        .after_help(
            r#"EXAMPLES:
  idlc gen model.json                          # writes gen-go/<package>/
  idlc gen model.json -o out --opt package=api # rename the root package
  idlc gen - --no-format < model.json          # read stdin, skip gofmt"#,
        )
        .arg(model_path_arg())
        .arg(out_dir_arg())
        .arg(option_arg())
        .arg(no_format_arg())
}

/// Generate in memory and report problems.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a program model without writing files")
        .after_help(
            r#"EXAMPLES:
  idlc check model.json                        # silent on success
  idlc check model.json --opt thrift_import=x  # same options as gen
  idlc check model.json --json > package.json  # dump the package instead"#,
        )
        .arg(model_path_arg())
        .arg(option_arg())
        .arg(json_arg())
}
