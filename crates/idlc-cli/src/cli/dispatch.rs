//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ArgMatches;

use crate::commands::check::CheckArgs;
use crate::commands::generate::GenArgs;

pub struct GenParams {
    pub model_path: PathBuf,
    pub out_dir: PathBuf,
    pub options: BTreeMap<String, String>,
    pub no_format: bool,
}

impl GenParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            model_path: model_path(m),
            out_dir: m
                .get_one::<PathBuf>("out_dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("gen-go")),
            options: options(m),
            no_format: m.get_flag("no_format"),
        }
    }
}

impl From<GenParams> for GenArgs {
    fn from(p: GenParams) -> Self {
        Self {
            model_path: p.model_path,
            out_dir: p.out_dir,
            options: p.options,
            format: !p.no_format,
        }
    }
}

pub struct CheckParams {
    pub model_path: PathBuf,
    pub options: BTreeMap<String, String>,
    pub json: bool,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            model_path: model_path(m),
            options: options(m),
            json: m.get_flag("json"),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            model_path: p.model_path,
            options: p.options,
            json: p.json,
        }
    }
}

fn model_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("model_path").cloned().unwrap_or_default()
}

/// Later `--opt` values override earlier ones with the same key.
fn options(m: &ArgMatches) -> BTreeMap<String, String> {
    m.get_many::<(String, String)>("options")
        .into_iter()
        .flatten()
        .cloned()
        .collect()
}
