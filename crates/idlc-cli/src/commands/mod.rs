pub mod check;
pub mod generate;
pub mod model_loader;


use std::path::PathBuf;

/// Failure of a CLI command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid model '{}': {source}", path.display())]
    Model {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Generate(#[from] idlc_compiler::Error),

    #[error("failed to serialize package: {0}")]
    Serialize(serde_json::Error),
}

/// Print `err` and exit with status 1.
pub fn fail(err: &CommandError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}
