use std::fs;
use std::io::{self, Read};
use std::path::Path;

use idlc_core::Program;

use super::CommandError;

/// Load a resolved program model from a JSON file, or stdin for `-`.
pub fn load_model(path: &Path) -> Result<Program, CommandError> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CommandError::Read {
                path: path.to_owned(),
                source,
            })?;
        buf
    } else {
        fs::read_to_string(path).map_err(|source| CommandError::Read {
            path: path.to_owned(),
            source,
        })?
    };

    let program = Program::from_json(&text).map_err(|source| CommandError::Model {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(program = %program.name, includes = program.includes.len(), "loaded model");
    Ok(program)
}
