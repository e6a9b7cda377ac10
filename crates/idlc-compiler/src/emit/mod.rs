//! Go emission.
//!
//! One [`Emitter`] per run turns the root program into a
//! [`GeneratedPackage`]: `ttypes.go` (typedefs, enums, structs),
//! `constants.go` (constants and the registration `init()`), and one file
//! per service. The emitter is split across files by concern:
//! - `types` - typedefs, enums, constants
//! - `structs` - struct definitions, accessors, `Read`/`Write`
//! - `codec` - per-value protocol reads/writes through containers
//! - `services` - interfaces, clients, processors, handlers
//! - `metadata` - reflection sidecar definitions

mod code_writer;
mod codec;
mod context;
mod emitter;
mod metadata;
mod output;
mod services;
mod structs;
mod types;

#[cfg(test)]
mod emitter_tests;
#[cfg(test)]
mod services_tests;

pub use code_writer::{CodeWriter, IndentGuard};
pub use context::GenContext;
pub use emitter::{CONSTANTS_FILE, Emitter, TYPES_FILE};
pub use metadata::{service_definition_var, struct_definition_var};
pub use output::{GeneratedFile, GeneratedPackage};
pub use structs::GO_TAG_ANNOTATION;
