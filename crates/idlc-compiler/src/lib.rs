//! idlc compiler: lowers a resolved IDL model into Go source.
//!
//! Pipeline, leaves first:
//! - `naming` - identifier renamer (visibility, initialisms, collisions)
//! - `lower` - type lowering and codec plans for structs, enums and services
//! - `consts` - constant literal rendering
//! - `emit` - Go emission (struct/container codecs, service stubs, metadata)
//! - `package` - Go module, package and import path rules

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod consts;
pub mod emit;
pub mod lower;
pub mod naming;
pub mod package;

#[cfg(test)]
pub mod test_utils;

use idlc_core::{ModelIndex, Program, ResolveError};

pub use config::Config;
pub use emit::{GeneratedFile, GeneratedPackage};
pub use lower::{LoweredSchema, lower_schema};

/// Fatal generation errors.
///
/// Most variants are user-facing: the model is well formed but cannot be
/// expressed in Go. Variants reported by [`Error::is_internal`] mean a value
/// reached a rule that upstream validation should have made impossible.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("type error: {struct_name} has no field {field}")]
    UnknownConstField { struct_name: String, field: String },

    #[error("{context}: void is not a value type")]
    VoidType { context: String },

    #[error("{context}: container type {key} cannot be used as a map/set key")]
    ContainerKey { context: String, key: String },

    #[error("oneway method {service}.{function} can't throw exceptions")]
    OnewayWithExceptions { service: String, function: String },

    #[error("duplicate field id {id} in {struct_name}")]
    DuplicateFieldId { struct_name: String, id: i16 },

    #[error("internal error: invalid type {ty} in {context}")]
    InvalidType { context: String, ty: String },

    #[error("internal error: constant of type {ty} cannot hold {value}")]
    InvalidConstValue { ty: String, value: String },
}

impl Error {
    /// Invariant violation rather than a user-correctable condition.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::InvalidType { .. } | Error::InvalidConstValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal findings. Generation continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("oneway method {service}.{function} should return void")]
    OnewayReturnsValue { service: String, function: String },

    #[error("oneway method {service}.{function} should not have streams/sinks")]
    OnewayStream { service: String, function: String },
}

/// Generate the Go package for the root program of `index`.
pub fn generate(index: &ModelIndex<'_>, config: &Config) -> Result<GeneratedPackage> {
    emit::Emitter::new(index, config).emit()
}

/// Convenience wrapper: index `program` and generate it.
pub fn generate_program(program: &Program, config: &Config) -> Result<GeneratedPackage> {
    let index = ModelIndex::new(program);
    generate(&index, config)
}
