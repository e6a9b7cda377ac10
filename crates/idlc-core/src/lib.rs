#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for idlc.
//!
//! - **Model**: the resolved IDL program as produced by the front end
//!   (deserializable from JSON)
//! - **Index**: cross-program lookups and typedef resolution
//! - **Wire**: binary protocol type tags

mod index;
mod model;
pub mod utils;
mod wire;

#[cfg(test)]
mod index_tests;
#[cfg(test)]
mod model_tests;

pub use index::{ModelIndex, ResolveError};
pub use model::{
    Annotations, BaseType, Const, ConstValue, Enum, EnumValue, Field, Function, Program,
    Requiredness, Service, Struct, StructuredAnnotation, Type, TypeRef, Typedef,
};
pub use wire::WireType;
