//! Runtime model for code generated by idlc.
//!
//! Executes the same codec plans the Go emitter consumes, against the
//! binary protocol, so wire behavior can be exercised without a Go
//! toolchain.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;

pub use engine::{
    ApplicationError, ApplicationErrorKind, BinaryProtocol, CallError, Client, Codec, Handler,
    HandlerError, MessageType, Processor, Protocol, RuntimeError, StructValue, Transport, Value,
};
