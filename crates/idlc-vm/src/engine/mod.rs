//! Runtime engine.
//!
//! - `protocol` - binary protocol reader/writer and generic skip
//! - `value` - dynamic values and declaration-ordered struct slots
//! - `codec` - struct plan interpreter (`Read`/`Write` semantics)
//! - `service` - client, processor and the transport between them

mod codec;
mod error;
mod protocol;
mod service;
mod value;

#[cfg(test)]
mod service_tests;
#[cfg(test)]
mod test_utils;

pub use codec::Codec;
pub use error::{ApplicationError, ApplicationErrorKind, RuntimeError};
pub use protocol::{BinaryProtocol, MessageType, Protocol, skip};
pub use service::{CallError, Client, Handler, HandlerError, Processor, Transport};
pub use value::{StructValue, Value};

pub type Result<T> = std::result::Result<T, RuntimeError>;
