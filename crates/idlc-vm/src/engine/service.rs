//! Client and processor for lowered service plans.
//!
//! Message flow follows the generated stubs: the client encodes the args
//! struct under a CALL (or ONEWAY) header, the processor decodes it, runs
//! the handler and answers with a REPLY carrying the result struct, or an
//! EXCEPTION carrying an application error.

use std::cell::Cell;
use std::sync::Arc;

use idlc_compiler::LoweredSchema;
use idlc_compiler::lower::{FunctionPlan, ReprKind, ServicePlan};
use idlc_core::{TypeRef, WireType};

use super::Result;
use super::codec::Codec;
use super::error::{ApplicationError, ApplicationErrorKind, RuntimeError};
use super::protocol::{BinaryProtocol, MessageType, Protocol, skip};
use super::value::{StructValue, Value};

/// Longest `extends` chain followed before giving up.
const MAX_EXTENDS: usize = 32;

/// Business logic behind a processor.
///
/// Receives the decoded args struct of `function`. Returns the success
/// value (`None` for void functions).
pub trait Handler {
    fn call(
        &self,
        function: &str,
        args: &StructValue,
    ) -> std::result::Result<Option<Value>, HandlerError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    /// An exception struct; delivered to the client when declared.
    #[error("exception {}", .0.type_ref())]
    Exception(StructValue),
    #[error("{0}")]
    Failed(String),
}

/// Moves one request to a server and back.
pub trait Transport {
    fn round_trip(&self, request: Vec<u8>) -> Result<Vec<u8>>;
}

/// Outcome of a failed client call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// Declared exception raised by the server handler.
    #[error("exception {}", .0.type_ref())]
    Exception(StructValue),
    #[error(transparent)]
    Transport(#[from] RuntimeError),
}

pub struct Processor<'s> {
    codec: Codec<'s>,
    service: &'s ServicePlan,
    handler: Arc<dyn Handler + 's>,
    base: Option<Box<Processor<'s>>>,
}

impl<'s> Processor<'s> {
    pub fn new(
        schema: &'s LoweredSchema,
        service: &TypeRef,
        handler: Arc<dyn Handler + 's>,
    ) -> Result<Self> {
        Self::nested(schema, service, handler, 0)
    }

    fn nested(
        schema: &'s LoweredSchema,
        service: &TypeRef,
        handler: Arc<dyn Handler + 's>,
        depth: usize,
    ) -> Result<Self> {
        if depth > MAX_EXTENDS {
            return Err(RuntimeError::DepthLimit(MAX_EXTENDS));
        }
        let plan = lookup_service(schema, service)?;
        let base = match &plan.extends {
            Some(base) => Some(Box::new(Self::nested(schema, base, handler.clone(), depth + 1)?)),
            None => None,
        };
        Ok(Self {
            codec: Codec::new(schema),
            service: plan,
            handler,
            base,
        })
    }

    pub fn service(&self) -> &'s ServicePlan {
        self.service
    }

    /// Own function first, then the base chain.
    fn resolve(&self, name: &str) -> Option<(&Self, &'s FunctionPlan)> {
        match self.service.function(name) {
            Some(function) => Some((self, function)),
            None => self.base.as_deref()?.resolve(name),
        }
    }

    /// Handle one framed request. Oneway calls produce an empty reply.
    pub fn process(&self, request: &[u8]) -> Result<Vec<u8>> {
        let mut input = BinaryProtocol::from_bytes(request.to_vec());
        let mut output = BinaryProtocol::new();
        let (name, _, seq_id) = input.read_message_begin()?;

        let Some((owner, function)) = self.resolve(&name) else {
            tracing::debug!(service = %self.service.go_name, function = %name, "unknown function");
            skip(&mut input, WireType::Struct)?;
            input.read_message_end()?;
            let error = ApplicationError::new(
                ApplicationErrorKind::UnknownMethod,
                format!("Unknown function {name}"),
            );
            write_exception(&mut output, &name, seq_id, &error)?;
            return Ok(output.into_bytes());
        };

        owner.dispatch(function, seq_id, &mut input, &mut output)?;
        Ok(output.into_bytes())
    }

    fn dispatch(
        &self,
        function: &FunctionPlan,
        seq_id: i32,
        input: &mut BinaryProtocol,
        output: &mut BinaryProtocol,
    ) -> Result<()> {
        let name = &function.name;
        let args = match self.codec.decode(&function.args, input) {
            Ok(args) => args,
            Err(err) => {
                if function.oneway {
                    return Err(err);
                }
                let error =
                    ApplicationError::new(ApplicationErrorKind::ProtocolError, err.to_string());
                return write_exception(output, name, seq_id, &error);
            }
        };
        input.read_message_end()?;

        let outcome = self.handler.call(name, &args);
        if function.oneway {
            if let Err(err) = outcome {
                tracing::warn!(function = %name, error = %err, "oneway handler failed");
            }
            return Ok(());
        }
        let Some(result_plan) = &function.result else {
            return Err(RuntimeError::InvalidData(format!("{name} has no result struct")));
        };

        let mut result = self.codec.new_struct(result_plan)?;
        match outcome {
            Ok(value) => {
                if let (Some(success), Some(value)) = (function.success(), value) {
                    result.set(&success.name, value);
                }
            }
            Err(HandlerError::Exception(exception)) => {
                let declared = function
                    .exceptions()
                    .find(|f| {
                        matches!(&f.repr.kind, ReprKind::Struct(ty) if ty == exception.type_ref())
                    });
                match declared {
                    Some(field) => {
                        result.set(&field.name, Value::Struct(exception));
                    }
                    None => {
                        let message = format!(
                            "Internal error processing {name}: undeclared exception {}",
                            exception.type_ref()
                        );
                        return internal_error(output, name, seq_id, message);
                    }
                }
            }
            Err(HandlerError::Failed(message)) => {
                let message = format!("Internal error processing {name}: {message}");
                return internal_error(output, name, seq_id, message);
            }
        }

        output.write_message_begin(name, MessageType::Reply, seq_id)?;
        self.codec.encode(result_plan, &result, output)?;
        output.write_message_end()
    }
}

impl Transport for Processor<'_> {
    fn round_trip(&self, request: Vec<u8>) -> Result<Vec<u8>> {
        self.process(&request)
    }
}

pub struct Client<'a> {
    transport: &'a dyn Transport,
    codec: Codec<'a>,
    service: &'a ServicePlan,
    base: Option<Box<Client<'a>>>,
    seq_id: Cell<i32>,
}

impl<'a> Client<'a> {
    pub fn new(
        schema: &'a LoweredSchema,
        service: &TypeRef,
        transport: &'a dyn Transport,
    ) -> Result<Self> {
        Self::nested(schema, service, transport, 0)
    }

    fn nested(
        schema: &'a LoweredSchema,
        service: &TypeRef,
        transport: &'a dyn Transport,
        depth: usize,
    ) -> Result<Self> {
        if depth > MAX_EXTENDS {
            return Err(RuntimeError::DepthLimit(MAX_EXTENDS));
        }
        let plan = lookup_service(schema, service)?;
        let base = match &plan.extends {
            Some(base) => Some(Box::new(Self::nested(schema, base, transport, depth + 1)?)),
            None => None,
        };
        Ok(Self {
            transport,
            codec: Codec::new(schema),
            service: plan,
            base,
            seq_id: Cell::new(0),
        })
    }

    fn resolve(&self, name: &str) -> Option<(&Self, &'a FunctionPlan)> {
        match self.service.function(name) {
            Some(function) => Some((self, function)),
            None => self.base.as_deref()?.resolve(name),
        }
    }

    fn unknown(&self, function: &str) -> RuntimeError {
        RuntimeError::UnknownFunction {
            service: self.service.go_name.clone(),
            function: function.to_owned(),
        }
    }

    /// Empty args struct for `function`.
    pub fn new_args(&self, function: &str) -> Result<StructValue> {
        let (_, plan) = self.resolve(function).ok_or_else(|| self.unknown(function))?;
        self.codec.new_struct(&plan.args)
    }

    pub fn call(
        &self,
        function: &str,
        args: &StructValue,
    ) -> std::result::Result<Option<Value>, CallError> {
        let (owner, plan) = self.resolve(function).ok_or_else(|| self.unknown(function))?;
        owner.invoke(plan, args)
    }

    fn next_seq_id(&self) -> i32 {
        let id = self.seq_id.get().wrapping_add(1);
        self.seq_id.set(id);
        id
    }

    fn invoke(
        &self,
        plan: &FunctionPlan,
        args: &StructValue,
    ) -> std::result::Result<Option<Value>, CallError> {
        let name = &plan.name;
        let seq_id = self.next_seq_id();
        let kind = if plan.oneway {
            MessageType::Oneway
        } else {
            MessageType::Call
        };

        let mut output = BinaryProtocol::new();
        output.write_message_begin(name, kind, seq_id)?;
        self.codec.encode(&plan.args, args, &mut output)?;
        output.write_message_end()?;
        let reply = self.transport.round_trip(output.into_bytes())?;
        if plan.oneway {
            return Ok(None);
        }

        let mut input = BinaryProtocol::from_bytes(reply);
        let (reply_name, reply_kind, reply_seq_id) = input.read_message_begin()?;
        let violation = |kind, message: String| {
            CallError::Transport(ApplicationError::new(kind, format!("{name}: {message}")).into())
        };
        match reply_kind {
            MessageType::Reply => {}
            MessageType::Exception => {
                let error = read_application_error(&mut input)?;
                input.read_message_end()?;
                return Err(RuntimeError::from(error).into());
            }
            _ => {
                return Err(violation(
                    ApplicationErrorKind::InvalidMessageType,
                    "invalid message type".to_owned(),
                ));
            }
        }
        if reply_name != *name {
            return Err(violation(
                ApplicationErrorKind::WrongMethodName,
                "wrong method name".to_owned(),
            ));
        }
        if reply_seq_id != seq_id {
            return Err(violation(
                ApplicationErrorKind::BadSequenceId,
                "out of order sequence response".to_owned(),
            ));
        }

        let Some(result_plan) = &plan.result else {
            return Err(RuntimeError::InvalidData(format!("{name} has no result struct")).into());
        };
        let result = self.codec.decode(result_plan, &mut input)?;
        input.read_message_end()?;

        for exception in plan.exceptions() {
            if let Some(Value::Struct(raised)) = result.get(&exception.name) {
                return Err(CallError::Exception(raised.clone()));
            }
        }
        let Some(success) = plan.success() else {
            return Ok(None);
        };
        match result.get(&success.name) {
            Some(value) => Ok(Some(value.clone())),
            None => Err(RuntimeError::from(ApplicationError::new(
                ApplicationErrorKind::MissingResult,
                format!("{name} failed: unknown result"),
            ))
            .into()),
        }
    }
}

fn lookup_service<'s>(schema: &'s LoweredSchema, service: &TypeRef) -> Result<&'s ServicePlan> {
    schema
        .service(service)
        .ok_or_else(|| RuntimeError::UnknownService(service.clone()))
}

fn internal_error(
    output: &mut BinaryProtocol,
    name: &str,
    seq_id: i32,
    message: String,
) -> Result<()> {
    tracing::debug!(function = %name, %message, "replying with internal error");
    let error = ApplicationError::new(ApplicationErrorKind::InternalError, message);
    write_exception(output, name, seq_id, &error)
}

/// EXCEPTION message carrying `{1: string message, 2: i32 type}`.
fn write_exception<P: Protocol + ?Sized>(
    output: &mut P,
    name: &str,
    seq_id: i32,
    error: &ApplicationError,
) -> Result<()> {
    output.write_message_begin(name, MessageType::Exception, seq_id)?;
    output.write_struct_begin("TApplicationException")?;
    output.write_field_begin("message", WireType::String, 1)?;
    output.write_string(&error.message)?;
    output.write_field_end()?;
    output.write_field_begin("type", WireType::I32, 2)?;
    output.write_i32(error.kind.as_i32())?;
    output.write_field_end()?;
    output.write_field_stop()?;
    output.write_struct_end()?;
    output.write_message_end()
}

fn read_application_error<P: Protocol + ?Sized>(input: &mut P) -> Result<ApplicationError> {
    let mut message = String::new();
    let mut kind = ApplicationErrorKind::Unknown;
    input.read_struct_begin()?;
    loop {
        match input.read_field_begin()? {
            (WireType::Stop, _) => break,
            (WireType::String, 1) => message = input.read_string()?,
            (WireType::I32, 2) => kind = ApplicationErrorKind::from_i32(input.read_i32()?),
            (wire, _) => skip(input, wire)?,
        }
        input.read_field_end()?;
    }
    input.read_struct_end()?;
    Ok(ApplicationError::new(kind, message))
}
