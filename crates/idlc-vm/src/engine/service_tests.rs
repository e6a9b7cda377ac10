use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use idlc_core::WireType;

use super::Result;
use super::codec::Codec;
use super::error::{ApplicationError, ApplicationErrorKind, RuntimeError};
use super::protocol::{BinaryProtocol, MessageType, Protocol};
use super::service::{CallError, Client, Handler, HandlerError, Processor, Transport};
use super::test_utils::{finder, function, geo, point, schema};
use super::value::{StructValue, Value};

struct Finder<'s> {
    codec: Codec<'s>,
    pings: Rc<Cell<usize>>,
}

impl Handler for Finder<'_> {
    fn call(
        &self,
        function: &str,
        args: &StructValue,
    ) -> std::result::Result<Option<Value>, HandlerError> {
        let name = args.get("name").and_then(Value::as_str);
        match (function, name) {
            ("find", Some("origin")) => Ok(Some(Value::Struct(point(&self.codec, 0, 0)))),
            ("find", Some("missing")) => {
                let not_found = self
                    .codec
                    .instantiate(&geo("NotFound"))
                    .unwrap()
                    .with("message", Value::string("no such point"));
                Err(HandlerError::Exception(not_found))
            }
            ("find", Some("unrelated")) => {
                let unrelated = self
                    .codec
                    .instantiate(&geo("Unrelated"))
                    .unwrap()
                    .with("code", Value::I32(7));
                Err(HandlerError::Exception(unrelated))
            }
            ("find", Some("broken")) => Err(HandlerError::Failed("disk on fire".to_owned())),
            ("find", _) | ("forget", _) => Ok(None),
            ("ping", _) => {
                self.pings.set(self.pings.get() + 1);
                Ok(None)
            }
            ("status", _) => Ok(Some(Value::string("ok"))),
            _ => Err(HandlerError::Failed(format!("unexpected call {function}"))),
        }
    }
}

fn find(client: &Client<'_>, name: &str) -> std::result::Result<Option<Value>, CallError> {
    let args = client.new_args("find").unwrap().with("name", Value::string(name));
    client.call("find", &args)
}

fn application_error(err: CallError) -> ApplicationError {
    match err {
        CallError::Transport(RuntimeError::Application(error)) => error,
        other => panic!("expected an application error, got {other:?}"),
    }
}

#[test]
fn call_returns_success() {
    let schema = schema();
    let codec = Codec::new(&schema);
    let handler = Finder {
        codec,
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();
    let client = Client::new(&schema, &finder(), &processor).unwrap();

    let found = find(&client, "origin").unwrap();
    assert_eq!(found, Some(Value::Struct(point(&codec, 0, 0))));
}

#[test]
fn declared_exception_reaches_the_caller() {
    let schema = schema();
    let codec = Codec::new(&schema);
    let handler = Finder {
        codec,
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();
    let client = Client::new(&schema, &finder(), &processor).unwrap();

    let err = find(&client, "missing").unwrap_err();
    let CallError::Exception(raised) = err else {
        panic!("expected a declared exception, got {err:?}");
    };
    assert_eq!(raised.type_ref(), &geo("NotFound"));
    assert_eq!(raised.get("message"), Some(&Value::string("no such point")));
}

#[test]
fn undeclared_errors_are_transport_errors() {
    let schema = schema();
    let handler = Finder {
        codec: Codec::new(&schema),
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();
    let client = Client::new(&schema, &finder(), &processor).unwrap();

    let error = application_error(find(&client, "unrelated").unwrap_err());
    assert_eq!(error.kind, ApplicationErrorKind::InternalError);
    insta::assert_snapshot!(error, @"Internal error processing find: undeclared exception geo.Unrelated");

    let error = application_error(find(&client, "broken").unwrap_err());
    assert_eq!(error.kind, ApplicationErrorKind::InternalError);
    insta::assert_snapshot!(error, @"Internal error processing find: disk on fire");
}

#[test]
fn missing_result() {
    let schema = schema();
    let handler = Finder {
        codec: Codec::new(&schema),
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();
    let client = Client::new(&schema, &finder(), &processor).unwrap();

    let error = application_error(find(&client, "nowhere").unwrap_err());
    assert_eq!(error.kind, ApplicationErrorKind::MissingResult);
    insta::assert_snapshot!(error, @"find failed: unknown result");
}

#[test]
fn void_and_oneway_calls() {
    let schema = schema();
    let pings = Rc::new(Cell::new(0));
    let handler = Finder {
        codec: Codec::new(&schema),
        pings: pings.clone(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();
    let client = Client::new(&schema, &finder(), &processor).unwrap();

    let args = client.new_args("forget").unwrap().with("name", Value::string("a"));
    assert_eq!(client.call("forget", &args).unwrap(), None);

    let args = client.new_args("ping").unwrap();
    assert_eq!(client.call("ping", &args).unwrap(), None);
    assert_eq!(pings.get(), 1);
    assert!(function(&schema, "ping").result.is_none());
}

#[test]
fn base_service_functions_are_forwarded() {
    let schema = schema();
    let handler = Finder {
        codec: Codec::new(&schema),
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();
    let client = Client::new(&schema, &finder(), &processor).unwrap();

    assert!(processor.service().function("status").is_none());
    let args = client.new_args("status").unwrap();
    assert_eq!(client.call("status", &args).unwrap(), Some(Value::string("ok")));

    let err = client.new_args("nope").unwrap_err();
    insta::assert_snapshot!(err, @"Finder has no function nope");
}

/// Frame a CALL whose args struct is empty.
fn empty_call(name: &str) -> Vec<u8> {
    let mut proto = BinaryProtocol::new();
    proto.write_message_begin(name, MessageType::Call, 1).unwrap();
    proto.write_field_stop().unwrap();
    proto.into_bytes()
}

/// Reads an EXCEPTION reply into (name, kind, message).
fn read_exception(bytes: Vec<u8>) -> (String, i32, String) {
    let mut input = BinaryProtocol::from_bytes(bytes);
    let (name, kind, _) = input.read_message_begin().unwrap();
    assert_eq!(kind, MessageType::Exception);
    assert_eq!(input.read_field_begin().unwrap(), (WireType::String, 1));
    let message = input.read_string().unwrap();
    assert_eq!(input.read_field_begin().unwrap(), (WireType::I32, 2));
    let kind = input.read_i32().unwrap();
    assert_eq!(input.read_field_begin().unwrap(), (WireType::Stop, 0));
    (name, kind, message)
}

#[test]
fn processor_rejects_unknown_function() {
    let schema = schema();
    let handler = Finder {
        codec: Codec::new(&schema),
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();

    let reply = processor.process(&empty_call("nope")).unwrap();
    let (name, kind, message) = read_exception(reply);
    assert_eq!(name, "nope");
    assert_eq!(kind, ApplicationErrorKind::UnknownMethod.as_i32());
    insta::assert_snapshot!(message, @"Unknown function nope");
}

#[test]
fn processor_reports_bad_args() {
    let schema = schema();
    let handler = Finder {
        codec: Codec::new(&schema),
        pings: Rc::default(),
    };
    let processor = Processor::new(&schema, &finder(), Arc::new(handler)).unwrap();

    let reply = processor.process(&empty_call("find")).unwrap();
    let (_, kind, message) = read_exception(reply);
    assert_eq!(kind, ApplicationErrorKind::ProtocolError.as_i32());
    insta::assert_snapshot!(message, @"Required field Name is not set");
}

/// Answers every request with a canned reply.
struct Canned(Vec<u8>);

impl Transport for Canned {
    fn round_trip(&self, _request: Vec<u8>) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

#[test]
fn client_checks_reply_header() {
    let schema = schema();

    let mut reply = BinaryProtocol::new();
    reply.write_message_begin("other", MessageType::Reply, 1).unwrap();
    let transport = Canned(reply.into_bytes());
    let client = Client::new(&schema, &finder(), &transport).unwrap();
    let error = application_error(find(&client, "origin").unwrap_err());
    assert_eq!(error.kind, ApplicationErrorKind::WrongMethodName);
    insta::assert_snapshot!(error, @"find: wrong method name");

    let mut reply = BinaryProtocol::new();
    reply.write_message_begin("find", MessageType::Reply, 99).unwrap();
    let transport = Canned(reply.into_bytes());
    let client = Client::new(&schema, &finder(), &transport).unwrap();
    let error = application_error(find(&client, "origin").unwrap_err());
    assert_eq!(error.kind, ApplicationErrorKind::BadSequenceId);
}

#[test]
fn unknown_service() {
    let schema = schema();
    let transport = Canned(Vec::new());

    let err = Client::new(&schema, &geo("Nope"), &transport).err().unwrap();
    insta::assert_snapshot!(err, @"unknown service geo.Nope");
}
