//! Binary protocol.

use idlc_core::WireType;

use super::Result;
use super::error::RuntimeError;

const VERSION_1: u32 = 0x8001_0000;
const VERSION_MASK: u32 = 0xffff_0000;

/// Nesting limit for [`skip`].
pub const MAX_SKIP_DEPTH: usize = 64;

/// Message kinds carried in the message header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl MessageType {
    pub fn from_u8(tag: u8) -> Result<Self> {
        Ok(match tag {
            1 => MessageType::Call,
            2 => MessageType::Reply,
            3 => MessageType::Exception,
            4 => MessageType::Oneway,
            other => {
                return Err(RuntimeError::InvalidData(format!(
                    "invalid message type {other}"
                )));
            }
        })
    }
}

/// Reader/writer pair used by generated `Read`/`Write` methods.
///
/// Begin/end pairs that carry nothing on the binary wire still exist so
/// other encodings can hook them.
pub trait Protocol {
    fn write_message_begin(&mut self, name: &str, kind: MessageType, seq_id: i32) -> Result<()>;
    fn write_message_end(&mut self) -> Result<()>;
    fn write_struct_begin(&mut self, name: &str) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;
    fn write_field_begin(&mut self, name: &str, wire: WireType, id: i16) -> Result<()>;
    fn write_field_end(&mut self) -> Result<()>;
    fn write_field_stop(&mut self) -> Result<()>;
    fn write_map_begin(&mut self, key: WireType, value: WireType, size: usize) -> Result<()>;
    fn write_map_end(&mut self) -> Result<()>;
    fn write_list_begin(&mut self, elem: WireType, size: usize) -> Result<()>;
    fn write_list_end(&mut self) -> Result<()>;
    fn write_set_begin(&mut self, elem: WireType, size: usize) -> Result<()>;
    fn write_set_end(&mut self) -> Result<()>;
    fn write_bool(&mut self, v: bool) -> Result<()>;
    fn write_byte(&mut self, v: i8) -> Result<()>;
    fn write_i16(&mut self, v: i16) -> Result<()>;
    fn write_i32(&mut self, v: i32) -> Result<()>;
    fn write_i64(&mut self, v: i64) -> Result<()>;
    fn write_double(&mut self, v: f64) -> Result<()>;
    fn write_string(&mut self, v: &str) -> Result<()>;
    fn write_binary(&mut self, v: &[u8]) -> Result<()>;

    fn read_message_begin(&mut self) -> Result<(String, MessageType, i32)>;
    fn read_message_end(&mut self) -> Result<()>;
    fn read_struct_begin(&mut self) -> Result<()>;
    fn read_struct_end(&mut self) -> Result<()>;
    /// Field type and id. The id of a `Stop` is 0.
    fn read_field_begin(&mut self) -> Result<(WireType, i16)>;
    fn read_field_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<(WireType, WireType, usize)>;
    fn read_map_end(&mut self) -> Result<()>;
    fn read_list_begin(&mut self) -> Result<(WireType, usize)>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<(WireType, usize)>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Vec<u8>>;

    /// Discard one value of type `wire`.
    fn skip(&mut self, wire: WireType) -> Result<()>
    where
        Self: Sized,
    {
        skip(self, wire)
    }
}

/// Discard one value of type `wire`, recursing through containers.
pub fn skip<P: Protocol + ?Sized>(proto: &mut P, wire: WireType) -> Result<()> {
    skip_nested(proto, wire, MAX_SKIP_DEPTH)
}

fn skip_nested<P: Protocol + ?Sized>(
    proto: &mut P,
    wire: WireType,
    depth: usize,
) -> Result<()> {
    if depth == 0 {
        return Err(RuntimeError::DepthLimit(MAX_SKIP_DEPTH));
    }
    match wire {
        WireType::Stop | WireType::Void => Ok(()),
        WireType::Bool => proto.read_bool().map(drop),
        WireType::Byte => proto.read_byte().map(drop),
        WireType::I16 => proto.read_i16().map(drop),
        WireType::I32 => proto.read_i32().map(drop),
        WireType::I64 => proto.read_i64().map(drop),
        WireType::Double => proto.read_double().map(drop),
        WireType::String => proto.read_binary().map(drop),
        WireType::Struct => {
            proto.read_struct_begin()?;
            loop {
                let (field, _) = proto.read_field_begin()?;
                if field == WireType::Stop {
                    break;
                }
                skip_nested(proto, field, depth - 1)?;
                proto.read_field_end()?;
            }
            proto.read_struct_end()
        }
        WireType::Map => {
            let (key, value, size) = proto.read_map_begin()?;
            element_type(key)?;
            element_type(value)?;
            for _ in 0..size {
                skip_nested(proto, key, depth - 1)?;
                skip_nested(proto, value, depth - 1)?;
            }
            proto.read_map_end()
        }
        WireType::Set => {
            let (elem, size) = proto.read_set_begin()?;
            element_type(elem)?;
            for _ in 0..size {
                skip_nested(proto, elem, depth - 1)?;
            }
            proto.read_set_end()
        }
        WireType::List => {
            let (elem, size) = proto.read_list_begin()?;
            element_type(elem)?;
            for _ in 0..size {
                skip_nested(proto, elem, depth - 1)?;
            }
            proto.read_list_end()
        }
    }
}

/// Containers of STOP or VOID carry no data to skip over.
fn element_type(wire: WireType) -> Result<()> {
    match wire {
        WireType::Stop | WireType::Void => Err(RuntimeError::InvalidData(format!(
            "invalid container element type {wire}"
        ))),
        _ => Ok(()),
    }
}

/// Strict binary protocol over an in-memory buffer.
///
/// Writes append to the buffer; reads consume it from the front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BinaryProtocol {
    buf: Vec<u8>,
    pos: usize,
}

impl BinaryProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader over previously encoded bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { buf: bytes, pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(RuntimeError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_wire_type(&mut self) -> Result<WireType> {
        let [tag] = self.take_array::<1>()?;
        WireType::from_u8(tag).ok_or(RuntimeError::InvalidWireType(tag))
    }

    fn read_size(&mut self) -> Result<usize> {
        let size = self.read_i32()?;
        usize::try_from(size).map_err(|_| RuntimeError::NegativeSize(size))
    }

    fn write_size(&mut self, size: usize) -> Result<()> {
        let size = i32::try_from(size)
            .map_err(|_| RuntimeError::InvalidData(format!("size {size} exceeds i32")))?;
        self.write_i32(size)
    }
}

impl Protocol for BinaryProtocol {
    fn write_message_begin(&mut self, name: &str, kind: MessageType, seq_id: i32) -> Result<()> {
        self.buf
            .extend_from_slice(&(VERSION_1 | kind as u32).to_be_bytes());
        self.write_string(name)?;
        self.write_i32(seq_id)
    }

    fn write_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, _name: &str, wire: WireType, id: i16) -> Result<()> {
        self.buf.push(wire.as_u8());
        self.write_i16(id)
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.buf.push(WireType::Stop.as_u8());
        Ok(())
    }

    fn write_map_begin(&mut self, key: WireType, value: WireType, size: usize) -> Result<()> {
        self.buf.push(key.as_u8());
        self.buf.push(value.as_u8());
        self.write_size(size)
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_list_begin(&mut self, elem: WireType, size: usize) -> Result<()> {
        self.buf.push(elem.as_u8());
        self.write_size(size)
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, elem: WireType, size: usize) -> Result<()> {
        self.write_list_begin(elem, size)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.buf.push(u8::from(v));
        Ok(())
    }

    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn write_i16(&mut self, v: i16) -> Result<()> {
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.buf.extend_from_slice(&v.to_bits().to_be_bytes());
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<()> {
        self.write_size(v.len())?;
        self.buf.extend_from_slice(v);
        Ok(())
    }

    fn read_message_begin(&mut self) -> Result<(String, MessageType, i32)> {
        let header = self.read_i32()?;
        if header >= 0 {
            // Non-strict header: name first, then the type byte.
            let len = usize::try_from(header).map_err(|_| RuntimeError::NegativeSize(header))?;
            let name = utf8(self.take(len)?.to_vec())?;
            let [kind] = self.take_array::<1>()?;
            let seq_id = self.read_i32()?;
            return Ok((name, MessageType::from_u8(kind)?, seq_id));
        }
        let header = header as u32;
        if header & VERSION_MASK != VERSION_1 {
            return Err(RuntimeError::BadVersion(header));
        }
        let kind = MessageType::from_u8((header & 0xff) as u8)?;
        let name = self.read_string()?;
        let seq_id = self.read_i32()?;
        Ok((name, kind, seq_id))
    }

    fn read_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<(WireType, i16)> {
        let wire = self.read_wire_type()?;
        if wire == WireType::Stop {
            return Ok((wire, 0));
        }
        Ok((wire, self.read_i16()?))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<(WireType, WireType, usize)> {
        let key = self.read_wire_type()?;
        let value = self.read_wire_type()?;
        Ok((key, value, self.read_size()?))
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<(WireType, usize)> {
        let elem = self.read_wire_type()?;
        Ok((elem, self.read_size()?))
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<(WireType, usize)> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        let [b] = self.take_array::<1>()?;
        Ok(b != 0)
    }

    fn read_byte(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.take_array()?))
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_be_bytes(self.take_array()?)))
    }

    fn read_string(&mut self) -> Result<String> {
        utf8(self.read_binary()?)
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        let len = self.read_size()?;
        Ok(self.take(len)?.to_vec())
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| RuntimeError::InvalidData(e.to_string()))
}
