//! Binary protocol type tags.

use crate::model::{BaseType, Type};

/// Type tag written in field, map, set and list headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl WireType {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => WireType::Stop,
            1 => WireType::Void,
            2 => WireType::Bool,
            3 => WireType::Byte,
            4 => WireType::Double,
            6 => WireType::I16,
            8 => WireType::I32,
            10 => WireType::I64,
            11 => WireType::String,
            12 => WireType::Struct,
            13 => WireType::Map,
            14 => WireType::Set,
            15 => WireType::List,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tag for an already resolved type. `None` for void and typedefs.
    pub fn of(true_type: &Type) -> Option<Self> {
        Some(match true_type {
            Type::Base(base) => match base {
                BaseType::Bool => WireType::Bool,
                BaseType::Byte => WireType::Byte,
                BaseType::I16 => WireType::I16,
                BaseType::I32 => WireType::I32,
                BaseType::I64 => WireType::I64,
                BaseType::Double => WireType::Double,
                BaseType::String | BaseType::Binary => WireType::String,
            },
            Type::Enum(_) => WireType::I32,
            Type::Struct(_) => WireType::Struct,
            Type::Map { .. } => WireType::Map,
            Type::Set(_) => WireType::Set,
            Type::List(_) => WireType::List,
            Type::Void | Type::Typedef(_) => return None,
        })
    }

    /// Constant name in the Go runtime package.
    pub fn go_name(self) -> &'static str {
        match self {
            WireType::Stop => "STOP",
            WireType::Void => "VOID",
            WireType::Bool => "BOOL",
            WireType::Byte => "BYTE",
            WireType::Double => "DOUBLE",
            WireType::I16 => "I16",
            WireType::I32 => "I32",
            WireType::I64 => "I64",
            WireType::String => "STRING",
            WireType::Struct => "STRUCT",
            WireType::Map => "MAP",
            WireType::Set => "SET",
            WireType::List => "LIST",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.go_name())
    }
}
