//! Dynamic runtime values.

use indexmap::IndexMap;

use idlc_core::TypeRef;

/// Value held by a struct slot or container element.
///
/// Maps and sets keep insertion order; a set never holds duplicates.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Enum(i32),
    Struct(StructValue),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Enum(_) => "enum",
            Value::Struct(_) => "struct",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::List(_) => "list",
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Instance of a generated struct: one slot per field, in declaration
/// order. An empty slot is a nil pointer, slice or map.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    ty: TypeRef,
    slots: IndexMap<String, Option<Value>>,
}

impl StructValue {
    pub(crate) fn new(ty: TypeRef, slots: IndexMap<String, Option<Value>>) -> Self {
        Self { ty, slots }
    }

    /// Definition this value instantiates.
    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.slots.get(field).and_then(Option::as_ref)
    }

    /// Store `value` in an existing slot. Returns `false` for unknown fields.
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        match self.slots.get_mut(field) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Builder form of [`StructValue::set`]; unknown fields are ignored.
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.set(field, value);
        self
    }

    /// Empty the slot (`p.F = nil`).
    pub fn clear(&mut self, field: &str) {
        if let Some(slot) = self.slots.get_mut(field) {
            *slot = None;
        }
    }

    pub fn has_slot(&self, field: &str) -> bool {
        self.slots.contains_key(field)
    }

    pub(crate) fn slot(&self, field: &str) -> Option<&Option<Value>> {
        self.slots.get(field)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&str, Option<&Value>)> + '_ {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}
