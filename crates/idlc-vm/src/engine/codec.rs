//! Struct plan interpreter.
//!
//! Executes lowered [`StructPlan`]s the way the generated Go methods do:
//! `NewT()` defaults, `IsSetF()` presence, union arity on `Write`,
//! required-field enforcement and unknown-field skipping on `Read`, with
//! the same error context prepended at each level.

use indexmap::IndexMap;

use idlc_compiler::LoweredSchema;
use idlc_compiler::lower::{FieldPlan, Presence, ReprKind, StructPlan, TypeRepr};
use idlc_core::{BaseType, ConstValue, TypeRef, WireType};

use super::Result;
use super::error::RuntimeError;
use super::protocol::{BinaryProtocol, Protocol, skip};
use super::value::{StructValue, Value};

/// Struct nesting limit for encode and decode.
pub const MAX_DEPTH: usize = 64;

/// Field a value belongs to, for error context.
#[derive(Clone, Copy)]
struct Site<'p> {
    owner: &'p str,
    id: i16,
    name: &'p str,
}

impl<'p> Site<'p> {
    fn of(plan: &'p StructPlan, field: &'p FieldPlan) -> Self {
        Self {
            owner: &plan.go_name,
            id: field.id,
            name: &field.name,
        }
    }

    fn write_error(&self) -> String {
        format!("*{}.{} ({}) field write error: ", self.owner, self.name, self.id)
    }
}

#[derive(Clone, Copy)]
pub struct Codec<'s> {
    schema: &'s LoweredSchema,
}

impl<'s> Codec<'s> {
    pub fn new(schema: &'s LoweredSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s LoweredSchema {
        self.schema
    }

    pub fn plan(&self, ty: &TypeRef) -> Result<&'s StructPlan> {
        self.schema
            .structure(ty)
            .ok_or_else(|| RuntimeError::UnknownStruct(ty.clone()))
    }

    /// Zero value with declared defaults, as built by `NewT()`.
    pub fn new_struct(&self, plan: &StructPlan) -> Result<StructValue> {
        let mut slots = IndexMap::with_capacity(plan.fields.len());
        for field in &plan.fields {
            let slot = match &field.default {
                Some(default) if !field.repr.derefs() => {
                    Some(self.const_value(&field.repr, default)?)
                }
                _ if field.repr.is_reference() => None,
                _ => inline_zero(&field.repr),
            };
            slots.insert(field.name.clone(), slot);
        }
        Ok(StructValue::new(plan.name.clone(), slots))
    }

    /// [`Codec::new_struct`] for a named definition.
    pub fn instantiate(&self, ty: &TypeRef) -> Result<StructValue> {
        self.new_struct(self.plan(ty)?)
    }

    /// `IsSetF()`. Fields without a presence method are always set.
    pub fn is_set(&self, plan: &StructPlan, value: &StructValue, field: &str) -> Result<bool> {
        let field = plan.field(field).ok_or_else(|| RuntimeError::UnknownField {
            struct_name: plan.go_name.clone(),
            field: field.to_owned(),
        })?;
        self.field_is_set(field, value)
    }

    fn field_is_set(&self, field: &FieldPlan, value: &StructValue) -> Result<bool> {
        let slot = value.slot(&field.name).and_then(Option::as_ref);
        Ok(match field.presence {
            Presence::Always => true,
            Presence::NotNil => slot.is_some(),
            Presence::NotDefault => {
                let Some(default) = &field.default else {
                    return Ok(slot.is_some());
                };
                let default = self.const_value(&field.repr, default)?;
                match slot {
                    Some(current) => *current != default,
                    None => inline_zero(&field.repr).as_ref() != Some(&default),
                }
            }
        })
    }

    /// `CountSetFieldsT()`: set members among the non-required fields.
    pub fn count_set_fields(&self, plan: &StructPlan, value: &StructValue) -> Result<usize> {
        let mut count = 0;
        for field in plan.settable() {
            if self.field_is_set(field, value)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// `Interface()`: the first set member, in declaration order.
    pub fn interface<'v>(
        &self,
        plan: &StructPlan,
        value: &'v StructValue,
    ) -> Result<Option<&'v Value>> {
        for field in plan.settable() {
            if self.field_is_set(field, value)? {
                return Ok(value.get(&field.name));
            }
        }
        Ok(None)
    }

    pub fn encode<P: Protocol + ?Sized>(
        &self,
        plan: &StructPlan,
        value: &StructValue,
        proto: &mut P,
    ) -> Result<()> {
        self.encode_struct(plan, value, proto, 0)
    }

    pub fn decode<P: Protocol + ?Sized>(
        &self,
        plan: &StructPlan,
        proto: &mut P,
    ) -> Result<StructValue> {
        self.decode_struct(plan, proto, 0)
    }

    /// Encode into a fresh binary buffer.
    pub fn to_bytes(&self, plan: &StructPlan, value: &StructValue) -> Result<Vec<u8>> {
        let mut proto = BinaryProtocol::new();
        self.encode(plan, value, &mut proto)?;
        Ok(proto.into_bytes())
    }

    pub fn from_bytes(&self, plan: &StructPlan, bytes: Vec<u8>) -> Result<StructValue> {
        self.decode(plan, &mut BinaryProtocol::from_bytes(bytes))
    }

    fn encode_struct<P: Protocol + ?Sized>(
        &self,
        plan: &StructPlan,
        value: &StructValue,
        proto: &mut P,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(RuntimeError::DepthLimit(MAX_DEPTH));
        }
        let name = &plan.go_name;
        if plan.is_union && plan.settable().next().is_some() {
            let count = self.count_set_fields(plan, value)?;
            if count != 1 {
                return Err(RuntimeError::UnionArity {
                    struct_name: name.clone(),
                    count,
                });
            }
        }

        proto
            .write_struct_begin(&plan.idl_name)
            .map_err(|e| e.prepend(format!("*{name} write struct begin error: ")))?;
        for field in plan.sorted() {
            if field.is_guarded() && !self.field_is_set(field, value)? {
                continue;
            }
            self.encode_field(plan, field, value, proto, depth)?;
        }
        proto
            .write_field_stop()
            .map_err(|e| e.prepend("write field stop error: "))?;
        proto
            .write_struct_end()
            .map_err(|e| e.prepend("write struct stop error: "))
    }

    fn encode_field<P: Protocol + ?Sized>(
        &self,
        plan: &StructPlan,
        field: &FieldPlan,
        value: &StructValue,
        proto: &mut P,
        depth: usize,
    ) -> Result<()> {
        let site = Site::of(plan, field);
        let header = format!("*{} write field begin error {}:{}: ", site.owner, site.id, site.name);
        proto
            .write_field_begin(&field.name, field.repr.wire, field.id)
            .map_err(|e| e.prepend(header))?;

        // Unguarded nil slots go out as their zero value.
        let zero;
        let current = match value.slot(&field.name).and_then(Option::as_ref) {
            Some(current) => current,
            None => {
                zero = zero_value(&field.repr).ok_or_else(|| {
                    RuntimeError::InvalidData(format!("nil struct in field {}", field.name))
                        .prepend(site.write_error())
                })?;
                &zero
            }
        };
        self.write_value(&field.repr, current, site, proto, depth)?;

        proto.write_field_end().map_err(|e| {
            e.prepend(format!("*{} write field end error {}:{}: ", site.owner, site.id, site.name))
        })
    }

    fn write_value<P: Protocol + ?Sized>(
        &self,
        repr: &TypeRepr,
        value: &Value,
        site: Site<'_>,
        proto: &mut P,
        depth: usize,
    ) -> Result<()> {
        let scalar = |result: Result<()>| result.map_err(|e| e.prepend(site.write_error()));
        let id = site.id;

        match (&repr.kind, value) {
            (ReprKind::Base(BaseType::Bool), Value::Bool(v)) => scalar(proto.write_bool(*v)),
            (ReprKind::Base(BaseType::Byte), Value::Byte(v)) => scalar(proto.write_byte(*v)),
            (ReprKind::Base(BaseType::I16), Value::I16(v)) => scalar(proto.write_i16(*v)),
            (ReprKind::Base(BaseType::I32), Value::I32(v)) => scalar(proto.write_i32(*v)),
            (ReprKind::Base(BaseType::I64), Value::I64(v)) => scalar(proto.write_i64(*v)),
            (ReprKind::Base(BaseType::Double), Value::Double(v)) => scalar(proto.write_double(*v)),
            (ReprKind::Base(BaseType::String), Value::String(v)) => scalar(proto.write_string(v)),
            (ReprKind::Base(BaseType::Binary), Value::Binary(v)) => scalar(proto.write_binary(v)),
            (ReprKind::Enum(_), Value::Enum(v)) => scalar(proto.write_i32(*v)),
            (ReprKind::Struct(ty), Value::Struct(inner)) => {
                let plan = self.plan(ty)?;
                self.encode_struct(plan, inner, proto, depth + 1)
                    .map_err(|e| e.prepend(format!("*{} error writing struct: ", plan.go_name)))
            }
            (ReprKind::Map { key, value: val }, Value::Map(pairs)) => {
                proto
                    .write_map_begin(key.wire, val.wire, pairs.len())
                    .map_err(|e| e.prepend(format!("error writing field {id} map begin: ")))?;
                for (k, v) in pairs {
                    self.write_value(key, k, site, proto, depth)?;
                    self.write_value(val, v, site, proto, depth)?;
                }
                proto
                    .write_map_end()
                    .map_err(|e| e.prepend(format!("error writing field {id} map end: ")))
            }
            (ReprKind::Set(elem), Value::Set(items)) => {
                proto
                    .write_set_begin(elem.wire, items.len())
                    .map_err(|e| e.prepend(format!("error writing field {id} set begin: ")))?;
                for item in items {
                    self.write_value(elem, item, site, proto, depth)?;
                }
                proto
                    .write_set_end()
                    .map_err(|e| e.prepend(format!("error writing field {id} set end: ")))
            }
            (ReprKind::List(elem), Value::List(items)) => {
                proto
                    .write_list_begin(elem.wire, items.len())
                    .map_err(|e| e.prepend(format!("error writing field {id} list begin: ")))?;
                for item in items {
                    self.write_value(elem, item, site, proto, depth)?;
                }
                proto
                    .write_list_end()
                    .map_err(|e| e.prepend(format!("error writing field {id} list end: ")))
            }
            _ => Err(RuntimeError::TypeMismatch {
                expected: repr.go_type.clone(),
                found: value.kind().to_owned(),
            }),
        }
    }

    fn decode_struct<P: Protocol + ?Sized>(
        &self,
        plan: &StructPlan,
        proto: &mut P,
        depth: usize,
    ) -> Result<StructValue> {
        if depth > MAX_DEPTH {
            return Err(RuntimeError::DepthLimit(MAX_DEPTH));
        }
        let name = &plan.go_name;
        let mut value = self.new_struct(plan)?;
        proto
            .read_struct_begin()
            .map_err(|e| e.prepend(format!("*{name} read error: ")))?;

        let mut seen = vec![false; plan.fields.len()];
        loop {
            let (wire, id) = proto
                .read_field_begin()
                .map_err(|e| e.prepend(format!("*{name} field read error: ")))?;
            if wire == WireType::Stop {
                break;
            }
            match plan.position_by_id(id) {
                Some(index) if plan.fields[index].repr.wire == wire => {
                    let field = &plan.fields[index];
                    let site = Site::of(plan, field);
                    let read = self.read_value(&field.repr, site, proto, depth)?;
                    value.set(&field.name, read);
                    seen[index] = true;
                }
                Some(index) => {
                    tracing::debug!(
                        struct_name = %name,
                        field = %plan.fields[index].name,
                        %wire,
                        "skipping field with unexpected wire type"
                    );
                    skip(proto, wire)?;
                }
                None => skip(proto, wire)?,
            }
            proto.read_field_end()?;
        }
        proto
            .read_struct_end()
            .map_err(|e| e.prepend(format!("*{name} read struct end error: ")))?;

        for (field, seen) in plan.fields.iter().zip(seen) {
            if field.is_required() && !seen {
                return Err(RuntimeError::RequiredFieldNotSet {
                    field: field.go_name.clone(),
                });
            }
        }
        Ok(value)
    }

    fn read_value<P: Protocol + ?Sized>(
        &self,
        repr: &TypeRepr,
        site: Site<'_>,
        proto: &mut P,
        depth: usize,
    ) -> Result<Value> {
        let id = site.id;
        let scalar = |e: RuntimeError| e.prepend(format!("error reading field {id}: "));

        Ok(match &repr.kind {
            ReprKind::Base(base) => match base {
                BaseType::Bool => Value::Bool(proto.read_bool().map_err(scalar)?),
                BaseType::Byte => Value::Byte(proto.read_byte().map_err(scalar)?),
                BaseType::I16 => Value::I16(proto.read_i16().map_err(scalar)?),
                BaseType::I32 => Value::I32(proto.read_i32().map_err(scalar)?),
                BaseType::I64 => Value::I64(proto.read_i64().map_err(scalar)?),
                BaseType::Double => Value::Double(proto.read_double().map_err(scalar)?),
                BaseType::String => Value::String(proto.read_string().map_err(scalar)?),
                BaseType::Binary => Value::Binary(proto.read_binary().map_err(scalar)?),
            },
            ReprKind::Enum(_) => Value::Enum(proto.read_i32().map_err(scalar)?),
            // Struct values carry the element type, not the field id.
            ReprKind::Struct(ty) => {
                let plan = self.plan(ty)?;
                let inner = self
                    .decode_struct(plan, proto, depth + 1)
                    .map_err(|e| e.prepend(format!("*{} error reading struct: ", plan.go_name)))?;
                Value::Struct(inner)
            }
            ReprKind::Map { key, value } => {
                let (_, _, size) = proto
                    .read_map_begin()
                    .map_err(|e| e.prepend(format!("error reading field {id} map begin: ")))?;
                let mut pairs: Vec<(Value, Value)> = Vec::new();
                for _ in 0..size {
                    let k = self.read_value(key, site, proto, depth)?;
                    let v = self.read_value(value, site, proto, depth)?;
                    match pairs.iter_mut().find(|(existing, _)| *existing == k) {
                        Some(entry) => entry.1 = v,
                        None => pairs.push((k, v)),
                    }
                }
                proto
                    .read_map_end()
                    .map_err(|e| e.prepend(format!("error reading field {id} map end: ")))?;
                Value::Map(pairs)
            }
            ReprKind::Set(elem) => {
                let (_, size) = proto
                    .read_set_begin()
                    .map_err(|e| e.prepend(format!("error reading field {id} set begin: ")))?;
                let mut items: Vec<Value> = Vec::new();
                for _ in 0..size {
                    let item = self.read_value(elem, site, proto, depth)?;
                    if !items.contains(&item) {
                        items.push(item);
                    }
                }
                proto
                    .read_set_end()
                    .map_err(|e| e.prepend(format!("error reading field {id} set end: ")))?;
                Value::Set(items)
            }
            ReprKind::List(elem) => {
                let (_, size) = proto
                    .read_list_begin()
                    .map_err(|e| e.prepend(format!("error reading field {id} list begin: ")))?;
                let mut items = Vec::new();
                for _ in 0..size {
                    items.push(self.read_value(elem, site, proto, depth)?);
                }
                proto
                    .read_list_end()
                    .map_err(|e| e.prepend(format!("error reading field {id} list end: ")))?;
                Value::List(items)
            }
        })
    }

    /// Runtime value of a declared constant.
    pub fn const_value(&self, repr: &TypeRepr, value: &ConstValue) -> Result<Value> {
        let mismatch = || RuntimeError::TypeMismatch {
            expected: repr.go_type.clone(),
            found: format!("{value:?}"),
        };
        let integer = || value.as_integer().ok_or_else(mismatch);

        Ok(match &repr.kind {
            ReprKind::Base(base) => match base {
                BaseType::Bool => Value::Bool(integer()? != 0),
                BaseType::Byte => Value::Byte(i8::try_from(integer()?).map_err(|_| mismatch())?),
                BaseType::I16 => Value::I16(i16::try_from(integer()?).map_err(|_| mismatch())?),
                BaseType::I32 => Value::I32(i32::try_from(integer()?).map_err(|_| mismatch())?),
                BaseType::I64 => Value::I64(integer()?),
                BaseType::Double => Value::Double(value.as_double().ok_or_else(mismatch)?),
                BaseType::String => Value::string(value.as_str().ok_or_else(mismatch)?),
                BaseType::Binary => {
                    Value::Binary(value.as_str().ok_or_else(mismatch)?.as_bytes().to_vec())
                }
            },
            ReprKind::Enum(_) => Value::Enum(i32::try_from(integer()?).map_err(|_| mismatch())?),
            ReprKind::Struct(ty) => {
                let plan = self.plan(ty)?;
                let ConstValue::Map(entries) = value else {
                    return Err(mismatch());
                };
                let mut out = self.new_struct(plan)?;
                for (key, v) in entries {
                    let key = key.as_str().ok_or_else(mismatch)?;
                    let field = plan.field(key).ok_or_else(|| RuntimeError::UnknownField {
                        struct_name: plan.go_name.clone(),
                        field: key.to_owned(),
                    })?;
                    out.set(key, self.const_value(&field.repr, v)?);
                }
                Value::Struct(out)
            }
            ReprKind::Map { key, value: val } => {
                let ConstValue::Map(entries) = value else {
                    return Err(mismatch());
                };
                let pairs = entries
                    .iter()
                    .map(|(k, v)| Ok((self.const_value(key, k)?, self.const_value(val, v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Value::Map(pairs)
            }
            ReprKind::Set(elem) => {
                let ConstValue::List(items) = value else {
                    return Err(mismatch());
                };
                let mut out: Vec<Value> = Vec::new();
                for item in items {
                    let item = self.const_value(elem, item)?;
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
                Value::Set(out)
            }
            ReprKind::List(elem) => {
                let ConstValue::List(items) = value else {
                    return Err(mismatch());
                };
                let items = items
                    .iter()
                    .map(|item| self.const_value(elem, item))
                    .collect::<Result<Vec<_>>>()?;
                Value::List(items)
            }
        })
    }
}

/// Go zero value of an inline (non-pointer) field; `None` when that zero
/// value is nil.
fn inline_zero(repr: &TypeRepr) -> Option<Value> {
    match &repr.kind {
        ReprKind::Base(BaseType::Binary) => None,
        ReprKind::Base(_) | ReprKind::Enum(_) => zero_value(repr),
        _ => None,
    }
}

/// Value written for a nil slot. Structs have none.
fn zero_value(repr: &TypeRepr) -> Option<Value> {
    Some(match &repr.kind {
        ReprKind::Base(base) => match base {
            BaseType::Bool => Value::Bool(false),
            BaseType::Byte => Value::Byte(0),
            BaseType::I16 => Value::I16(0),
            BaseType::I32 => Value::I32(0),
            BaseType::I64 => Value::I64(0),
            BaseType::Double => Value::Double(0.0),
            BaseType::String => Value::String(String::new()),
            BaseType::Binary => Value::Binary(Vec::new()),
        },
        ReprKind::Enum(_) => Value::Enum(0),
        ReprKind::Struct(_) => return None,
        ReprKind::Map { .. } => Value::Map(Vec::new()),
        ReprKind::Set(_) => Value::Set(Vec::new()),
        ReprKind::List(_) => Value::List(Vec::new()),
    })
}
