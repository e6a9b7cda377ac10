use idlc_core::{BaseType, ConstValue, Requiredness, Struct, Type};

use super::go_string;
use crate::lower::{FieldContext, Lowerer, ReprKind, TypeRepr, builtin_go_type};
use crate::naming::publicize;
use crate::{Error, Result};

/// Rendered constant: an expression plus statements to run after it has
/// been assigned (composite struct fields bound through temporaries).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Literal {
    pub expr: String,
    pub after: Vec<String>,
}

pub struct ConstRenderer<'a> {
    lowerer: Lowerer<'a>,
    next_temp: usize,
}

impl<'a> ConstRenderer<'a> {
    pub fn new(lowerer: Lowerer<'a>) -> Self {
        Self {
            lowerer,
            next_temp: 0,
        }
    }

    /// Inline Go expression for `value` read as `ty`.
    pub fn render(&self, ty: &Type, value: &ConstValue) -> Result<String> {
        let repr = self.lowerer.lower(ty, FieldContext::ELEMENT)?;
        self.render_repr(ty, &repr, value)
    }

    /// Render a constant assigned to `binding`.
    ///
    /// Struct fields of base or enum type stay in the literal; composite
    /// fields are bound to a temporary and assigned to `binding.Field`.
    pub fn render_bound(
        &mut self,
        binding: &str,
        ty: &Type,
        value: &ConstValue,
    ) -> Result<Literal> {
        let repr = self.lowerer.lower(ty, FieldContext::ELEMENT)?;
        let ReprKind::Struct(reference) = &repr.kind else {
            return Ok(Literal {
                expr: self.render_repr(ty, &repr, value)?,
                after: Vec::new(),
            });
        };

        let s = self.lowerer.index().structure(reference)?;
        let mut inline = Vec::new();
        let mut after = Vec::new();
        for (key, v) in struct_entries(ty, value)? {
            let (field_ty, field_repr) = self.struct_field(s, key)?;
            let go_name = publicize(key);
            if is_scalar(&field_repr) {
                let literal = self.render_repr(field_ty, &field_repr, v)?;
                inline.push(format!("{go_name}: {}", box_scalar(&field_repr, literal)));
                continue;
            }
            let temp = self.temp();
            let literal = self.render_repr(field_ty, &field_repr, v)?;
            after.push(format!("{temp} := {literal}"));
            let target = if field_repr.derefs() {
                format!("&{temp}")
            } else {
                temp
            };
            after.push(format!("{binding}.{go_name} = {target}"));
        }

        Ok(Literal {
            expr: format!("&{}{{{}}}", repr.go_type, inline.join(", ")),
            after,
        })
    }

    fn temp(&mut self) -> String {
        let name = format!("tmp{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    fn render_repr(&self, ty: &Type, repr: &TypeRepr, value: &ConstValue) -> Result<String> {
        let invalid = || Error::InvalidConstValue {
            ty: ty.describe(),
            value: format!("{value:?}"),
        };

        match &repr.kind {
            ReprKind::Base(base) => render_base(*base, value).ok_or_else(invalid),
            ReprKind::Enum(_) => value.as_integer().map(|i| i.to_string()).ok_or_else(invalid),
            ReprKind::Struct(reference) => {
                let s = self.lowerer.index().structure(reference)?;
                let mut entries = Vec::new();
                for (key, v) in struct_entries(ty, value)? {
                    let (field_ty, field_repr) = self.struct_field(s, key)?;
                    let literal = self.render_repr(field_ty, &field_repr, v)?;
                    let literal = if is_scalar(&field_repr) {
                        box_scalar(&field_repr, literal)
                    } else {
                        literal
                    };
                    entries.push(format!("{}: {literal}", publicize(key)));
                }
                Ok(format!("&{}{{{}}}", repr.go_type, entries.join(", ")))
            }
            ReprKind::Map { key, value: val } => {
                let (key_ty, val_ty) = match self.lowerer.index().true_type(ty)? {
                    Type::Map { key, value } => (key.as_ref(), value.as_ref()),
                    _ => return Err(invalid()),
                };
                let ConstValue::Map(pairs) = value else {
                    return Err(invalid());
                };
                let entries = pairs
                    .iter()
                    .map(|(k, v)| {
                        Ok(format!(
                            "{}: {}",
                            self.render_repr(key_ty, key, k)?,
                            self.render_repr(val_ty, val, v)?
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{}{{{}}}", repr.go_type, entries.join(", ")))
            }
            ReprKind::Set(elem) | ReprKind::List(elem) => {
                let elem_ty = match self.lowerer.index().true_type(ty)? {
                    Type::Set(e) | Type::List(e) => e.as_ref(),
                    _ => return Err(invalid()),
                };
                let ConstValue::List(items) = value else {
                    return Err(invalid());
                };
                let is_set = matches!(repr.kind, ReprKind::Set(_));
                let entries = items
                    .iter()
                    .map(|item| {
                        let literal = self.render_repr(elem_ty, elem, item)?;
                        Ok(if is_set {
                            format!("{literal}: true")
                        } else {
                            literal
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{}{{{}}}", repr.go_type, entries.join(", ")))
            }
        }
    }

    /// Declared type and lowered representation of the member named `key`.
    fn struct_field<'s>(&self, s: &'s Struct, key: &str) -> Result<(&'s Type, TypeRepr)> {
        let field = s
            .fields
            .iter()
            .find(|f| f.name == key)
            .ok_or_else(|| Error::UnknownConstField {
                struct_name: s.name.clone(),
                field: key.to_owned(),
            })?;
        let requiredness = if s.is_union {
            Requiredness::Optional
        } else {
            field.requiredness
        };
        Ok((&field.ty, self.lowerer.lower_field(field, requiredness)?))
    }
}

/// Struct literal entries: a map keyed by member name.
fn struct_entries<'v>(ty: &Type, value: &'v ConstValue) -> Result<Vec<(&'v str, &'v ConstValue)>> {
    let invalid = || Error::InvalidConstValue {
        ty: ty.describe(),
        value: format!("{value:?}"),
    };
    let ConstValue::Map(pairs) = value else {
        return Err(invalid());
    };
    pairs
        .iter()
        .map(|(k, v)| k.as_str().map(|k| (k, v)).ok_or_else(invalid))
        .collect()
}

fn is_scalar(repr: &TypeRepr) -> bool {
    matches!(repr.kind, ReprKind::Base(_) | ReprKind::Enum(_))
}

fn render_base(base: BaseType, value: &ConstValue) -> Option<String> {
    Some(match base {
        BaseType::String => go_string(value.as_str()?),
        BaseType::Binary => format!("[]byte({})", go_string(value.as_str()?)),
        BaseType::Bool => (value.as_integer()? != 0).to_string(),
        BaseType::Byte | BaseType::I16 | BaseType::I32 | BaseType::I64 => {
            value.as_integer()?.to_string()
        }
        BaseType::Double => match value {
            ConstValue::Integer(i) => i.to_string(),
            // Go has no literal for NaN or the infinities.
            ConstValue::Double(d) if d.is_finite() => format!("{d:?}"),
            _ => return None,
        },
    })
}

/// Wrap a scalar literal for a pointer-typed field. Builtins use the
/// runtime's boxing helpers, named types their generated `Ptr` function.
fn box_scalar(repr: &TypeRepr, literal: String) -> String {
    if !repr.derefs() {
        return literal;
    }
    let ReprKind::Base(base) = &repr.kind else {
        return format!("{}Ptr({literal})", repr.go_type);
    };
    if repr.go_type != builtin_go_type(*base) {
        return format!("{}Ptr({literal})", repr.go_type);
    }
    let helper = match base {
        BaseType::String => "StringPtr",
        BaseType::Binary => "ByteSlicePtr",
        BaseType::Bool => "BoolPtr",
        BaseType::Byte => "Int8Ptr",
        BaseType::I16 => "Int16Ptr",
        BaseType::I32 => "Int32Ptr",
        BaseType::I64 => "Int64Ptr",
        BaseType::Double => "Float64Ptr",
    };
    format!("thrift.{helper}({literal})")
}
