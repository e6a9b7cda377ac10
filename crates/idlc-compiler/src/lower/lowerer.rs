//! Type lowering: IDL type + field context -> [`TypeRepr`].

use idlc_core::{BaseType, Field, ModelIndex, Program, Requiredness, Type, TypeRef, WireType};

use super::repr::{FieldContext, RefMode, ReprKind, TypeRepr, builtin_go_type};
use crate::naming::publicize;
use crate::package::package_name;
use crate::{Error, Result};

/// Legacy annotation forcing a field behind a pointer.
pub const BY_REFERENCE_ANNOTATION: &str = "cpp.ref";

/// Lowers types as seen from one program (which decides package qualifiers).
#[derive(Clone, Copy)]
pub struct Lowerer<'a> {
    index: &'a ModelIndex<'a>,
    program: &'a Program,
}

impl<'a> Lowerer<'a> {
    pub fn new(index: &'a ModelIndex<'a>, program: &'a Program) -> Self {
        Self { index, program }
    }

    pub fn index(&self) -> &'a ModelIndex<'a> {
        self.index
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Go name of a definition, qualified when it lives in another program.
    pub fn type_name(&self, reference: &TypeRef) -> Result<String> {
        let local = publicize(&reference.name);
        if reference.program == self.program.name {
            return Ok(local);
        }
        let owner = self.index.program(&reference.program)?;
        Ok(format!("{}.{}", package_name(owner), local))
    }

    pub fn lower_field(&self, field: &Field, requiredness: Requiredness) -> Result<TypeRepr> {
        if self.index.true_type(&field.ty)?.is_void() {
            return Err(Error::VoidType {
                context: format!("field `{}`", field.name),
            });
        }
        let ctx = FieldContext {
            requiredness,
            has_default: field.default.is_some(),
            by_reference: field
                .annotations
                .legacy
                .contains_key(BY_REFERENCE_ANNOTATION),
        };
        self.lower(&field.ty, ctx)
    }

    pub fn lower(&self, ty: &Type, ctx: FieldContext) -> Result<TypeRepr> {
        let mode = self.reference_mode(ty, ctx)?;
        let true_type = self.index.true_type(ty)?;

        let (kind, natural) = match true_type {
            Type::Void => {
                return Err(Error::VoidType {
                    context: "value".to_owned(),
                });
            }
            Type::Base(base) => (ReprKind::Base(*base), builtin_go_type(*base).to_owned()),
            Type::Enum(r) => {
                self.index.enumeration(r)?;
                (ReprKind::Enum(r.clone()), self.type_name(r)?)
            }
            Type::Struct(r) => {
                self.index.structure(r)?;
                (ReprKind::Struct(r.clone()), self.type_name(r)?)
            }
            Type::Map { key, value } => {
                let key = self.lower_key(key)?;
                let value = self.lower(value, FieldContext::ELEMENT)?;
                let go = format!(
                    "map[{}]{}",
                    key.declared_go_type(),
                    value.declared_go_type()
                );
                (
                    ReprKind::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                    go,
                )
            }
            Type::Set(elem) => {
                let elem = self.lower_key(elem)?;
                let go = format!("map[{}]bool", elem.declared_go_type());
                (ReprKind::Set(Box::new(elem)), go)
            }
            Type::List(elem) => {
                let elem = self.lower(elem, FieldContext::ELEMENT)?;
                let go = format!("[]{}", elem.declared_go_type());
                (ReprKind::List(Box::new(elem)), go)
            }
            Type::Typedef(_) => {
                return Err(Error::InvalidType {
                    context: "lower".to_owned(),
                    ty: true_type.describe(),
                });
            }
        };

        let go_type = match ty {
            Type::Typedef(r) => self.type_name(r)?,
            _ => natural,
        };
        let wire = WireType::of(true_type).ok_or_else(|| Error::InvalidType {
            context: "wire type".to_owned(),
            ty: true_type.describe(),
        })?;

        Ok(TypeRepr {
            kind,
            mode,
            go_type,
            wire,
        })
    }

    /// Map keys and set elements: never containers; binary becomes `string`.
    pub fn lower_key(&self, ty: &Type) -> Result<TypeRepr> {
        let true_type = self.index.true_type(ty)?;
        if true_type.is_container() {
            return Err(Error::ContainerKey {
                context: "map/set key".to_owned(),
                key: ty.describe(),
            });
        }
        let mut repr = self.lower(ty, FieldContext::ELEMENT)?;
        if repr.is_binary() {
            repr.kind = ReprKind::Base(BaseType::String);
            repr.go_type = builtin_go_type(BaseType::String).to_owned();
        }
        Ok(repr)
    }

    /// Value-or-reference decision, first matching rule wins.
    pub fn reference_mode(&self, ty: &Type, ctx: FieldContext) -> Result<RefMode> {
        if ctx.by_reference {
            return Ok(RefMode::Reference);
        }
        let true_type = self.index.true_type(ty)?;
        if matches!(true_type, Type::Struct(_)) {
            return Ok(RefMode::Reference);
        }
        if ctx.requiredness != Requiredness::Optional {
            return Ok(RefMode::Value);
        }
        if self.index.is_forward(ty)? {
            return Ok(RefMode::Reference);
        }
        Ok(match true_type {
            Type::Base(BaseType::Binary) => RefMode::Value,
            Type::Base(_) | Type::Enum(_) if ctx.has_default => RefMode::Value,
            Type::Base(_) | Type::Enum(_) => RefMode::Reference,
            _ => RefMode::Value,
        })
    }
}
