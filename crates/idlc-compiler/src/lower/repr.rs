//! Target representation descriptors.

use idlc_core::{BaseType, Requiredness, TypeRef, WireType};

/// How a value is held by its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefMode {
    /// Stored inline; absence is only observable through defaults.
    Value,
    /// Stored behind a pointer; `nil` means unset.
    Reference,
}

/// Lowered shape of a type, resolved through typedefs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReprKind {
    Base(BaseType),
    Enum(TypeRef),
    Struct(TypeRef),
    Map {
        key: Box<TypeRepr>,
        value: Box<TypeRepr>,
    },
    Set(Box<TypeRepr>),
    List(Box<TypeRepr>),
}

/// Lowered type in a given field context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRepr {
    pub kind: ReprKind,
    pub mode: RefMode,
    /// Go value type without the pointer marker (`int32`, `Color`,
    /// `map[string]*Item`, `shared.Item`).
    pub go_type: String,
    pub wire: WireType,
}

impl TypeRepr {
    pub fn is_reference(&self) -> bool {
        self.mode == RefMode::Reference
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, ReprKind::Struct(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            ReprKind::Map { .. } | ReprKind::Set(_) | ReprKind::List(_)
        )
    }

    pub fn base(&self) -> Option<BaseType> {
        match self.kind {
            ReprKind::Base(base) => Some(base),
            _ => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.base() == Some(BaseType::Binary)
    }

    /// Type as spelled in a struct field or variable declaration.
    pub fn declared_go_type(&self) -> String {
        match self.mode {
            RefMode::Reference => format!("*{}", self.go_type),
            RefMode::Value => self.go_type.clone(),
        }
    }

    /// Type handed out by getters and taken by setters.
    pub fn accessor_go_type(&self) -> String {
        if self.is_struct() {
            self.declared_go_type()
        } else {
            self.go_type.clone()
        }
    }

    /// Whether reads/writes go through `*ptr` and assignments take `&v`.
    pub fn derefs(&self) -> bool {
        self.is_reference() && !self.is_struct()
    }

    /// Builtin Go type produced by the protocol reader, when the declared
    /// type needs a conversion from it.
    pub fn conversion(&self) -> Option<&str> {
        match &self.kind {
            ReprKind::Enum(_) => Some(&self.go_type),
            ReprKind::Base(BaseType::Byte) => Some(&self.go_type),
            ReprKind::Base(base) if self.go_type != builtin_go_type(*base) => Some(&self.go_type),
            _ => None,
        }
    }
}

/// Go spelling of a base type.
pub fn builtin_go_type(base: BaseType) -> &'static str {
    match base {
        BaseType::Bool => "bool",
        BaseType::Byte => "int8",
        BaseType::I16 => "int16",
        BaseType::I32 => "int32",
        BaseType::I64 => "int64",
        BaseType::Double => "float64",
        BaseType::String => "string",
        BaseType::Binary => "[]byte",
    }
}

/// Field attributes that influence the reference-mode decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldContext {
    pub requiredness: Requiredness,
    pub has_default: bool,
    /// Explicit by-reference annotation on the field.
    pub by_reference: bool,
}

impl FieldContext {
    /// Container elements, keys, arguments and constants.
    pub const ELEMENT: FieldContext = FieldContext {
        requiredness: Requiredness::Default,
        has_default: false,
        by_reference: false,
    };

    pub fn optional() -> Self {
        Self {
            requiredness: Requiredness::Optional,
            ..Self::ELEMENT
        }
    }
}
