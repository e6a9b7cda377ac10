//! Resolved IDL model.
//!
//! Produced by the front end after parsing and type checking; read-only for
//! code generation. Every collection keeps declaration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Base (scalar) type kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    /// `string` carrying raw bytes.
    Binary,
}

impl BaseType {
    pub fn is_binary(self) -> bool {
        matches!(self, BaseType::Binary)
    }

    pub fn is_string_like(self) -> bool {
        matches!(self, BaseType::String | BaseType::Binary)
    }
}

/// Reference to a named definition, qualified by its owning program.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TypeRef {
    pub program: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(program: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.program, self.name)
    }
}

/// Declared type of a field, constant, argument or return value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Void,
    Base(BaseType),
    Enum(TypeRef),
    Struct(TypeRef),
    Typedef(TypeRef),
    Map { key: Box<Type>, value: Box<Type> },
    Set(Box<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn bool() -> Self {
        Type::Base(BaseType::Bool)
    }

    pub fn byte() -> Self {
        Type::Base(BaseType::Byte)
    }

    pub fn i16() -> Self {
        Type::Base(BaseType::I16)
    }

    pub fn i32() -> Self {
        Type::Base(BaseType::I32)
    }

    pub fn i64() -> Self {
        Type::Base(BaseType::I64)
    }

    pub fn double() -> Self {
        Type::Base(BaseType::Double)
    }

    pub fn string() -> Self {
        Type::Base(BaseType::String)
    }

    pub fn binary() -> Self {
        Type::Base(BaseType::Binary)
    }

    pub fn structure(program: &str, name: &str) -> Self {
        Type::Struct(TypeRef::new(program, name))
    }

    pub fn enumeration(program: &str, name: &str) -> Self {
        Type::Enum(TypeRef::new(program, name))
    }

    pub fn typedef(program: &str, name: &str) -> Self {
        Type::Typedef(TypeRef::new(program, name))
    }

    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    pub fn set(elem: Type) -> Self {
        Type::Set(Box::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Type::Map { .. } | Type::Set(_) | Type::List(_))
    }

    /// Human-readable IDL spelling, used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Type::Void => "void".to_owned(),
            Type::Base(b) => match b {
                BaseType::Bool => "bool",
                BaseType::Byte => "byte",
                BaseType::I16 => "i16",
                BaseType::I32 => "i32",
                BaseType::I64 => "i64",
                BaseType::Double => "double",
                BaseType::String => "string",
                BaseType::Binary => "binary",
            }
            .to_owned(),
            Type::Enum(r) | Type::Struct(r) | Type::Typedef(r) => r.to_string(),
            Type::Map { key, value } => format!("map<{},{}>", key.describe(), value.describe()),
            Type::Set(elem) => format!("set<{}>", elem.describe()),
            Type::List(elem) => format!("list<{}>", elem.describe()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requiredness {
    Required,
    Optional,
    /// Present on the wire with an implicit value when unset.
    #[default]
    Default,
}

/// Annotation bag attached to definitions and fields.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Annotations {
    #[serde(default)]
    pub legacy: BTreeMap<String, String>,
    #[serde(default)]
    pub structured: Vec<StructuredAnnotation>,
}

impl Annotations {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.legacy.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.legacy.is_empty() && self.structured.is_empty()
    }
}

/// Annotation expressed as a struct literal (`@Foo{...}`).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StructuredAnnotation {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub value: ConstValue,
}

/// Literal value. Interpretation depends on the type it is paired with.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Integer(i64),
    Double(f64),
    String(String),
    List(Vec<ConstValue>),
    /// Key/value pairs in source order. Struct literals use string keys.
    Map(Vec<(ConstValue, ConstValue)>),
}

impl ConstValue {
    pub fn string(s: impl Into<String>) -> Self {
        ConstValue::String(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConstValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floating point.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ConstValue::Integer(i) => Some(*i as f64),
            ConstValue::Double(d) => Some(*d),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Field {
    pub id: i16,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub requiredness: Requiredness,
    #[serde(default)]
    pub default: Option<ConstValue>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Field {
    pub fn new(id: i16, name: impl Into<String>, ty: Type) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            requiredness: Requiredness::Default,
            default: None,
            annotations: Annotations::default(),
            doc: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.requiredness = Requiredness::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.requiredness = Requiredness::Optional;
        self
    }

    pub fn with_default(mut self, value: ConstValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations
            .legacy
            .insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_owned());
        self
    }
}

/// Struct, union or exception.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Struct {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub is_union: bool,
    #[serde(default)]
    pub is_exception: bool,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            is_union: false,
            is_exception: false,
            annotations: Annotations::default(),
            doc: None,
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn union(mut self) -> Self {
        self.is_union = true;
        self
    }

    pub fn exception(mut self) -> Self {
        self.is_exception = true;
        self
    }

    /// Fields ordered by wire id. Ties keep declaration order.
    pub fn sorted_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.id);
        fields
    }

    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Enum {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            doc: None,
        }
    }

    pub fn value(mut self, name: &str, value: Option<i32>) -> Self {
        self.values.push(EnumValue {
            name: name.to_owned(),
            value,
            doc: None,
        });
        self
    }

    /// Values with implicit ones filled in: previous value + 1, starting at 0.
    pub fn resolved_values(&self) -> Vec<(&str, i32)> {
        let mut next = 0i32;
        self.values
            .iter()
            .map(|v| {
                let value = v.value.unwrap_or(next);
                next = value.wrapping_add(1);
                (v.name.as_str(), value)
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Typedef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    /// Declared ahead of its target (self-referential definitions).
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Const {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub value: ConstValue,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Function {
    pub name: String,
    pub returns: Type,
    #[serde(default)]
    pub oneway: bool,
    #[serde(default)]
    pub args: Vec<Field>,
    #[serde(default)]
    pub exceptions: Vec<Field>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub sink: bool,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>, returns: Type) -> Self {
        Self {
            name: name.into(),
            returns,
            oneway: false,
            args: Vec::new(),
            exceptions: Vec::new(),
            stream: false,
            sink: false,
            annotations: Annotations::default(),
            doc: None,
        }
    }

    pub fn arg(mut self, field: Field) -> Self {
        self.args.push(field);
        self
    }

    pub fn throws(mut self, field: Field) -> Self {
        self.exceptions.push(field);
        self
    }

    pub fn oneway(mut self) -> Self {
        self.oneway = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub extends: Option<TypeRef>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            functions: Vec::new(),
            annotations: Annotations::default(),
            doc: None,
        }
    }

    pub fn extends(mut self, base: TypeRef) -> Self {
        self.extends = Some(base);
        self
    }

    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn function_named(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// One compiled IDL file with its transitive includes.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Program {
    pub name: String,
    /// Target language -> namespace (`"go"`, `"*"`, ...).
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    #[serde(default)]
    pub includes: Vec<Program>,
    /// Lives in the standard IDL library shipped with the runtime.
    #[serde(default)]
    pub std_path: bool,
    #[serde(default)]
    pub typedefs: Vec<Typedef>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub structs: Vec<Struct>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub consts: Vec<Const>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn namespace(&self, language: &str) -> Option<&str> {
        self.namespaces.get(language).map(String::as_str)
    }

    pub fn with_namespace(mut self, language: &str, namespace: &str) -> Self {
        self.namespaces
            .insert(language.to_owned(), namespace.to_owned());
        self
    }

    /// Reference to a definition owned by this program.
    pub fn type_ref(&self, name: &str) -> TypeRef {
        TypeRef::new(self.name.clone(), name)
    }
}
