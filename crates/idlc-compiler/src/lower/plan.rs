//! Codec plans: the lowered, target-ready description of structs, enums
//! and services. Both the Go emitter and the runtime interpreter consume
//! these, so wire behavior is decided exactly once.

use std::collections::BTreeSet;
use std::fmt;

use idlc_core::{
    Annotations, ConstValue, Enum, Field, Function, Requiredness, Service, Struct, Type, TypeRef,
};

use super::Lowerer;
use super::repr::{FieldContext, TypeRepr};
use crate::naming::{helper_struct_name, publicize};
use crate::{Error, Result, Warning};

/// Rendering of an enum value without a matching constant.
pub const ENUM_UNSET: &str = "<UNSET>";

/// How an `IsSet` check decides presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Inline non-optional value; always written, no `IsSet` method.
    Always,
    /// Pointer, container or default-less binary: set when non-nil.
    NotNil,
    /// Inline value with a default: set when it differs from the default.
    NotDefault,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldPlan {
    pub id: i16,
    pub name: String,
    pub go_name: String,
    /// Declared type, before typedef resolution.
    pub ty: Type,
    /// Effective requiredness (unions force OPTIONAL).
    pub requiredness: Requiredness,
    pub repr: TypeRepr,
    pub default: Option<ConstValue>,
    pub presence: Presence,
    pub annotations: Annotations,
    pub doc: Option<String>,
}

impl FieldPlan {
    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }

    pub fn is_optional(&self) -> bool {
        self.requiredness == Requiredness::Optional
    }

    pub fn has_isset(&self) -> bool {
        self.presence != Presence::Always
    }

    /// Written only when present.
    pub fn is_guarded(&self) -> bool {
        self.has_isset() && !self.is_required()
    }

    /// Suffix of the per-field codec methods (`ReadField3`, `ReadField_3`).
    pub fn method_suffix(&self) -> String {
        if self.id < 0 {
            format!("_{}", -i32::from(self.id))
        } else {
            self.id.to_string()
        }
    }
}

/// Run of field ids no field uses, between two used ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdGap {
    /// Index (in declaration order) of the field following the gap.
    pub before: usize,
    pub first: i32,
    pub last: i32,
}

impl fmt::Display for IdGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "unused field # {}", self.first)
        } else {
            write!(f, "unused fields # {} to {}", self.first, self.last)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructPlan {
    pub name: TypeRef,
    /// Name written to `WriteStructBegin` and the metadata sidecar.
    pub idl_name: String,
    pub go_name: String,
    pub is_union: bool,
    pub is_exception: bool,
    /// Declaration order.
    pub fields: Vec<FieldPlan>,
    /// Indices into `fields`, sorted by id.
    pub wire_order: Vec<usize>,
    pub gaps: Vec<IdGap>,
    pub annotations: Annotations,
    pub doc: Option<String>,
}

impl StructPlan {
    pub fn sorted(&self) -> impl Iterator<Item = &FieldPlan> + '_ {
        self.wire_order.iter().map(|&i| &self.fields[i])
    }

    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn position_by_id(&self, id: i16) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn gap_before(&self, index: usize) -> Option<&IdGap> {
        self.gaps.iter().find(|g| g.before == index)
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldPlan> + '_ {
        self.fields.iter().filter(|f| f.is_required())
    }

    /// Fields counted by the union arity check.
    pub fn settable(&self) -> impl Iterator<Item = &FieldPlan> + '_ {
        self.fields
            .iter()
            .filter(|f| !f.is_required() && f.has_isset())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: String,
    /// Go constant, also the string rendering (`Color_BLUE`).
    pub go_name: String,
    pub value: i32,
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumPlan {
    pub name: TypeRef,
    pub go_name: String,
    pub values: Vec<EnumEntry>,
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("not a valid {enum_name} string")]
pub struct EnumParseError {
    pub enum_name: String,
}

impl EnumPlan {
    /// Matches the generated `String()`: first constant with this value.
    pub fn to_display(&self, value: i64) -> &str {
        self.values
            .iter()
            .find(|e| i64::from(e.value) == value)
            .map_or(ENUM_UNSET, |e| e.go_name.as_str())
    }

    /// Matches the generated `<Enum>FromString`.
    pub fn from_display(&self, s: &str) -> std::result::Result<i32, EnumParseError> {
        self.values
            .iter()
            .find(|e| e.go_name == s)
            .map(|e| e.value)
            .ok_or_else(|| EnumParseError {
                enum_name: self.go_name.clone(),
            })
    }

    /// Entries whose value was not seen before (switch cases must be unique).
    pub fn distinct(&self) -> impl Iterator<Item = &EnumEntry> + '_ {
        let mut seen = BTreeSet::new();
        self.values.iter().filter(move |e| seen.insert(e.value))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionPlan {
    pub name: String,
    pub go_name: String,
    pub oneway: bool,
    /// Go return type, `None` for void.
    pub returns: Option<TypeRepr>,
    pub args: StructPlan,
    /// Absent for oneway functions.
    pub result: Option<StructPlan>,
    pub annotations: Annotations,
    pub doc: Option<String>,
}

/// Field name of the return value in result structs.
pub const SUCCESS_FIELD: &str = "success";

impl FunctionPlan {
    pub fn success(&self) -> Option<&FieldPlan> {
        if self.returns.is_none() {
            return None;
        }
        self.result.as_ref()?.fields.first()
    }

    /// Declared exceptions, in declaration order.
    pub fn exceptions(&self) -> impl Iterator<Item = &FieldPlan> + '_ {
        let skip = usize::from(self.returns.is_some());
        self.result
            .iter()
            .flat_map(move |r| r.fields.iter().skip(skip))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServicePlan {
    pub name: TypeRef,
    pub go_name: String,
    pub extends: Option<TypeRef>,
    pub functions: Vec<FunctionPlan>,
    pub annotations: Annotations,
    pub doc: Option<String>,
}

impl ServicePlan {
    pub fn function(&self, name: &str) -> Option<&FunctionPlan> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl Lowerer<'_> {
    pub fn plan_struct(&self, s: &Struct) -> Result<StructPlan> {
        self.plan_struct_as(s, self.program().type_ref(&s.name), publicize(&s.name))
    }

    fn plan_struct_as(&self, s: &Struct, name: TypeRef, go_name: String) -> Result<StructPlan> {
        let mut seen = BTreeSet::new();
        for field in &s.fields {
            if !seen.insert(field.id) {
                return Err(Error::DuplicateFieldId {
                    struct_name: s.name.clone(),
                    id: field.id,
                });
            }
        }

        let fields = s
            .fields
            .iter()
            .map(|f| self.plan_field(f, s.is_union))
            .collect::<Result<Vec<_>>>()?;

        let mut wire_order: Vec<usize> = (0..fields.len()).collect();
        wire_order.sort_by_key(|&i| fields[i].id);
        let gaps = find_gaps(&fields, &wire_order);

        Ok(StructPlan {
            name,
            idl_name: s.name.clone(),
            go_name,
            is_union: s.is_union,
            is_exception: s.is_exception,
            fields,
            wire_order,
            gaps,
            annotations: s.annotations.clone(),
            doc: s.doc.clone(),
        })
    }

    fn plan_field(&self, field: &Field, in_union: bool) -> Result<FieldPlan> {
        // Union view: every member is optional. The model is left untouched.
        let requiredness = if in_union {
            Requiredness::Optional
        } else {
            field.requiredness
        };
        let repr = self.lower_field(field, requiredness)?;
        let presence = presence(requiredness, &repr, field.default.as_ref());

        Ok(FieldPlan {
            id: field.id,
            name: field.name.clone(),
            go_name: publicize(&field.name),
            ty: field.ty.clone(),
            requiredness,
            repr,
            default: field.default.clone(),
            presence,
            annotations: field.annotations.clone(),
            doc: field.doc.clone(),
        })
    }

    pub fn plan_enum(&self, e: &Enum) -> EnumPlan {
        let go_name = publicize(&e.name);
        let values = e
            .resolved_values()
            .into_iter()
            .zip(&e.values)
            .map(|((name, value), decl)| EnumEntry {
                name: name.to_owned(),
                go_name: format!("{go_name}_{name}"),
                value,
                doc: decl.doc.clone(),
            })
            .collect();
        EnumPlan {
            name: self.program().type_ref(&e.name),
            go_name,
            values,
            doc: e.doc.clone(),
        }
    }

    pub fn plan_service(
        &self,
        service: &Service,
        warnings: &mut Vec<Warning>,
    ) -> Result<ServicePlan> {
        let functions = service
            .functions
            .iter()
            .map(|f| self.plan_function(service, f, warnings))
            .collect::<Result<Vec<_>>>()?;

        Ok(ServicePlan {
            name: self.program().type_ref(&service.name),
            go_name: publicize(&service.name),
            extends: service.extends.clone(),
            functions,
            annotations: service.annotations.clone(),
            doc: service.doc.clone(),
        })
    }

    fn plan_function(
        &self,
        service: &Service,
        function: &Function,
        warnings: &mut Vec<Warning>,
    ) -> Result<FunctionPlan> {
        if function.oneway {
            if !function.exceptions.is_empty() {
                return Err(Error::OnewayWithExceptions {
                    service: service.name.clone(),
                    function: function.name.clone(),
                });
            }
            if !function.returns.is_void() {
                warn(
                    warnings,
                    Warning::OnewayReturnsValue {
                        service: service.name.clone(),
                        function: function.name.clone(),
                    },
                );
            }
            if function.stream || function.sink {
                warn(
                    warnings,
                    Warning::OnewayStream {
                        service: service.name.clone(),
                        function: function.name.clone(),
                    },
                );
            }
        }

        let args = self.plan_helper(service, &args_struct(function))?;
        let (returns, result) = if function.oneway {
            (None, None)
        } else {
            let returns = match function.returns {
                Type::Void => None,
                ref ty => Some(self.lower(ty, FieldContext::ELEMENT)?),
            };
            let result = self.plan_helper(service, &result_struct(function))?;
            (returns, Some(result))
        };

        Ok(FunctionPlan {
            name: function.name.clone(),
            go_name: publicize(&function.name),
            oneway: function.oneway,
            returns,
            args,
            result,
            annotations: function.annotations.clone(),
            doc: function.doc.clone(),
        })
    }

    fn plan_helper(&self, service: &Service, helper: &Struct) -> Result<StructPlan> {
        let name = self
            .program()
            .type_ref(&format!("{}.{}", service.name, helper.name));
        let go_name = helper_struct_name(&service.name, &helper.name);
        self.plan_struct_as(helper, name, go_name)
    }
}

/// Arguments struct: declared parameters; unqualified ones are required.
pub fn args_struct(function: &Function) -> Struct {
    let mut s = Struct::new(format!("{}_args", function.name));
    for arg in &function.args {
        let mut arg = arg.clone();
        if arg.requiredness == Requiredness::Default {
            arg.requiredness = Requiredness::Required;
        }
        s.fields.push(arg);
    }
    s
}

/// Result struct: optional `success` (id 0) then one optional field per
/// declared exception.
pub fn result_struct(function: &Function) -> Struct {
    let mut s = Struct::new(format!("{}_result", function.name));
    if !function.returns.is_void() {
        s.fields
            .push(Field::new(0, SUCCESS_FIELD, function.returns.clone()).optional());
    }
    for exception in &function.exceptions {
        let mut exception = exception.clone();
        exception.requiredness = Requiredness::Optional;
        s.fields.push(exception);
    }
    s
}

fn presence(requiredness: Requiredness, repr: &TypeRepr, default: Option<&ConstValue>) -> Presence {
    if requiredness != Requiredness::Optional && !repr.is_reference() {
        return Presence::Always;
    }
    if repr.is_reference() || repr.is_container() || default.is_none() {
        Presence::NotNil
    } else {
        Presence::NotDefault
    }
}

/// Gaps between consecutive non-negative ids. Id 0 is never reported.
fn find_gaps(fields: &[FieldPlan], wire_order: &[usize]) -> Vec<IdGap> {
    let mut gaps = Vec::new();
    let mut expected = 0i32;
    for &index in wire_order {
        let id = i32::from(fields[index].id);
        if id < 0 {
            continue;
        }
        if id != expected {
            let first = expected.max(1);
            let last = id - 1;
            if first <= last {
                gaps.push(IdGap {
                    before: index,
                    first,
                    last,
                });
            }
        }
        expected = id + 1;
    }
    gaps
}

fn warn(sink: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    sink.push(warning);
}
