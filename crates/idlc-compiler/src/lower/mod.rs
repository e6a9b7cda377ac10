//! Type lowering and codec plans.
//!
//! `Lowerer` maps IDL types to Go representations (value vs. pointer,
//! container shape, key constraints). Plans built on top of it describe
//! the wire layout of structs, enums and service helper structs.

mod lowerer;
mod plan;
mod repr;
mod schema;

#[cfg(test)]
mod plan_tests;

pub use lowerer::{BY_REFERENCE_ANNOTATION, Lowerer};
pub use plan::{
    ENUM_UNSET, EnumEntry, EnumParseError, EnumPlan, FieldPlan, FunctionPlan, IdGap, Presence,
    SUCCESS_FIELD, ServicePlan, StructPlan, args_struct, result_struct,
};
pub use repr::{FieldContext, RefMode, ReprKind, TypeRepr, builtin_go_type};
pub use schema::{LoweredSchema, lower_schema};
