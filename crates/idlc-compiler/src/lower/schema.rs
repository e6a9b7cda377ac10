//! Plans for every definition reachable from a root program.

use indexmap::IndexMap;

use idlc_core::{ModelIndex, TypeRef};

use super::Lowerer;
use super::plan::{EnumPlan, ServicePlan, StructPlan};
use crate::{Result, Warning};

#[derive(Clone, Debug, Default)]
pub struct LoweredSchema {
    pub structs: IndexMap<TypeRef, StructPlan>,
    pub enums: IndexMap<TypeRef, EnumPlan>,
    pub services: IndexMap<TypeRef, ServicePlan>,
    pub warnings: Vec<Warning>,
}

impl LoweredSchema {
    pub fn structure(&self, reference: &TypeRef) -> Option<&StructPlan> {
        self.structs.get(reference)
    }

    pub fn enumeration(&self, reference: &TypeRef) -> Option<&EnumPlan> {
        self.enums.get(reference)
    }

    pub fn service(&self, reference: &TypeRef) -> Option<&ServicePlan> {
        self.services.get(reference)
    }
}

/// Lower every program of `index`, root first.
pub fn lower_schema(index: &ModelIndex<'_>) -> Result<LoweredSchema> {
    let mut schema = LoweredSchema::default();
    for program in index.programs() {
        let lowerer = Lowerer::new(index, program);
        for e in &program.enums {
            schema
                .enums
                .insert(program.type_ref(&e.name), lowerer.plan_enum(e));
        }
        for s in &program.structs {
            schema
                .structs
                .insert(program.type_ref(&s.name), lowerer.plan_struct(s)?);
        }
        for service in &program.services {
            let plan = lowerer.plan_service(service, &mut schema.warnings)?;
            schema.services.insert(plan.name.clone(), plan);
        }
    }
    tracing::debug!(
        structs = schema.structs.len(),
        enums = schema.enums.len(),
        services = schema.services.len(),
        "lowered schema"
    );
    Ok(schema)
}
