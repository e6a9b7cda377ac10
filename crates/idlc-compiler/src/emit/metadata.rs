//! Reflection sidecar: `thrift.StructDefinition` / `thrift.ServiceDefinition`
//! values registered from `init()`.

use idlc_core::{Annotations, Type};

use super::code_writer::{CodeWriter, cw_writeln};
use super::emitter::Emitter;
use crate::Result;
use crate::consts::go_string;
use crate::lower::{ServicePlan, StructPlan};
use crate::naming::privatize;

/// Package variable holding a struct's definition.
pub fn struct_definition_var(go_name: &str) -> String {
    privatize(&format!("{go_name}StructDefinition"))
}

/// Package variable holding a service's definition.
pub fn service_definition_var(go_name: &str) -> String {
    privatize(&format!("{go_name}ServiceDefinition"))
}

impl Emitter<'_> {
    pub(super) fn emit_struct_definition(
        &self,
        w: &mut CodeWriter,
        plan: &StructPlan,
    ) -> Result<()> {
        let var = struct_definition_var(&plan.go_name);
        w.try_literal(&format!("var {var} = thrift.StructDefinition"), |w| {
            w.writeln("Namespace: Namespace,");
            if plan.is_exception {
                w.writeln("IsException: true,");
            }
            if plan.is_union {
                w.writeln("IsUnion: true,");
            }
            self.annotated_definition(w, &plan.idl_name, &plan.annotations)?;
            w.writeln("Fields: []thrift.FieldDefinition{");
            {
                let _indent = w.indent();
                for field in &plan.fields {
                    w.writeln("{");
                    {
                        let _indent = w.indent();
                        self.annotated_definition(w, &field.name, &field.annotations)?;
                    }
                    w.writeln("},");
                }
            }
            w.writeln("},");
            Ok(())
        })?;
        w.blank_line();

        w.block(
            &format!(
                "func (p *{}) StructDefinition() thrift.StructDefinition",
                plan.go_name
            ),
            |w| cw_writeln!(w, "return {var}"),
        );
        w.blank_line();
        Ok(())
    }

    /// Service definition; the registration is queued on the context.
    pub(super) fn emit_service_definition(
        &mut self,
        w: &mut CodeWriter,
        plan: &ServicePlan,
    ) -> Result<()> {
        let var = service_definition_var(&plan.go_name);
        w.try_literal(&format!("var {var} = thrift.ServiceDefinition"), |w| {
            w.writeln("Namespace: Namespace,");
            self.annotated_definition(w, &plan.name.name, &plan.annotations)?;
            if plan.functions.is_empty() {
                return Ok(());
            }
            w.writeln("Functions: []thrift.FunctionDefinition{");
            {
                let _indent = w.indent();
                for function in &plan.functions {
                    w.writeln("{");
                    {
                        let _indent = w.indent();
                        match &function.result {
                            Some(result) => cw_writeln!(
                                w,
                                "Result: &{},",
                                struct_definition_var(&result.go_name)
                            ),
                            None => w.writeln("IsOneway: true,"),
                        }
                        cw_writeln!(w, "Args: {},", struct_definition_var(&function.args.go_name));
                        self.annotated_definition(w, &function.name, &function.annotations)?;
                    }
                    w.writeln("},");
                }
            }
            w.writeln("},");
            Ok(())
        })?;
        w.blank_line();

        self.ctx.register_service(&var);
        Ok(())
    }

    /// `AnnotatedDefinition: thrift.AnnotatedDefinition{...},` entry.
    fn annotated_definition(
        &self,
        w: &mut CodeWriter,
        name: &str,
        annotations: &Annotations,
    ) -> Result<()> {
        w.writeln("AnnotatedDefinition: thrift.AnnotatedDefinition{");
        {
            let _indent = w.indent();
            cw_writeln!(w, "Name: {},", go_string(name));
            w.writeln("LegacyAnnotations: map[string]string{");
            {
                let _indent = w.indent();
                for (key, value) in &annotations.legacy {
                    cw_writeln!(w, "{}: {},", go_string(key), go_string(value));
                }
            }
            w.writeln("},");
            w.writeln("StructuredAnnotations: []thrift.RegistrableStruct{");
            {
                let _indent = w.indent();
                for annotation in &annotations.structured {
                    let ty = Type::Struct(annotation.ty.clone());
                    let literal = self.consts.render(&ty, &annotation.value)?;
                    cw_writeln!(w, "{literal},");
                }
            }
            w.writeln("},");
        }
        w.writeln("},");
        Ok(())
    }
}
