//! Typedefs, enums and constants.

use idlc_core::{BaseType, Type};

use super::code_writer::{CodeWriter, cw_writeln};
use super::emitter::Emitter;
use crate::consts::go_string;
use crate::lower::FieldContext;
use crate::naming::publicize;
use crate::package::namespace;
use crate::{Error, Result};

impl Emitter<'_> {
    pub(super) fn emit_typedefs(&mut self, w: &mut CodeWriter) -> Result<()> {
        let program = self.program;
        for typedef in &program.typedefs {
            let go_name = publicize(&typedef.name);
            let target = self.lowerer.lower(&typedef.ty, FieldContext::ELEMENT)?;
            if target.go_type == go_name {
                continue;
            }

            doc_comment(w, typedef.doc.as_deref());
            if target.is_struct() {
                cw_writeln!(w, "type {go_name} = {}", target.go_type);
                w.blank_line();
                continue;
            }
            cw_writeln!(w, "type {go_name} {}", target.go_type);
            w.blank_line();
            cw_writeln!(w, "func {go_name}Ptr(v {go_name}) *{go_name} {{ return &v }}");
            w.blank_line();
        }
        Ok(())
    }

    pub(super) fn emit_enums(&mut self, w: &mut CodeWriter) {
        let program = self.program;
        for e in &program.enums {
            let plan = self.lowerer.plan_enum(e);
            let name = &plan.go_name;

            doc_comment(w, plan.doc.as_deref());
            cw_writeln!(w, "type {name} int64");
            w.blank_line();
            w.writeln("const (");
            {
                let _indent = w.indent();
                for entry in &plan.values {
                    doc_comment(w, entry.doc.as_deref());
                    cw_writeln!(w, "{} {name} = {}", entry.go_name, entry.value);
                }
            }
            w.writeln(")");
            w.blank_line();

            w.block(&format!("func (p {name}) String() string"), |w| {
                w.switch("switch p", |w| {
                    for entry in plan.distinct() {
                        w.case(&format!("case {}", entry.go_name), |w| {
                            cw_writeln!(w, "return {}", go_string(&entry.go_name));
                        });
                    }
                });
                cw_writeln!(w, "return {}", go_string(crate::lower::ENUM_UNSET));
            });
            w.blank_line();

            w.block(
                &format!("func {name}FromString(s string) ({name}, error)"),
                |w| {
                    w.switch("switch s", |w| {
                        for entry in &plan.values {
                            w.case(&format!("case {}", go_string(&entry.go_name)), |w| {
                                cw_writeln!(w, "return {}, nil", entry.go_name);
                            });
                        }
                    });
                    cw_writeln!(
                        w,
                        "return {name}(0), fmt.Errorf(\"not a valid {name} string\")"
                    );
                },
            );
            w.blank_line();

            cw_writeln!(w, "func {name}Ptr(v {name}) *{name} {{ return &v }}");
            w.blank_line();
        }
    }

    /// `Namespace`, then one declaration per constant. Values that are not
    /// Go constants are assigned from `init()`.
    pub(super) fn emit_constants(&mut self, w: &mut CodeWriter) -> Result<()> {
        let program = self.program;
        cw_writeln!(w, "const Namespace = {}", go_string(&namespace(program)));
        w.blank_line();

        for constant in &program.consts {
            let name = publicize(&constant.name);
            let true_type = self.lowerer.index().true_type(&constant.ty)?;
            if true_type.is_void() {
                return Err(Error::VoidType {
                    context: format!("constant `{}`", constant.name),
                });
            }

            doc_comment(w, constant.doc.as_deref());
            let is_go_constant = match true_type {
                Type::Base(base) => *base != BaseType::Binary,
                Type::Enum(_) => true,
                _ => false,
            };
            if is_go_constant {
                let literal = self.consts.render(&constant.ty, &constant.value)?;
                cw_writeln!(w, "const {name} = {literal}");
                continue;
            }

            let repr = self.lowerer.lower(&constant.ty, FieldContext::ELEMENT)?;
            cw_writeln!(w, "var {name} {}", repr.declared_go_type());
            let literal = self
                .consts
                .render_bound(&name, &constant.ty, &constant.value)?;
            self.ctx.init_statement(format!("{name} = {}", literal.expr));
            for statement in literal.after {
                self.ctx.init_statement(statement);
            }
        }
        w.blank_line();
        Ok(())
    }
}

/// Doc string as `//` lines.
pub(super) fn doc_comment(w: &mut CodeWriter, doc: Option<&str>) {
    if let Some(doc) = doc {
        w.comment(doc.trim_end());
    }
}
