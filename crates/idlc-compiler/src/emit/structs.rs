//! Struct emission: definition, constructor, accessors, presence helpers,
//! `Read`/`Write` and string rendering.

use super::codec::{Site, Temps};
use super::code_writer::{CodeWriter, cw_write, cw_writeln};
use super::emitter::Emitter;
use super::types::doc_comment;
use crate::Result;
use crate::consts::go_string;
use crate::lower::{FieldPlan, Presence, StructPlan};
use crate::naming::new_prefix;

/// Legacy annotation replacing the generated json struct tag.
pub const GO_TAG_ANNOTATION: &str = "go.tag";

impl Emitter<'_> {
    pub(super) fn emit_struct(&mut self, w: &mut CodeWriter, plan: &StructPlan) -> Result<()> {
        tracing::trace!(name = %plan.go_name, "emitting struct");
        self.ctx.register_struct(&plan.go_name);

        self.emit_definition(w, plan);
        self.emit_constructor(w, plan)?;
        self.emit_struct_definition(w, plan)?;
        for field in &plan.fields {
            self.emit_accessors(w, plan, field)?;
        }
        if plan.is_union && plan.settable().next().is_some() {
            emit_union_helpers(w, plan);
        }
        self.emit_read(w, plan)?;
        self.emit_write(w, plan)?;
        emit_string(w, plan);
        if plan.is_exception {
            cw_writeln!(w, "func (p *{}) Error() string {{", plan.go_name);
            w.writeln("\treturn p.String()");
            w.writeln("}");
            w.blank_line();
        }
        Ok(())
    }

    fn emit_definition(&self, w: &mut CodeWriter, plan: &StructPlan) {
        doc_comment(w, plan.doc.as_deref());
        if plan.fields.iter().any(|f| f.doc.is_some()) {
            if plan.doc.is_some() {
                w.writeln("//");
            }
            w.writeln("// Attributes:");
            for field in &plan.fields {
                match field.doc.as_deref() {
                    Some(doc) => cw_writeln!(w, "//  - {}: {}", field.go_name, doc.trim()),
                    None => cw_writeln!(w, "//  - {}", field.go_name),
                }
            }
        }

        w.block(&format!("type {} struct", plan.go_name), |w| {
            for (&index, field) in plan.wire_order.iter().zip(plan.sorted()) {
                if let Some(gap) = plan.gap_before(index) {
                    cw_writeln!(w, "// {gap}");
                }
                doc_comment(w, field.doc.as_deref());
                cw_writeln!(
                    w,
                    "{} {} `{}`",
                    field.go_name,
                    field.repr.declared_go_type(),
                    struct_tag(field)
                );
            }
        });
        w.blank_line();
    }

    /// `NewT()`: zero value with declared defaults of inline fields.
    fn emit_constructor(&self, w: &mut CodeWriter, plan: &StructPlan) -> Result<()> {
        let mut initializers = Vec::new();
        for field in &plan.fields {
            let Some(default) = &field.default else {
                continue;
            };
            if field.repr.derefs() {
                continue;
            }
            let literal = self.consts.render(&field.ty, default)?;
            initializers.push(format!("{}: {literal},", field.go_name));
        }

        let name = &plan.go_name;
        w.block(&format!("func {}() *{name}", new_prefix(name)), |w| {
            if initializers.is_empty() {
                cw_writeln!(w, "return &{name}{{}}");
                return;
            }
            cw_writeln!(w, "return &{name}{{");
            {
                let _indent = w.indent();
                for initializer in &initializers {
                    w.writeln(initializer);
                }
            }
            w.writeln("}");
        });
        w.blank_line();
        Ok(())
    }

    fn emit_accessors(
        &self,
        w: &mut CodeWriter,
        plan: &StructPlan,
        field: &FieldPlan,
    ) -> Result<()> {
        let name = &plan.go_name;
        let f = &field.go_name;
        let accessor = field.repr.accessor_go_type();
        let default_var = default_var(plan, field);

        if field.has_isset() {
            match &field.default {
                Some(default) => {
                    let literal = self.consts.render(&field.ty, default)?;
                    cw_writeln!(w, "var {default_var} {accessor} = {literal}");
                }
                None => cw_writeln!(w, "var {default_var} {accessor}"),
            }
            w.blank_line();
        }

        w.block(&format!("func (p *{name}) Get{f}() {accessor}"), |w| {
            if field.repr.is_reference() {
                w.block(&format!("if !p.IsSet{f}()"), |w| {
                    cw_writeln!(w, "return {default_var}");
                });
            }
            let deref = if field.repr.derefs() { "*" } else { "" };
            cw_writeln!(w, "return {deref}p.{f}");
        });
        w.blank_line();

        w.block(&format!("func (p *{name}) Set{f}(v {accessor})"), |w| {
            let address = if field.repr.derefs() { "&" } else { "" };
            cw_writeln!(w, "p.{f} = {address}v");
        });
        w.blank_line();

        match field.presence {
            Presence::Always => {}
            Presence::NotNil => {
                w.block(&format!("func (p *{name}) IsSet{f}() bool"), |w| {
                    cw_writeln!(w, "return p.{f} != nil");
                });
                w.blank_line();
            }
            Presence::NotDefault => {
                w.block(&format!("func (p *{name}) IsSet{f}() bool"), |w| {
                    if field.repr.is_binary() {
                        cw_writeln!(w, "return !bytes.Equal(p.{f}, {default_var})");
                    } else {
                        cw_writeln!(w, "return p.{f} != {default_var}");
                    }
                });
                w.blank_line();
            }
        }
        Ok(())
    }

    fn emit_read(&self, w: &mut CodeWriter, plan: &StructPlan) -> Result<()> {
        let name = &plan.go_name;
        w.block(&format!("func (p *{name}) Read(iprot thrift.TProtocol) error"), |w| {
            w.block("if _, err := iprot.ReadStructBegin(); err != nil", |w| {
                w.writeln("return thrift.PrependError(fmt.Sprintf(\"%T read error: \", p), err)");
            });
            w.blank_line();

            for field in plan.required() {
                cw_writeln!(w, "var isset{} bool = false", field.go_name);
            }
            if plan.required().next().is_some() {
                w.blank_line();
            }

            w.block("for", |w| {
                w.writeln("_, fieldTypeId, fieldId, err := iprot.ReadFieldBegin()");
                w.block("if err != nil", |w| {
                    w.writeln(
                        "return thrift.PrependError(fmt.Sprintf(\"%T field %d read error: \", p, fieldId), err)",
                    );
                });
                w.block("if fieldTypeId == thrift.STOP", |w| w.writeln("break"));
                w.switch("switch fieldId", |w| {
                    for field in plan.sorted() {
                        w.case(&format!("case {}", field.id), |w| {
                            // Known id with another wire type is skipped.
                            let wire = field.repr.wire.go_name();
                            w.block(&format!("if fieldTypeId != thrift.{wire}"), |w| {
                                w.block("if err := iprot.Skip(fieldTypeId); err != nil", |w| {
                                    w.writeln("return err");
                                });
                                w.writeln("break");
                            });
                            w.block(
                                &format!(
                                    "if err := p.ReadField{}(iprot); err != nil",
                                    field.method_suffix()
                                ),
                                |w| w.writeln("return err"),
                            );
                            if field.is_required() {
                                cw_writeln!(w, "isset{} = true", field.go_name);
                            }
                        });
                    }
                    w.case("default", |w| {
                        w.block("if err := iprot.Skip(fieldTypeId); err != nil", |w| {
                            w.writeln("return err");
                        });
                    });
                });
                w.block("if err := iprot.ReadFieldEnd(); err != nil", |w| {
                    w.writeln("return err");
                });
            });

            w.block("if err := iprot.ReadStructEnd(); err != nil", |w| {
                w.writeln(
                    "return thrift.PrependError(fmt.Sprintf(\"%T read struct end error: \", p), err)",
                );
            });
            for field in plan.required() {
                w.block(&format!("if !isset{}", field.go_name), |w| {
                    cw_writeln!(
                        w,
                        "return thrift.NewTProtocolExceptionWithType(thrift.INVALID_DATA, fmt.Errorf(\"Required field {} is not set\"))",
                        field.go_name
                    );
                });
            }
            w.writeln("return nil");
        });
        w.blank_line();

        for field in plan.sorted() {
            w.try_block(
                &format!(
                    "func (p *{name}) ReadField{}(iprot thrift.TProtocol) error",
                    field.method_suffix()
                ),
                |w| {
                    let site = Site {
                        field_id: field.id,
                        field_name: &field.name,
                    };
                    let target = format!("p.{}", field.go_name);
                    self.read_value(w, &field.repr, &target, false, site, &mut Temps::default())?;
                    w.writeln("return nil");
                    Ok(())
                },
            )?;
            w.blank_line();
        }
        Ok(())
    }

    fn emit_write(&self, w: &mut CodeWriter, plan: &StructPlan) -> Result<()> {
        let name = &plan.go_name;
        w.block(&format!("func (p *{name}) Write(oprot thrift.TProtocol) error"), |w| {
            if plan.is_union && plan.settable().next().is_some() {
                w.block(&format!("if c := p.CountSetFields{name}(); c != 1"), |w| {
                    w.writeln(
                        "return fmt.Errorf(\"%T write union: exactly one field must be set (%d set).\", p, c)",
                    );
                });
            }
            w.block(
                &format!(
                    "if err := oprot.WriteStructBegin({}); err != nil",
                    go_string(&plan.idl_name)
                ),
                |w| {
                    w.writeln(
                        "return thrift.PrependError(fmt.Sprintf(\"%T write struct begin error: \", p), err)",
                    );
                },
            );
            for field in plan.sorted() {
                w.block(
                    &format!(
                        "if err := p.writeField{}(oprot); err != nil",
                        field.method_suffix()
                    ),
                    |w| w.writeln("return err"),
                );
            }
            w.block("if err := oprot.WriteFieldStop(); err != nil", |w| {
                w.writeln("return thrift.PrependError(\"write field stop error: \", err)");
            });
            w.block("if err := oprot.WriteStructEnd(); err != nil", |w| {
                w.writeln("return thrift.PrependError(\"write struct stop error: \", err)");
            });
            w.writeln("return nil");
        });
        w.blank_line();

        for field in plan.sorted() {
            w.try_block(
                &format!(
                    "func (p *{name}) writeField{}(oprot thrift.TProtocol) (err error)",
                    field.method_suffix()
                ),
                |w| {
                    if field.is_guarded() {
                        w.try_block(&format!("if p.IsSet{}()", field.go_name), |w| {
                            self.write_field(w, field)
                        })?;
                    } else {
                        self.write_field(w, field)?;
                    }
                    w.writeln("return err");
                    Ok(())
                },
            )?;
            w.blank_line();
        }
        Ok(())
    }

    /// Field header, value and footer.
    fn write_field(&self, w: &mut CodeWriter, field: &FieldPlan) -> Result<()> {
        let id = field.id;
        let field_name = &field.name;
        w.block(
            &format!(
                "if err := oprot.WriteFieldBegin({}, thrift.{}, {id}); err != nil",
                go_string(field_name),
                field.repr.wire.go_name()
            ),
            |w| {
                cw_writeln!(
                    w,
                    "return thrift.PrependError(fmt.Sprintf(\"%T write field begin error {id}:{field_name}: \", p), err)"
                );
            },
        );

        let value = if field.repr.derefs() {
            format!("*p.{}", field.go_name)
        } else {
            format!("p.{}", field.go_name)
        };
        let site = Site {
            field_id: id,
            field_name,
        };
        self.write_value(w, &field.repr, &value, site, &mut Temps::default())?;

        w.block("if err := oprot.WriteFieldEnd(); err != nil", |w| {
            cw_writeln!(
                w,
                "return thrift.PrependError(fmt.Sprintf(\"%T write field end error {id}:{field_name}: \", p), err)"
            );
        });
        Ok(())
    }
}

fn struct_tag(field: &FieldPlan) -> String {
    let required = if field.is_required() { ",required" } else { "" };
    let thrift = format!("thrift:\"{},{}{required}\"", field.name, field.id);
    let json = match field.annotations.get(GO_TAG_ANNOTATION) {
        Some(tag) => tag.to_owned(),
        None if field.is_optional() => format!("json:\"{},omitempty\"", field.name),
        None => format!("json:\"{}\"", field.name),
    };
    format!("{thrift} {json}")
}

/// Package variable holding a field's default (`Canvas_Color_DEFAULT`).
pub(super) fn default_var(plan: &StructPlan, field: &FieldPlan) -> String {
    format!("{}_{}_DEFAULT", plan.go_name, field.go_name)
}

/// `CountSetFieldsT` and `Interface()` over the non-required members.
fn emit_union_helpers(w: &mut CodeWriter, plan: &StructPlan) {
    let name = &plan.go_name;
    w.block(&format!("func (p *{name}) CountSetFields{name}() int"), |w| {
        w.writeln("count := 0");
        for field in plan.settable() {
            w.block(&format!("if p.IsSet{}()", field.go_name), |w| {
                w.writeln("count++");
            });
        }
        w.writeln("return count");
    });
    w.blank_line();

    w.block(&format!("func (p *{name}) Interface() interface{{}}"), |w| {
        for field in plan.settable() {
            w.block(&format!("if p.IsSet{}()", field.go_name), |w| {
                cw_writeln!(w, "return p.Get{}()", field.go_name);
            });
        }
        w.writeln("return nil");
    });
    w.blank_line();
}

/// `String()` listing every field in id order.
fn emit_string(w: &mut CodeWriter, plan: &StructPlan) {
    let name = &plan.go_name;
    w.block(&format!("func (p *{name}) String() string"), |w| {
        w.block("if p == nil", |w| w.writeln("return \"<nil>\""));
        if plan.fields.is_empty() {
            cw_writeln!(w, "return \"{name}({{}})\"");
            return;
        }
        let labels: Vec<String> = plan.sorted().map(|f| format!("{}: %v", f.go_name)).collect();
        cw_write!(w, "return fmt.Sprintf(\"{name}({{{}}})\"", labels.join(", "));
        for field in plan.sorted() {
            cw_write!(w, ", p.Get{}()", field.go_name);
        }
        w.writeln(")");
    });
    w.blank_line();
}
