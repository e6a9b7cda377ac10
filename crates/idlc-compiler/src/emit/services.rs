//! Service stubs: interface, client, processor and per-function handlers.
//!
//! A service extending another holds the base client/processor by
//! composition; client calls to inherited functions are forwarded.

use std::collections::BTreeSet;

use idlc_core::Service;

use super::code_writer::{CodeWriter, cw_write, cw_writeln};
use super::emitter::Emitter;
use super::types::doc_comment;
use crate::Result;
use crate::consts::go_string;
use crate::lower::{FunctionPlan, ServicePlan};
use crate::naming::{go_variable, new_prefix, privatize};
use crate::package::namespace;

/// Base service as seen from the service extending it.
struct Base {
    /// Qualified Go name of the base interface (`shared.BaseService`).
    go_name: String,
    /// Functions reachable through the base, nearest ancestor first.
    functions: Vec<FunctionPlan>,
}

impl Emitter<'_> {
    pub(super) fn emit_service(&mut self, w: &mut CodeWriter, service: &Service) -> Result<()> {
        tracing::debug!(service = %service.name, "emitting service");
        let plan = self
            .lowerer
            .plan_service(service, self.ctx.warnings_mut())?;
        let base = self.base_of(service, &plan)?;

        self.emit_interface(w, &plan, base.as_ref());
        self.emit_service_definition(w, &plan)?;
        self.emit_client(w, &plan, base.as_ref());
        self.emit_processor(w, &plan, base.as_ref());
        for function in &plan.functions {
            self.emit_handler(w, &plan, function);
        }

        w.comment("HELPER FUNCTIONS AND STRUCTURES");
        w.blank_line();
        for function in &plan.functions {
            self.emit_struct(w, &function.args)?;
            let Some(result) = &function.result else {
                continue;
            };
            emit_result_helpers(w, function);
            self.emit_struct(w, result)?;
        }
        Ok(())
    }

    fn base_of(&self, service: &Service, plan: &ServicePlan) -> Result<Option<Base>> {
        let Some(reference) = &service.extends else {
            return Ok(None);
        };
        let mut seen: BTreeSet<String> = plan.functions.iter().map(|f| f.name.clone()).collect();
        let mut functions = Vec::new();
        // Re-lowered from here so types carry this package's qualifiers.
        let mut ignored = Vec::new();
        for ancestor in self.lowerer.index().ancestors(service)? {
            let ancestor_plan = self.lowerer.plan_service(ancestor, &mut ignored)?;
            for function in ancestor_plan.functions {
                if seen.insert(function.name.clone()) {
                    functions.push(function);
                }
            }
        }
        Ok(Some(Base {
            go_name: self.lowerer.type_name(reference)?,
            functions,
        }))
    }

    fn emit_interface(&self, w: &mut CodeWriter, plan: &ServicePlan, base: Option<&Base>) {
        doc_comment(w, plan.doc.as_deref());
        w.block(&format!("type {} interface", plan.go_name), |w| {
            if let Some(base) = base {
                w.writeln(&base.go_name);
                if !plan.functions.is_empty() {
                    w.blank_line();
                }
            }
            for function in &plan.functions {
                function_doc(w, function);
                w.writeln(&signature(function));
            }
        });
        w.blank_line();
    }

    fn emit_client(&self, w: &mut CodeWriter, plan: &ServicePlan, base: Option<&Base>) {
        let service = &plan.go_name;
        let client = format!("{service}Client");

        w.block(&format!("type {client} struct"), |w| {
            w.writeln("client thrift.TClient");
            if let Some(base) = base {
                cw_writeln!(w, "base *{}Client", base.go_name);
            }
        });
        w.blank_line();

        w.block(
            &format!(
                "func {}FactoryProvider(p thrift.TClientProvider) (*{client}, error)",
                new_prefix(&client)
            ),
            |w| {
                cw_writeln!(
                    w,
                    "cl, err := p.Build({}, {})",
                    go_string(&namespace(self.program)),
                    go_string(&plan.name.name)
                );
                w.block("if err != nil", |w| w.writeln("return nil, err"));
                cw_writeln!(w, "return {}(cl), nil", new_prefix(&client));
            },
        );
        w.blank_line();

        w.block(
            &format!("func {}(cl thrift.TClient) *{client}", new_prefix(&client)),
            |w| match base {
                Some(base) => cw_writeln!(
                    w,
                    "return &{client}{{client: cl, base: {}(cl)}}",
                    new_prefix(&format!("{}Client", base.go_name))
                ),
                None => cw_writeln!(w, "return &{client}{{client: cl}}"),
            },
        );
        w.blank_line();

        for function in &plan.functions {
            function_doc(w, function);
            w.block(&format!("func (p *{client}) {}", signature(function)), |w| {
                emit_client_call(w, function);
            });
            w.blank_line();
        }

        let Some(base) = base else {
            return;
        };
        for function in &base.functions {
            w.block(&format!("func (p *{client}) {}", signature(function)), |w| {
                let params: Vec<String> = function
                    .args
                    .fields
                    .iter()
                    .map(|arg| go_variable(&arg.name))
                    .collect();
                let mut call = format!("p.base.{}(ctx", function.go_name);
                for param in &params {
                    call.push_str(", ");
                    call.push_str(param);
                }
                cw_writeln!(w, "return {call})");
            });
            w.blank_line();
        }
    }

    fn emit_processor(&self, w: &mut CodeWriter, plan: &ServicePlan, base: Option<&Base>) {
        let service = &plan.go_name;
        let processor = format!("{service}Processor");

        w.block(
            &format!(
                "func {}Provider(handler {service}, provider thrift.TProcessorProvider) (thrift.TProcessor, error)",
                new_prefix(&processor)
            ),
            |w| {
                cw_writeln!(
                    w,
                    "p, err := provider.Build({}, {})",
                    go_string(&namespace(self.program)),
                    go_string(&plan.name.name)
                );
                w.block("if err != nil", |w| w.writeln("return nil, err"));
                cw_writeln!(w, "return {}Factory(handler, p), nil", new_prefix(&processor));
            },
        );
        w.blank_line();

        w.block(
            &format!(
                "func {}(handler {service}, middlewares []thrift.TMiddleware) thrift.TProcessor",
                new_prefix(&processor)
            ),
            |w| {
                match base {
                    Some(base) => cw_writeln!(
                        w,
                        "p := {}(handler, middlewares)",
                        new_prefix(&format!("{}Processor", base.go_name))
                    ),
                    None => w.writeln("p := thrift.NewTStandardProcessor(middlewares)"),
                }
                cw_writeln!(w, "return {}Factory(handler, p)", new_prefix(&processor));
            },
        );
        w.blank_line();

        w.block(
            &format!(
                "func {}Factory(handler {service}, p thrift.TProcessor) thrift.TProcessor",
                new_prefix(&processor)
            ),
            |w| {
                for function in &plan.functions {
                    let kind = if function.oneway { "Unary" } else { "Binary" };
                    let name = go_string(&function.name);
                    w.writeln("p.AddProcessor(");
                    {
                        let _indent = w.indent();
                        cw_writeln!(w, "{name},");
                        cw_writeln!(
                            w,
                            "thrift.NewT{kind}ProcessorFunction(p, {name}, func() thrift.TRequest {{ return &{}{{}} }}, &{}{{handler: handler}}),",
                            function.args.go_name,
                            handler_name(plan, function)
                        );
                    }
                    w.writeln(")");
                }
                w.writeln("return p");
            },
        );
        w.blank_line();
    }

    /// Dispatch record wrapping the business handler for one function.
    fn emit_handler(&self, w: &mut CodeWriter, plan: &ServicePlan, function: &FunctionPlan) {
        let handler = handler_name(plan, function);
        w.block(&format!("type {handler} struct"), |w| {
            cw_writeln!(w, "handler {}", plan.go_name);
        });
        w.blank_line();

        let returns = if function.oneway {
            "error"
        } else {
            "(thrift.TResponse, error)"
        };
        let header =
            format!("func (p *{handler}) Handle(ctx thrift.Context, req thrift.TRequest) {returns}");
        w.block(&header, |w| {
            if !function.args.fields.is_empty() {
                cw_writeln!(w, "args := req.(*{})", function.args.go_name);
            }
            let lhs = if function.returns.is_some() {
                "retval, err2"
            } else {
                "err2"
            };
            cw_write!(w, "{lhs} := p.handler.{}(ctx", function.go_name);
            for arg in &function.args.fields {
                if arg.repr.derefs() {
                    cw_write!(w, ", args.Get{}()", arg.go_name);
                } else {
                    cw_write!(w, ", args.{}", arg.go_name);
                }
            }
            w.writeln(")");

            let Some(result) = &function.result else {
                w.writeln("return err2");
                return;
            };
            cw_writeln!(w, "result := &{}{{}}", result.go_name);
            w.block("if err2 != nil", |w| {
                if function.exceptions().next().is_some() {
                    w.switch("switch v := thrift.Cause(err2).(type)", |w| {
                        for exception in function.exceptions() {
                            let label = format!("case {}", exception.repr.declared_go_type());
                            w.case(&label, |w| {
                                cw_writeln!(w, "result.{} = v", exception.go_name);
                                w.writeln("return result, nil");
                            });
                        }
                    });
                }
                w.writeln("return nil, err2");
            });
            if let Some(success) = function.success() {
                let address = if success.repr.derefs() { "&" } else { "" };
                cw_writeln!(w, "result.{} = {address}retval", success.go_name);
            }
            w.writeln("return result, nil");
        });
        w.blank_line();
    }
}

fn emit_client_call(w: &mut CodeWriter, function: &FunctionPlan) {
    if function.args.fields.is_empty() {
        cw_writeln!(w, "args := {}{{}}", function.args.go_name);
    } else {
        cw_writeln!(w, "args := {}{{", function.args.go_name);
        {
            let _indent = w.indent();
            for arg in &function.args.fields {
                let address = if arg.repr.derefs() { "&" } else { "" };
                cw_writeln!(w, "{}: {address}{},", arg.go_name, go_variable(&arg.name));
            }
        }
        w.writeln("}");
    }

    let name = go_string(&function.name);
    let Some(result) = &function.result else {
        cw_writeln!(w, "return p.client.CallUnary(ctx, {name}, &args)");
        return;
    };

    let returns_value = function.returns.is_some();
    let fail = |value: &str| {
        if returns_value {
            format!("return res, {value}")
        } else {
            format!("return {value}")
        }
    };

    cw_writeln!(w, "result := {}{{}}", result.go_name);
    w.block(
        &format!("if err = p.client.CallBinary(ctx, {name}, &args, &result); err != nil"),
        |w| w.writeln(&fail("err")),
    );
    for exception in function.exceptions() {
        w.block(&format!("if result.{} != nil", exception.go_name), |w| {
            w.writeln(&fail(&format!("result.{}", exception.go_name)));
        });
    }
    if !returns_value {
        w.writeln("return nil");
        return;
    }
    w.block("if !result.IsSetSuccess()", |w| {
        w.writeln(&fail(&format!(
            "thrift.NewTApplicationException(thrift.MISSING_RESULT, {})",
            go_string(&format!("{} failed: unknown result", function.name))
        )));
    });
    w.writeln("return result.GetSuccess(), nil");
}

/// `GetResult()` and `GetError()` on a result struct.
fn emit_result_helpers(w: &mut CodeWriter, function: &FunctionPlan) {
    let Some(result) = &function.result else {
        return;
    };
    let name = &result.go_name;
    w.block(&format!("func (p *{name}) GetResult() interface{{}}"), |w| {
        if function.success().is_some() {
            w.writeln("return p.GetSuccess()");
        } else {
            w.writeln("return nil");
        }
    });
    w.blank_line();

    w.block(&format!("func (p *{name}) GetError() error"), |w| {
        for exception in function.exceptions() {
            w.block(&format!("if p.{} != nil", exception.go_name), |w| {
                cw_writeln!(w, "return p.{}", exception.go_name);
            });
        }
        w.writeln("return nil");
    });
    w.blank_line();
}

/// Method signature without receiver.
fn signature(function: &FunctionPlan) -> String {
    let params: Vec<String> = std::iter::once("ctx thrift.Context".to_owned())
        .chain(function.args.fields.iter().map(|arg| {
            format!("{} {}", go_variable(&arg.name), arg.repr.accessor_go_type())
        }))
        .collect();
    let returns = match &function.returns {
        Some(repr) => format!("(res {}, err error)", repr.declared_go_type()),
        None => "(err error)".to_owned(),
    };
    format!("{}({}) {returns}", function.go_name, params.join(", "))
}

fn function_doc(w: &mut CodeWriter, function: &FunctionPlan) {
    doc_comment(w, function.doc.as_deref());
    if function.args.fields.iter().any(|a| a.doc.is_some()) {
        if function.doc.is_some() {
            w.writeln("//");
        }
        w.writeln("// Parameters:");
        for arg in &function.args.fields {
            match arg.doc.as_deref() {
                Some(doc) => cw_writeln!(w, "//  - {}: {}", arg.go_name, doc.trim()),
                None => cw_writeln!(w, "//  - {}", arg.go_name),
            }
        }
    }
}

/// Handler record type (`finderProcessorFind`).
fn handler_name(plan: &ServicePlan, function: &FunctionPlan) -> String {
    format!("{}Processor{}", privatize(&plan.go_name), function.go_name)
}
