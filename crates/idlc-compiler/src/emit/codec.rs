//! Value codecs: protocol reads and writes for one value, recursing
//! through containers with uniquely named element temporaries.

use idlc_core::BaseType;

use super::code_writer::{CodeWriter, cw_writeln};
use super::emitter::Emitter;
use crate::Result;
use crate::lower::{ReprKind, TypeRepr};
use crate::naming::new_prefix;

/// Where a value is read to or written from, for error messages.
#[derive(Clone, Copy)]
pub(super) struct Site<'s> {
    pub field_id: i16,
    pub field_name: &'s str,
}

/// Element temporaries (`_elem0`, `_key1`, ...), unique within a method.
#[derive(Default)]
pub(super) struct Temps(usize);

impl Temps {
    fn next(&mut self) -> usize {
        let n = self.0;
        self.0 += 1;
        n
    }
}

impl Emitter<'_> {
    /// Read a value into `target`. With `declare`, `target` is a new local.
    pub(super) fn read_value(
        &self,
        w: &mut CodeWriter,
        repr: &TypeRepr,
        target: &str,
        declare: bool,
        site: Site<'_>,
        temps: &mut Temps,
    ) -> Result<()> {
        match &repr.kind {
            ReprKind::Base(_) | ReprKind::Enum(_) => {
                read_scalar(w, repr, target, declare, site);
                Ok(())
            }
            ReprKind::Struct(reference) => {
                let constructor = new_prefix(&self.lowerer.type_name(reference)?);
                let op = if declare { ":=" } else { "=" };
                cw_writeln!(w, "{target} {op} {constructor}()");
                w.block(&format!("if err := {target}.Read(iprot); err != nil"), |w| {
                    cw_writeln!(
                        w,
                        "return thrift.PrependError(fmt.Sprintf(\"%T error reading struct: \", {target}), err)"
                    );
                });
                Ok(())
            }
            ReprKind::Map { .. } | ReprKind::Set(_) | ReprKind::List(_) => {
                self.read_container(w, repr, target, declare, site, temps)
            }
        }
    }

    fn read_container(
        &self,
        w: &mut CodeWriter,
        repr: &TypeRepr,
        target: &str,
        declare: bool,
        site: Site<'_>,
        temps: &mut Temps,
    ) -> Result<()> {
        let (kind, begin, holder, capacity) = match repr.kind {
            ReprKind::Map { .. } => (
                "map",
                "_, _, size, err := iprot.ReadMapBegin()",
                "tMap",
                "size",
            ),
            ReprKind::Set(_) => ("set", "_, size, err := iprot.ReadSetBegin()", "tSet", "size"),
            _ => ("list", "_, size, err := iprot.ReadListBegin()", "tSlice", "0, size"),
        };
        let id = site.field_id;

        w.writeln(begin);
        w.block("if err != nil", |w| {
            cw_writeln!(
                w,
                "return thrift.PrependError(\"error reading field {id} {kind} begin: \", err)"
            );
        });

        let allocation = format!("make({}, {capacity})", repr.go_type);
        let container = if declare {
            cw_writeln!(w, "{target} := {allocation}");
            target.to_owned()
        } else {
            cw_writeln!(w, "{holder} := {allocation}");
            let address = if repr.derefs() { "&" } else { "" };
            cw_writeln!(w, "{target} = {address}{holder}");
            if repr.derefs() {
                format!("(*{target})")
            } else {
                target.to_owned()
            }
        };

        w.try_block("for i := 0; i < size; i++", |w| {
            let n = temps.next();
            match &repr.kind {
                ReprKind::Map { key, value } => {
                    let (k, v) = (format!("_key{n}"), format!("_val{n}"));
                    self.read_value(w, key, &k, true, site, temps)?;
                    self.read_value(w, value, &v, true, site, temps)?;
                    cw_writeln!(w, "{container}[{k}] = {v}");
                }
                ReprKind::Set(elem) => {
                    let e = format!("_elem{n}");
                    self.read_value(w, elem, &e, true, site, temps)?;
                    cw_writeln!(w, "{container}[{e}] = true");
                }
                ReprKind::List(elem) => {
                    let e = format!("_elem{n}");
                    self.read_value(w, elem, &e, true, site, temps)?;
                    cw_writeln!(w, "{container} = append({container}, {e})");
                }
                ReprKind::Base(_) | ReprKind::Enum(_) | ReprKind::Struct(_) => {}
            }
            Ok(())
        })?;

        let end = match repr.kind {
            ReprKind::Map { .. } => "ReadMapEnd",
            ReprKind::Set(_) => "ReadSetEnd",
            _ => "ReadListEnd",
        };
        w.block(&format!("if err := iprot.{end}(); err != nil"), |w| {
            cw_writeln!(
                w,
                "return thrift.PrependError(\"error reading field {id} {kind} end: \", err)"
            );
        });
        Ok(())
    }

    /// Write the value held by the Go expression `value`.
    pub(super) fn write_value(
        &self,
        w: &mut CodeWriter,
        repr: &TypeRepr,
        value: &str,
        site: Site<'_>,
        temps: &mut Temps,
    ) -> Result<()> {
        match &repr.kind {
            ReprKind::Base(_) | ReprKind::Enum(_) => {
                let call = write_call(repr, value);
                w.block(&format!("if err := oprot.{call}; err != nil"), |w| {
                    cw_writeln!(
                        w,
                        "return thrift.PrependError(fmt.Sprintf(\"%T.{} ({}) field write error: \", p), err)",
                        site.field_name,
                        site.field_id
                    );
                });
                Ok(())
            }
            ReprKind::Struct(_) => {
                w.block(&format!("if err := {value}.Write(oprot); err != nil"), |w| {
                    cw_writeln!(
                        w,
                        "return thrift.PrependError(fmt.Sprintf(\"%T error writing struct: \", {value}), err)"
                    );
                });
                Ok(())
            }
            ReprKind::Map { .. } | ReprKind::Set(_) | ReprKind::List(_) => {
                self.write_container(w, repr, value, site, temps)
            }
        }
    }

    fn write_container(
        &self,
        w: &mut CodeWriter,
        repr: &TypeRepr,
        value: &str,
        site: Site<'_>,
        temps: &mut Temps,
    ) -> Result<()> {
        let n = temps.next();
        let (kind, begin, end, range) = match &repr.kind {
            ReprKind::Map { key, value: val } => (
                "map",
                format!(
                    "WriteMapBegin(thrift.{}, thrift.{}, len({value}))",
                    key.wire.go_name(),
                    val.wire.go_name()
                ),
                "WriteMapEnd",
                format!("for _key{n}, _val{n} := range {value}"),
            ),
            ReprKind::Set(elem) => (
                "set",
                format!("WriteSetBegin(thrift.{}, len({value}))", elem.wire.go_name()),
                "WriteSetEnd",
                format!("for _elem{n} := range {value}"),
            ),
            ReprKind::List(elem) => (
                "list",
                format!("WriteListBegin(thrift.{}, len({value}))", elem.wire.go_name()),
                "WriteListEnd",
                format!("for _, _elem{n} := range {value}"),
            ),
            ReprKind::Base(_) | ReprKind::Enum(_) | ReprKind::Struct(_) => return Ok(()),
        };
        let id = site.field_id;

        w.block(&format!("if err := oprot.{begin}; err != nil"), |w| {
            cw_writeln!(
                w,
                "return thrift.PrependError(\"error writing field {id} {kind} begin: \", err)"
            );
        });
        w.try_block(&range, |w| match &repr.kind {
            ReprKind::Map { key, value: val } => {
                self.write_value(w, key, &format!("_key{n}"), site, temps)?;
                self.write_value(w, val, &format!("_val{n}"), site, temps)
            }
            ReprKind::Set(elem) | ReprKind::List(elem) => {
                self.write_value(w, elem, &format!("_elem{n}"), site, temps)
            }
            ReprKind::Base(_) | ReprKind::Enum(_) | ReprKind::Struct(_) => Ok(()),
        })?;
        w.block(&format!("if err := oprot.{end}(); err != nil"), |w| {
            cw_writeln!(
                w,
                "return thrift.PrependError(\"error writing field {id} {kind} end: \", err)"
            );
        });
        Ok(())
    }
}

fn read_scalar(w: &mut CodeWriter, repr: &TypeRepr, target: &str, declare: bool, site: Site<'_>) {
    if declare {
        cw_writeln!(w, "var {target} {}", repr.go_type);
    }
    cw_writeln!(w, "if v, err := iprot.{}(); err != nil {{", read_method(repr));
    {
        let _indent = w.indent();
        cw_writeln!(
            w,
            "return thrift.PrependError(\"error reading field {}: \", err)",
            site.field_id
        );
    }
    w.writeln("} else {");
    {
        let _indent = w.indent();
        let address = if repr.derefs() { "&" } else { "" };
        match repr.conversion() {
            Some(conversion) => {
                cw_writeln!(w, "temp := {conversion}(v)");
                cw_writeln!(w, "{target} = {address}temp");
            }
            None => cw_writeln!(w, "{target} = {address}v"),
        }
    }
    w.writeln("}");
}

fn read_method(repr: &TypeRepr) -> &'static str {
    match repr.kind {
        ReprKind::Base(base) => match base {
            BaseType::String => "ReadString",
            BaseType::Binary => "ReadBinary",
            BaseType::Bool => "ReadBool",
            BaseType::Byte => "ReadByte",
            BaseType::I16 => "ReadI16",
            BaseType::I32 => "ReadI32",
            BaseType::I64 => "ReadI64",
            BaseType::Double => "ReadDouble",
        },
        _ => "ReadI32",
    }
}

fn write_call(repr: &TypeRepr, value: &str) -> String {
    match repr.kind {
        ReprKind::Base(base) => match base {
            BaseType::String => format!("WriteString(string({value}))"),
            BaseType::Binary => format!("WriteBinary({value})"),
            BaseType::Bool => format!("WriteBool(bool({value}))"),
            BaseType::Byte => format!("WriteByte(byte({value}))"),
            BaseType::I16 => format!("WriteI16(int16({value}))"),
            BaseType::I32 => format!("WriteI32(int32({value}))"),
            BaseType::I64 => format!("WriteI64(int64({value}))"),
            BaseType::Double => format!("WriteDouble(float64({value}))"),
        },
        _ => format!("WriteI32(int32({value}))"),
    }
}
