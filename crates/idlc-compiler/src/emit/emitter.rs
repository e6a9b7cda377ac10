//! Core emitter struct and file assembly.

use idlc_core::{ModelIndex, Program};

use super::code_writer::{CodeWriter, cw_writeln};
use super::context::GenContext;
use super::output::{GeneratedFile, GeneratedPackage};
use crate::consts::ConstRenderer;
use crate::lower::Lowerer;
use crate::package::{
    import_path, package_dir, package_name, root_package_name, service_file_name,
};
use crate::{Config, Result};

pub const TYPES_FILE: &str = "ttypes.go";
pub const CONSTANTS_FILE: &str = "constants.go";

/// Go emitter for the root program of a model index.
pub struct Emitter<'a> {
    pub(super) config: &'a Config,
    pub(super) program: &'a Program,
    pub(super) lowerer: Lowerer<'a>,
    pub(super) consts: ConstRenderer<'a>,
    pub(super) ctx: GenContext,
}

impl<'a> Emitter<'a> {
    pub fn new(index: &'a ModelIndex<'a>, config: &'a Config) -> Self {
        let program = index.root();
        let lowerer = Lowerer::new(index, program);
        Self {
            config,
            program,
            lowerer,
            consts: ConstRenderer::new(lowerer),
            ctx: GenContext::new(),
        }
    }

    /// Generate every file of the package.
    ///
    /// `constants.go` is assembled last: its `init()` flushes what the
    /// other files registered.
    pub fn emit(mut self) -> Result<GeneratedPackage> {
        let program = self.program;
        let package_name = root_package_name(program, self.config);
        tracing::debug!(program = %program.name, package = %package_name, "emitting go package");

        let mut types = self.file_writer(&package_name);
        types.writeln("var GoUnusedProtection__ int");
        types.blank_line();
        self.emit_typedefs(&mut types)?;
        self.emit_enums(&mut types);
        for s in &program.structs {
            let plan = self.lowerer.plan_struct(s)?;
            self.emit_struct(&mut types, &plan)?;
        }

        let mut service_files = Vec::with_capacity(program.services.len());
        for service in &program.services {
            let mut w = self.file_writer(&package_name);
            self.emit_service(&mut w, service)?;
            service_files.push(GeneratedFile {
                name: service_file_name(&service.name),
                contents: w.finish(),
            });
        }

        let mut constants = self.file_writer(&package_name);
        self.emit_constants(&mut constants)?;
        let (init, warnings) = std::mem::take(&mut self.ctx).flush();
        constants.block("func init()", |w| {
            for statement in &init {
                w.writeln(statement);
            }
        });

        let mut files = vec![
            GeneratedFile {
                name: TYPES_FILE.to_owned(),
                contents: types.finish(),
            },
            GeneratedFile {
                name: CONSTANTS_FILE.to_owned(),
                contents: constants.finish(),
            },
        ];
        files.extend(service_files);

        Ok(GeneratedPackage {
            package_name,
            dir: package_dir(program),
            files,
            warnings,
        })
    }

    /// Writer primed with the banner, package clause, imports and
    /// unused-import guards.
    fn file_writer(&self, pkg: &str) -> CodeWriter {
        let mut w = CodeWriter::new();
        cw_writeln!(w, "// Autogenerated by idlc ({})", env!("CARGO_PKG_VERSION"));
        w.writeln("//");
        w.writeln("// DO NOT EDIT UNLESS YOU ARE SURE THAT YOU KNOW WHAT YOU ARE DOING");
        w.blank_line();
        cw_writeln!(w, "package {pkg}");
        w.blank_line();

        w.writeln("import (");
        {
            let _indent = w.indent();
            w.writeln("\"bytes\"");
            w.writeln("\"fmt\"");
            cw_writeln!(w, "\"{}\"", self.config.thrift_import_path());
            for include in &self.program.includes {
                cw_writeln!(w, "\"{}\"", import_path(include, self.config));
            }
        }
        w.writeln(")");
        w.blank_line();

        w.comment("(needed to ensure safety because of naive import list construction.)");
        w.writeln("var _ = thrift.ZERO");
        w.writeln("var _ = fmt.Printf");
        w.writeln("var _ = bytes.Equal");
        for include in &self.program.includes {
            cw_writeln!(w, "var _ = {}.GoUnusedProtection__", package_name(include));
        }
        w.blank_line();
        w
    }
}
