//! Per-run generation state.

use crate::Warning;

/// Accumulators owned by one generation run and flushed into
/// `constants.go` when it ends.
#[derive(Debug, Default)]
pub struct GenContext {
    /// Statements assigning non-literal constants, in declaration order.
    init: Vec<String>,
    /// Registration directives, in discovery order.
    registrations: Vec<String>,
    warnings: Vec<Warning>,
}

impl GenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_statement(&mut self, statement: impl Into<String>) {
        self.init.push(statement.into());
    }

    pub fn register_struct(&mut self, go_name: &str) {
        self.registrations
            .push(format!("thrift.RegisterStruct((*{go_name})(nil))"));
    }

    pub fn register_service(&mut self, definition: &str) {
        self.registrations
            .push(format!("thrift.RegisterService({definition})"));
    }

    pub fn warnings_mut(&mut self) -> &mut Vec<Warning> {
        &mut self.warnings
    }

    pub fn registrations(&self) -> &[String] {
        &self.registrations
    }

    /// Body of the package `init()`: constant assignments first, then
    /// registrations. Returns the collected warnings with it.
    pub fn flush(self) -> (Vec<String>, Vec<Warning>) {
        let mut body = self.init;
        body.extend(self.registrations);
        (body, self.warnings)
    }
}
