//! Indentation-tracking writer for Go source.
//!
//! Output goes to an owned `String`, so writes cannot fail. Indentation is
//! one tab per level (what `gofmt` produces) and is held in an
//! `Rc<Cell<_>>` so an [`IndentGuard`] never borrows the writer.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::Result;

pub struct CodeWriter {
    out: String,
    indent_level: Rc<Cell<usize>>,
    at_line_start: bool,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent_level: Rc::new(Cell::new(0)),
            at_line_start: true,
        }
    }

    /// Write text. Embedded newlines start new, indented lines; blank
    /// lines carry no indentation.
    pub fn write(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.write_line_part(first);
        }
        for line in lines {
            self.out.push('\n');
            self.at_line_start = true;
            self.write_line_part(line);
        }
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.out.push('\n');
        self.at_line_start = true;
    }

    pub fn blank_line(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Indentation increases while the guard is alive.
    pub fn indent(&self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// `// ` comment, one per line of `text`.
    pub fn comment(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.writeln("//");
            } else {
                self.writeln(&format!("// {line}"));
            }
        }
    }

    /// `header {`, indented body, `}`.
    pub fn block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.writeln(&format!("{header} {{"));
        {
            let _indent = self.indent();
            body(self);
        }
        self.writeln("}");
    }

    /// `switch` statement. Labels written with [`CodeWriter::case`] stay at
    /// the level of the `switch` keyword, as `gofmt` lays them out.
    pub fn switch(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.writeln(&format!("{header} {{"));
        body(self);
        self.writeln("}");
    }

    /// `label:` followed by the clause body one level deeper.
    pub fn case(&mut self, label: &str, body: impl FnOnce(&mut Self)) {
        self.writeln(&format!("{label}:"));
        let _indent = self.indent();
        body(self);
    }

    /// Composite literal: `Type{`, fallible body, `}`.
    pub fn try_literal(
        &mut self,
        header: &str,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.writeln(&format!("{header}{{"));
        {
            let _indent = self.indent();
            body(self)?;
        }
        self.writeln("}");
        Ok(())
    }

    /// Like [`CodeWriter::block`] with a fallible body.
    pub fn try_block(
        &mut self,
        header: &str,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.writeln(&format!("{header} {{"));
        {
            let _indent = self.indent();
            body(self)?;
        }
        self.writeln("}");
        Ok(())
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    pub fn finish(self) -> String {
        self.out
    }

    #[doc(hidden)]
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.write(&args.to_string());
    }

    #[doc(hidden)]
    pub fn writeln_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.writeln(&args.to_string());
    }

    fn write_line_part(&mut self, part: &str) {
        if part.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent_level.get() {
                self.out.push('\t');
            }
            self.at_line_start = false;
        }
        self.out.push_str(part);
    }
}

pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        let current = self.indent_level.get();
        self.indent_level.set(current.saturating_sub(1));
    }
}

/// `write!` for a [`CodeWriter`].
macro_rules! cw_write {
    ($writer:expr, $($arg:tt)*) => {
        $writer.write_fmt(format_args!($($arg)*))
    };
}

/// `writeln!` for a [`CodeWriter`].
macro_rules! cw_writeln {
    ($writer:expr, $($arg:tt)*) => {
        $writer.writeln_fmt(format_args!($($arg)*))
    };
}

pub(crate) use {cw_write, cw_writeln};
