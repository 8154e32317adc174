use std::fmt::Write;

use crate::{Number, StateSerializer};

/// Human-readable serializer used for out-of-sync dumps.
///
/// Each field becomes a `name: value` line at the current indentation.
pub struct DebugSerializer {
    output: String,
    indent: usize,
    include_debug_info: bool,
}

impl DebugSerializer {
    pub fn new(include_debug_info: bool) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            include_debug_info,
        }
    }

    /// Whether components should add non-serialized diagnostic fields.
    pub fn include_debug_info(&self) -> bool {
        self.include_debug_info
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        let _ = writeln!(
            self.output,
            "{:indent$}{}: {}",
            "",
            name,
            value,
            indent = self.indent
        );
    }
}

impl StateSerializer for DebugSerializer {
    fn put_number(&mut self, name: &str, value: Number) {
        self.field(name, format_args!("{}", value));
    }

    fn put_bool(&mut self, name: &str, value: bool) {
        self.field(name, format_args!("{}", value));
    }

    fn put_string(&mut self, name: &str, value: &str) {
        self.field(name, format_args!("{:?}", value));
    }

    fn put_raw(&mut self, name: &str, data: &[u8]) {
        self.field(
            name,
            format_args!("({} bytes) {}", data.len(), hex::encode(data)),
        );
    }

    fn text_line(&mut self, line: &str) {
        let _ = writeln!(self.output, "{:indent$}{}", "", line, indent = self.indent);
    }

    fn indent(&mut self, spaces: usize) {
        self.indent += spaces;
    }

    fn dedent(&mut self, spaces: usize) {
        self.indent = self.indent.saturating_sub(spaces);
    }

    fn is_debug(&self) -> bool {
        true
    }
}
