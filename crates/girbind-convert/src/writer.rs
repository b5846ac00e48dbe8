//! Line-oriented output for emitted conversions.

use tracing::warn;

/// Sink for emitted target code.
///
/// Converters only ever write whole lines; indentation and section breaks are
/// the writer's concern.
pub trait CodeWriter {
    fn line(&mut self, text: &str);

    fn indent(&mut self);

    fn unindent(&mut self);

    /// Separate what follows from what came before with one blank line.
    fn new_section(&mut self);
}

/// Number of spaces per indentation level.
const INDENT_WIDTH: usize = 4;

/// A [`CodeWriter`] collecting into a `String`.
#[derive(Debug, Default, Clone)]
pub struct IndentWriter {
    out: String,
    level: usize,
    section_pending: bool,
}

impl IndentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    /// Emitted lines with indentation trimmed, for assertions.
    pub fn trimmed_lines(&self) -> Vec<&str> {
        self.out.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    }
}

impl CodeWriter for IndentWriter {
    fn line(&mut self, text: &str) {
        if self.section_pending {
            self.out.push('\n');
            self.section_pending = false;
        }
        if !text.is_empty() {
            self.out.extend(std::iter::repeat_n(' ', self.level * INDENT_WIDTH));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn indent(&mut self) {
        self.level += 1;
    }

    fn unindent(&mut self) {
        if self.level == 0 {
            warn!("unbalanced unindent");
            return;
        }
        self.level -= 1;
    }

    fn new_section(&mut self) {
        self.section_pending = !self.out.is_empty();
    }
}

/// Write `header {`, the indented body, then `}`.
pub fn block(w: &mut dyn CodeWriter, header: &str, body: impl FnOnce(&mut dyn CodeWriter)) {
    w.line(&format!("{header} {{"));
    w.indent();
    body(w);
    w.unindent();
    w.line("}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_are_indented() {
        let mut w = IndentWriter::new();
        block(&mut w, "if ok", |w| {
            w.line("a();");
            block(w, "for x in xs", |w| w.line("b(x);"));
        });
        assert_eq!(w.as_str(), "if ok {\n    a();\n    for x in xs {\n        b(x);\n    }\n}\n");
    }

    #[test]
    fn empty_lines_carry_no_indentation() {
        let mut w = IndentWriter::new();
        w.indent();
        w.line("");
        assert_eq!(w.as_str(), "\n");
    }

    #[test]
    fn sections_insert_one_blank_line() {
        let mut w = IndentWriter::new();
        w.new_section();
        w.line("first();");
        w.new_section();
        w.new_section();
        w.line("second();");
        assert_eq!(w.as_str(), "first();\n\nsecond();\n");
    }

    #[test]
    fn unindent_below_zero_is_ignored() {
        let mut w = IndentWriter::new();
        w.unindent();
        w.line("x();");
        assert_eq!(w.as_str(), "x();\n");
    }
}
