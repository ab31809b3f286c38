// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Indentation-aware line builder for generated Java source.

const INDENT: &str = "    ";

/// Accumulates source lines at the current indentation level.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buf: String,
    depth: usize,
}

impl SourceWriter {
    /// Create an empty writer at depth zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    /// Write an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Write `header {`, the body one level deeper, then `}`.
    pub fn block<F>(&mut self, header: impl AsRef<str>, body: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line("}")
    }

    /// Write a Javadoc comment. Multi-line text gets one ` * ` line per line.
    ///
    /// Backslashes are written as `&#92;`: javac decodes `\u` escapes before
    /// it sees comments, so `C:\users` would not compile.
    pub fn javadoc(&mut self, text: &str) -> &mut Self {
        self.line("/**");
        for line in text.lines() {
            let line = line
                .trim_end()
                .replace('\\', "&#92;")
                .replace("*/", "*&#47;");
            if line.is_empty() {
                self.line(" *");
            } else {
                self.line(format!(" * {}", line));
            }
        }
        self.line(" */")
    }

    /// Consume the writer and return the source text.
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Render `value` as a Java string literal.
pub fn java_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Upper-case the first character, as used for accessor names.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
