//! Splits SQL script text into standalone statements.
//!
//! The splitter works on whole lines. A statement ends at a line whose
//! comment-stripped text ends with `;`. Lines are joined with a single space,
//! so `SELECT *\nFROM t;` becomes `SELECT * FROM t`.
//!
//! Only `--` truncates a line; `#` is recognised as a full-line comment and
//! nothing else. Neither marker knows about quoting, so a `--` inside a string
//! literal still cuts the line. A trailing fragment that never reaches a `;`
//! is dropped rather than flushed at end of input.

use std::str::Lines;

const LINE_COMMENT: &str = "--";
const HASH_COMMENT: char = '#';

/// Lazily yields the statements of a script, in source order.
pub struct ScriptStatements<'a> {
    lines: Lines<'a>,
    buf: String,
}

impl<'a> ScriptStatements<'a> {
    pub fn new(script: &'a str) -> Self {
        Self {
            lines: script.lines(),
            buf: String::new(),
        }
    }
}

impl Iterator for ScriptStatements<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let Some(line) = strip_line(line) else {
                continue;
            };

            self.buf.push_str(line);
            self.buf.push(' ');

            if !line.ends_with(';') {
                continue;
            }

            let text = self.buf.trim();
            let statement = text.strip_suffix(';').unwrap_or(text).trim_end().to_string();
            self.buf.clear();
            if statement.is_empty() {
                continue;
            }
            return Some(statement);
        }
        None
    }
}

/// Returns the part of `line` that belongs to a statement, if any.
fn strip_line(line: &str) -> Option<&str> {
    let mut line = line.trim();
    if let Some(idx) = line.find(LINE_COMMENT) {
        line = line[..idx].trim();
    }
    if line.is_empty() || line.starts_with(HASH_COMMENT) {
        return None;
    }
    Some(line)
}

pub fn split_script(script: &str) -> Vec<String> {
    ScriptStatements::new(script).collect()
}

/// Whether `statement` holds more SQL after a `;` outside quotes, as in
/// `SELECT 1; DELETE FROM t` written on one line.
pub fn has_trailing_statement(statement: &str) -> bool {
    let mut closing = None;
    for (index, char) in statement.char_indices() {
        if let Some(quote) = closing {
            if char == quote {
                closing = None;
            }
            continue;
        }
        match char {
            '\'' | '"' | '`' => closing = Some(char),
            '[' => closing = Some(']'),
            ';' => {
                return statement[index + 1..]
                    .chars()
                    .any(|c| !c.is_whitespace() && c != ';')
            }
            _ => {}
        }
    }
    false
}
