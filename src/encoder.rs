//! Rendering search items back to query text.
//!
//! The printer is the inverse of the decoder: for canonical input,
//! `encode(decode(text)) == text`. Canonical here means
//!
//! - a single space between top-level items
//! - `NULL` in upper case
//! - quotes using the escapes the printer emits (`\\`, `\"`, `\.`, `\n`, `\r`,
//!   `\uHHHH` for other line breaks)
//!
//! # Examples
//!
//! ```
//! use sift_lang::{encode, parse};
//!
//! let items = parse("name:jo* age:>=21 tags:a,b").unwrap();
//! assert_eq!(encode(&items), "name:jo* age:>=21 tags:a,b");
//! ```

use std::fmt::{self, Write};

use crate::ast::{ItemKind, SearchItem};
use crate::lexer::{is_newline_like, is_word_char};
use crate::value::Value;

pub struct QueryPrinter<'w, W: Write> {
    out: &'w mut W,
}

/// Render items as a single string.
pub fn encode(items: &[SearchItem]) -> String {
    let mut text = String::new();
    // Writing into a String cannot fail
    let _ = write_items(items, &mut text);
    text
}

/// Render items into any `fmt::Write` sink without building an
/// intermediate string.
pub fn write_items<W: Write>(items: &[SearchItem], out: &mut W) -> fmt::Result {
    QueryPrinter::new(out).print_all(items)
}

impl<'w, W: Write> QueryPrinter<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        QueryPrinter { out }
    }

    /// Items joined by single spaces.
    pub fn print_all(&mut self, items: &[SearchItem]) -> fmt::Result {
        self.print_joined(items, " ")
    }

    fn print_joined(&mut self, items: &[SearchItem], separator: &str) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write_str(separator)?;
            }
            self.print(item)?;
        }
        Ok(())
    }

    pub fn print(&mut self, item: &SearchItem) -> fmt::Result {
        match &item.kind {
            ItemKind::Null => self.out.write_str("NULL"),
            ItemKind::Infinity => Ok(()),
            ItemKind::Wildcard => self.out.write_char('*'),
            ItemKind::AnyChar => self.out.write_char('?'),
            ItemKind::Word(s) => self.out.write_str(s),
            ItemKind::Quote(s) => self.print_quote(s),
            ItemKind::Value(value) => self.print_value(value),
            ItemKind::Pin(inner) => {
                self.out.write_char('^')?;
                self.print(inner)
            }
            ItemKind::Pair { key, value } => {
                self.print(key)?;
                self.out.write_char(':')?;
                self.print(value)
            }
            ItemKind::Cmp { op, value } => {
                self.out.write_str(op.symbol())?;
                self.print(value)
            }
            ItemKind::Range { start, end } => {
                self.print(start)?;
                self.out.write_str("..")?;
                self.print(end)
            }
            ItemKind::List(items) => self.print_joined(items, ","),
            ItemKind::Group(items) => {
                self.out.write_char('(')?;
                self.print_all(items)?;
                self.out.write_char(')')
            }
            ItemKind::Partial(items) => self.print_joined(items, ""),
            ItemKind::And(left, right) => self.print_logical(left, "AND", right),
            ItemKind::Or(left, right) => self.print_logical(left, "OR", right),
            ItemKind::Not(inner) => {
                self.out.write_str("NOT ")?;
                self.print(inner)
            }
        }
    }

    fn print_logical(&mut self, left: &SearchItem, operator: &str, right: &[SearchItem]) -> fmt::Result {
        self.print(left)?;
        write!(self.out, " {} ", operator)?;
        self.print_all(right)
    }

    fn print_value(&mut self, value: &Value) -> fmt::Result {
        let text = value.to_text();
        if is_bare_word(&text) {
            self.out.write_str(&text)
        } else {
            self.print_quote(&text)
        }
    }

    fn print_quote(&mut self, s: &str) -> fmt::Result {
        self.out.write_char('"')?;
        self.out.write_str(&escape_quote(s))?;
        self.out.write_char('"')
    }
}

/// Escape text for use between double quotes.
pub fn escape_quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '.' => result.push_str("\\."),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            c if is_newline_like(c) => {
                let _ = write!(result, "\\u{:04X}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}

/// True when `text` decodes back to a single word with the same text.
pub fn is_bare_word(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(is_word_char)
        && !text.contains("..")
        && !matches!(
            text.to_ascii_uppercase().as_str(),
            "AND" | "OR" | "NOT" | "NULL"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quote() {
        let test_cases = vec![
            ("plain", "plain"),
            ("a.b", "a\\.b"),
            ("say \"hi\"", "say \\\"hi\\\""),
            ("back\\slash", "back\\\\slash"),
            ("two\nlines", "two\\nlines"),
            ("para\u{2029}graph", "para\\u2029graph"),
        ];

        for (input, expected) in test_cases {
            assert_eq!(escape_quote(input), expected, "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_bare_word_detection() {
        assert!(is_bare_word("2020-01-01"));
        assert!(!is_bare_word("18:26:12"));
        assert!(!is_bare_word("1..2"));
        assert!(!is_bare_word("or"));
        assert!(!is_bare_word(""));
    }
}
