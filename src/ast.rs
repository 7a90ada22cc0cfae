//! # Sift Query Language - Syntax Tree
//!
//! This module defines the two vocabularies shared by the lexer, the decoder
//! and the encoder:
//!
//! - **[tokens]** - flat lexical tokens produced by the lexer
//! - **[items]** - the recursive search-item tree produced by the decoder
//! - **[operators]** - comparison operators (`>`, `>=`, `~`, ...)
//! - **[position]** - 1-based line/column metadata carried by both
//!
//! ## Quick Start
//!
//! ```text
//! status:active created:2020..@today NOT tags:(draft,spam)
//! ```
//!
//! decodes to three top-level items: a pair with a word value, a pair with a
//! range value, and a negated pair whose value is a group holding a list.
//!
//! ## Core Concepts
//!
//! ### Pairs
//!
//! `key:value` scopes a value to a field. The value can be anything the
//! grammar allows, including another comparison, range or group. A key with
//! nothing after the colon has a `NULL` value.
//!
//! ### Values
//!
//! - **Words** - `active`, `2020-01-01`, `@3-days-ago`
//! - **Quotes** - `"new york"`, with `\n`, `\t`, `\u{HEX}` and `\uHHHH` escapes
//! - **Partials** - literals mixed with `*` and `?`: `jo*n`, `"new york"*`
//! - **Pins** - `^other_field`, compares against another field
//!
//! ### Compound values
//!
//! - **Comparisons** - `>10`, `<=5`, `!draft`, `~smith`, `!~bot`
//! - **Ranges** - `1..10`, `2020..`, `..100`, `..`
//! - **Lists** - `a,b,c`
//! - **Groups** - `(a OR b)`
//!
//! ### Logic
//!
//! `AND`, `OR` and `NOT` are case-insensitive words. Juxtaposed items are
//! implicitly conjunctive; the explicit operators fold right:
//!
//! ```text
//! a AND b OR c     =>  And(a, [Or(b, [c])])
//! NOT a b          =>  Not(a), b
//! ```
pub mod items;
pub mod operators;
pub mod position;
pub mod tokens;

pub use items::{ItemKind, SearchItem};
pub use operators::CmpOp;
pub use position::Position;
pub use tokens::{Token, TokenKind};
