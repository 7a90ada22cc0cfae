//! A Lucene-style search query language.
//!
//! Query text is decoded into a tree of [`SearchItem`]s, which can be
//! encoded back to text, cast under a [`Schema`], turned into a backend
//! predicate through [`filter::PredicateBuilder`], or matched directly
//! against JSON documents.
//!
//! ```
//! use sift_lang::{ItemKind, encode, parse};
//!
//! let items = parse("status:open age:18..").unwrap();
//! assert!(matches!(items[1].kind, ItemKind::Pair { .. }));
//! assert_eq!(encode(&items), "status:open age:18..");
//! ```

pub mod ast;
mod compact;
pub mod config;
pub mod encoder;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod mapper;
pub mod parser;
pub mod schema;
pub mod temporal;
pub mod transform;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{CmpOp, ItemKind, Position, SearchItem, Token, TokenKind};
pub use config::{DEFAULT_MAX_DEPTH, DecodeOptions, TransformContext};
pub use encoder::{QueryPrinter, encode, write_items};
pub use evaluator::{EvalError, JsonEvaluator, Matcher, compile};
pub use filter::PredicateBuilder;
pub use lexer::{LexError, Lexer, tokenize};
pub use mapper::{MapError, QueryItem, QueryKey, query_list_to_search_list, search_list_to_query_list};
pub use parser::{Decoded, Decoder, ParseError, decode, parse};
pub use schema::{EnumDef, FieldRule, FieldSpec, Kind, Schema, SchemaError};
pub use temporal::{Bound, TemporalError, TemporalKind};
pub use transform::{TransformError, materialize_bounds, transform, transform_pair};
pub use value::Value;
