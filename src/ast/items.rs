use crate::ast::{CmpOp, Position};
use crate::value::Value;

/// A decoded search item.
///
/// The position records where the item started in the source text. It is
/// ignored by `PartialEq`, so trees decoded from differently spaced text
/// compare equal.
#[derive(Debug, Clone)]
pub struct SearchItem {
    pub kind: ItemKind,
    pub position: Position,
}

impl PartialEq for SearchItem {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// `NULL` in any letter case
    Null,

    /// Open side of a range; renders as nothing
    Infinity,

    /// A lone `*`
    Wildcard,

    /// A lone `?`
    AnyChar,

    /// Bare word
    Word(String),

    /// Quoted string
    Quote(String),

    /// Literal after casting under a schema
    Value(Value),

    /// Reference to another field (`^field`)
    ///
    /// The inner item is a word, a quote, or a value once resolved.
    Pin(Box<SearchItem>),

    /// `key:value`
    Pair {
        key: Box<SearchItem>,
        value: Box<SearchItem>,
    },

    /// Operator-prefixed value (`>=10`)
    Cmp { op: CmpOp, value: Box<SearchItem> },

    /// `start..end`, either side possibly `Infinity`
    Range {
        start: Box<SearchItem>,
        end: Box<SearchItem>,
    },

    /// `a,b,c`
    List(Vec<SearchItem>),

    /// `( ... )`
    Group(Vec<SearchItem>),

    /// Literals interleaved with `*`/`?`, always two or more elements
    ///
    /// # Examples
    /// ```text
    /// jo*n
    /// "new york"*
    /// ?at
    /// ```
    Partial(Vec<SearchItem>),

    /// `left AND rest...`
    ///
    /// The right side is everything that followed the operator, already
    /// compacted.
    And(Box<SearchItem>, Vec<SearchItem>),

    /// `left OR rest...`
    Or(Box<SearchItem>, Vec<SearchItem>),

    /// `NOT item`
    Not(Box<SearchItem>),
}

impl SearchItem {
    pub fn new(kind: ItemKind) -> Self {
        SearchItem {
            kind,
            position: Position::default(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn null() -> Self {
        Self::new(ItemKind::Null)
    }

    pub fn infinity() -> Self {
        Self::new(ItemKind::Infinity)
    }

    pub fn wildcard() -> Self {
        Self::new(ItemKind::Wildcard)
    }

    pub fn any_char() -> Self {
        Self::new(ItemKind::AnyChar)
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self::new(ItemKind::Word(text.into()))
    }

    pub fn quote(text: impl Into<String>) -> Self {
        Self::new(ItemKind::Quote(text.into()))
    }

    pub fn value(value: Value) -> Self {
        Self::new(ItemKind::Value(value))
    }

    pub fn pin(inner: SearchItem) -> Self {
        Self::new(ItemKind::Pin(Box::new(inner)))
    }

    pub fn pair(key: SearchItem, value: SearchItem) -> Self {
        Self::new(ItemKind::Pair {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn cmp(op: CmpOp, value: SearchItem) -> Self {
        Self::new(ItemKind::Cmp {
            op,
            value: Box::new(value),
        })
    }

    pub fn range(start: SearchItem, end: SearchItem) -> Self {
        Self::new(ItemKind::Range {
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    pub fn list(items: Vec<SearchItem>) -> Self {
        Self::new(ItemKind::List(items))
    }

    pub fn group(items: Vec<SearchItem>) -> Self {
        Self::new(ItemKind::Group(items))
    }

    pub fn partial(items: Vec<SearchItem>) -> Self {
        Self::new(ItemKind::Partial(items))
    }

    pub fn and(left: SearchItem, right: Vec<SearchItem>) -> Self {
        Self::new(ItemKind::And(Box::new(left), right))
    }

    pub fn or(left: SearchItem, right: Vec<SearchItem>) -> Self {
        Self::new(ItemKind::Or(Box::new(left), right))
    }

    pub fn not(inner: SearchItem) -> Self {
        Self::new(ItemKind::Not(Box::new(inner)))
    }

    /// Text of a word or quote.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Word(s) | ItemKind::Quote(s) => Some(s),
            _ => None,
        }
    }

    /// True for the items a cast may turn into a `Value`.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ItemKind::Word(_) | ItemKind::Quote(_))
    }

    /// True for items that carry no literal text of their own.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Null | ItemKind::Infinity | ItemKind::Wildcard | ItemKind::AnyChar
        )
    }

    /// Name of the variant, for diagnostics.
    pub fn term_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Null => "null",
            ItemKind::Infinity => "infinity",
            ItemKind::Wildcard => "wildcard",
            ItemKind::AnyChar => "any_char",
            ItemKind::Word(_) => "word",
            ItemKind::Quote(_) => "quote",
            ItemKind::Value(_) => "value",
            ItemKind::Pin(_) => "pin",
            ItemKind::Pair { .. } => "pair",
            ItemKind::Cmp { .. } => "cmp",
            ItemKind::Range { .. } => "range",
            ItemKind::List(_) => "list",
            ItemKind::Group(_) => "group",
            ItemKind::Partial(_) => "partial",
            ItemKind::And(..) => "and",
            ItemKind::Or(..) => "or",
            ItemKind::Not(_) => "not",
        }
    }
}
