use crate::ast::{CmpOp, Position};

/// A lexical token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// End of input
    EndOfStream,

    /// A run of space-like and newline-like characters, kept verbatim
    ///
    /// Spaces separate search items; the decoder never keeps them.
    Space(String),

    /// Double-quoted string with all escapes already resolved
    ///
    /// # Examples
    /// ```text
    /// "hello world"
    /// "tab\there"
    /// "\u{1F600}"
    /// ```
    Quote(String),

    /// Bare word made of letters, digits and `@ - _ .`
    ///
    /// A word never contains `..`; the lexer stops right before it.
    ///
    /// # Examples
    /// ```text
    /// name
    /// 2020-01-01
    /// @3-days-ago
    /// ```
    Word(String),

    /// Comparison operator prefix
    ///
    /// # Examples
    /// ```text
    /// >=10
    /// !~draft
    /// ```
    Cmp(CmpOp),

    /// `*` inside or as a value
    Wildcard,

    /// `?` inside or as a value
    AnyChar,

    /// `:` between key and value
    PairOp,

    /// `..` between range bounds
    RangeOp,

    /// `,` between list items
    ContinuationOp,

    /// `^` in front of a field reference
    Pin,

    /// Tokens between balanced parentheses
    ///
    /// # Examples
    /// ```text
    /// (a OR b)
    /// >=(1,2)
    /// ```
    Group(Vec<Token>),
}

impl TokenKind {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::EndOfStream => "end of input".to_string(),
            TokenKind::Space(_) => "space".to_string(),
            TokenKind::Quote(s) => format!("quote {:?}", s),
            TokenKind::Word(s) => format!("word `{}`", s),
            TokenKind::Cmp(op) => format!("operator `{}`", op.symbol()),
            TokenKind::Wildcard => "`*`".to_string(),
            TokenKind::AnyChar => "`?`".to_string(),
            TokenKind::PairOp => "`:`".to_string(),
            TokenKind::RangeOp => "`..`".to_string(),
            TokenKind::ContinuationOp => "`,`".to_string(),
            TokenKind::Pin => "`^`".to_string(),
            TokenKind::Group(_) => "group".to_string(),
        }
    }
}
