use thiserror::Error;

use crate::{
    ast::{CmpOp, Position, SearchItem, Token, TokenKind},
    compact::{Part, compact},
    config::DecodeOptions,
    lexer::{LexError, Lexer},
};

/// Errors that can occur while decoding query text.
///
/// No partially decoded items are returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A value was expected but the next token cannot start one
    ///
    /// The classic case is an unquoted time under a comparison,
    /// `inserted_at:<=18:26:12`, where each `:` starts a new pair.
    /// Quoting the value (`<="18:26:12"`) avoids it.
    #[error("no valid value type: unexpected {token} at {position}")]
    NoValidValueType { token: String, position: Position },

    /// An operator was the last thing before a space or end of input
    #[error("expected a value after {after} at {position}")]
    MissingValue { after: String, position: Position },

    /// `AND`, `OR` or `NOT` with nothing to combine
    #[error("`{operator}` at {position} is missing an operand")]
    MissingOperand {
        operator: &'static str,
        position: Position,
    },

    /// Input left over after the last token (strict parsing only)
    #[error("unexpected input {remainder:?} at {position}")]
    TrailingInput { remainder: String, position: Position },

    #[error("nesting deeper than {max_depth} levels at {position}")]
    NestingTooDeep { max_depth: usize, position: Position },
}

/// Result of [`Decoder::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub items: Vec<SearchItem>,
    /// Text the lexer could not tokenize, such as an unmatched `)`.
    pub remainder: String,
    /// Where the remainder starts.
    pub position: Position,
}

/// Lexical tokens after keyword reclassification.
#[derive(Debug, Clone, PartialEq)]
enum Sym {
    Space,
    Word(String),
    Quote(String),
    Null,
    And,
    Or,
    Not,
    Cmp(CmpOp),
    Wildcard,
    AnyChar,
    PairOp,
    RangeOp,
    Continuation,
    Pin,
    Group(Vec<Lexeme>),
}

#[derive(Debug, Clone, PartialEq)]
struct Lexeme {
    sym: Sym,
    position: Position,
}

impl Sym {
    fn describe(&self) -> String {
        match self {
            Sym::Space => "space".to_string(),
            Sym::Word(s) => format!("word `{}`", s),
            Sym::Quote(s) => format!("quote {:?}", s),
            Sym::Null => "`NULL`".to_string(),
            Sym::And => "`AND`".to_string(),
            Sym::Or => "`OR`".to_string(),
            Sym::Not => "`NOT`".to_string(),
            Sym::Cmp(op) => format!("operator `{}`", op.symbol()),
            Sym::Wildcard => "`*`".to_string(),
            Sym::AnyChar => "`?`".to_string(),
            Sym::PairOp => "`:`".to_string(),
            Sym::RangeOp => "`..`".to_string(),
            Sym::Continuation => "`,`".to_string(),
            Sym::Pin => "`^`".to_string(),
            Sym::Group(_) => "group".to_string(),
        }
    }

    fn is_accumulable(&self) -> bool {
        matches!(
            self,
            Sym::Word(_) | Sym::Quote(_) | Sym::Wildcard | Sym::AnyChar
        )
    }
}

/// Turn `AND`/`OR`/`NOT`/`NULL` words (any case) into markers.
fn reclassify(tokens: Vec<Token>) -> Vec<Lexeme> {
    tokens
        .into_iter()
        .filter(|token| token.kind != TokenKind::EndOfStream)
        .map(|token| {
            let sym = match token.kind {
                TokenKind::Word(word) => match word.to_ascii_uppercase().as_str() {
                    "AND" => Sym::And,
                    "OR" => Sym::Or,
                    "NOT" => Sym::Not,
                    "NULL" => Sym::Null,
                    _ => Sym::Word(word),
                },
                TokenKind::EndOfStream | TokenKind::Space(_) => Sym::Space,
                TokenKind::Quote(s) => Sym::Quote(s),
                TokenKind::Cmp(op) => Sym::Cmp(op),
                TokenKind::Wildcard => Sym::Wildcard,
                TokenKind::AnyChar => Sym::AnyChar,
                TokenKind::PairOp => Sym::PairOp,
                TokenKind::RangeOp => Sym::RangeOp,
                TokenKind::ContinuationOp => Sym::Continuation,
                TokenKind::Pin => Sym::Pin,
                TokenKind::Group(inner) => Sym::Group(reclassify(inner)),
            };
            Lexeme {
                sym,
                position: token.position,
            }
        })
        .collect()
}

fn skip_spaces(mut lexemes: &[Lexeme]) -> &[Lexeme] {
    while let Some((Lexeme { sym: Sym::Space, .. }, rest)) = lexemes.split_first() {
        lexemes = rest;
    }
    lexemes
}

type Step<'a> = (SearchItem, &'a [Lexeme]);

pub struct Decoder {
    options: DecodeOptions,
    depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode `text` with default options.
pub fn decode(text: &str) -> Result<Decoded, ParseError> {
    Decoder::new().decode(text)
}

/// Decode `text`, failing if any of it is left over.
pub fn parse(text: &str) -> Result<Vec<SearchItem>, ParseError> {
    Decoder::new().parse(text)
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Decoder { options, depth: 0 }
    }

    /// Tokenize and decode `text` into compacted search items.
    ///
    /// Tokenizing stops at the first character that cannot start a token;
    /// whatever follows is handed back as the remainder.
    pub fn decode(&mut self, text: &str) -> Result<Decoded, ParseError> {
        let tokenized = Lexer::with_options(text, self.options).tokenize_all()?;
        let token_count = tokenized.tokens.len();
        let lexemes = reclassify(tokenized.tokens);

        self.depth = 0;
        let items = self.decode_sequence(&lexemes)?;
        log::debug!(
            "decoded {} items from {} tokens ({} chars left)",
            items.len(),
            token_count,
            tokenized.remainder.chars().count()
        );

        Ok(Decoded {
            items,
            remainder: tokenized.remainder,
            position: tokenized.position,
        })
    }

    /// Like [`Decoder::decode`], but leftover input is an error.
    pub fn parse(&mut self, text: &str) -> Result<Vec<SearchItem>, ParseError> {
        let decoded = self.decode(text)?;
        if decoded.remainder.is_empty() {
            Ok(decoded.items)
        } else {
            Err(ParseError::TrailingInput {
                remainder: decoded.remainder,
                position: decoded.position,
            })
        }
    }

    /// Decode every lexeme, then fold the logical markers.
    ///
    /// Each `AND`/`OR`/`NOT` nests the terms after it one level deeper, so
    /// the markers count against `max_depth` like groups do.
    fn decode_sequence(&mut self, rest: &[Lexeme]) -> Result<Vec<SearchItem>, ParseError> {
        let markers: Vec<Position> = rest
            .iter()
            .filter(|l| matches!(l.sym, Sym::And | Sym::Or | Sym::Not))
            .map(|l| l.position)
            .collect();
        let budget = self.options.max_depth.saturating_sub(self.depth);
        if let Some(position) = markers.get(budget) {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.options.max_depth,
                position: *position,
            });
        }

        self.depth += markers.len();
        let parts = self.decode_parts(rest);
        self.depth -= markers.len();

        compact(parts?)
    }

    fn decode_parts(&mut self, mut rest: &[Lexeme]) -> Result<Vec<Part>, ParseError> {
        let mut parts = Vec::new();

        loop {
            rest = skip_spaces(rest);
            let Some(first) = rest.first() else {
                break;
            };
            match first.sym {
                Sym::And => {
                    parts.push(Part::And(first.position));
                    rest = &rest[1..];
                }
                Sym::Or => {
                    parts.push(Part::Or(first.position));
                    rest = &rest[1..];
                }
                Sym::Not => {
                    parts.push(Part::Not(first.position));
                    rest = &rest[1..];
                }
                _ => {
                    let (item, after) = self.decode_token(rest)?;
                    parts.push(Part::Item(item));
                    rest = after;
                }
            }
        }

        Ok(parts)
    }

    /// Decode one search item from the front of `lexemes`.
    fn decode_token<'a>(&mut self, lexemes: &'a [Lexeme]) -> Result<Step<'a>, ParseError> {
        let Some((first, rest)) = lexemes.split_first() else {
            return Err(ParseError::MissingValue {
                after: "end of input".to_string(),
                position: Position::default(),
            });
        };
        let position = first.position;

        match (&first.sym, rest.first().map(|l| &l.sym)) {
            (Sym::Group(inner), _) => {
                let items = self.decode_group(inner, position)?;
                Ok((SearchItem::group(items).at(position), rest))
            }
            (Sym::Word(_) | Sym::Quote(_), Some(Sym::PairOp)) => self.decode_pair(first, &rest[1..]),
            (Sym::Cmp(op), _) => {
                let (value, after) = self.require_value(rest, first)?;
                Ok((SearchItem::cmp(*op, value).at(position), after))
            }
            (Sym::RangeOp, _) => match self.decode_value(rest)? {
                None => Ok((
                    SearchItem::range(SearchItem::infinity(), SearchItem::infinity()).at(position),
                    rest,
                )),
                Some((end, after)) => Ok((
                    SearchItem::range(SearchItem::infinity(), end).at(position),
                    after,
                )),
            },
            _ => {
                let (value, after) = self.require_value(lexemes, first)?;
                self.decode_suffix(value, after)
            }
        }
    }

    fn decode_pair<'a>(&mut self, key: &Lexeme, rest: &'a [Lexeme]) -> Result<Step<'a>, ParseError> {
        let key_item = match &key.sym {
            Sym::Quote(s) => SearchItem::quote(s.clone()),
            Sym::Word(s) => SearchItem::word(s.clone()),
            other => {
                return Err(ParseError::NoValidValueType {
                    token: other.describe(),
                    position: key.position,
                });
            }
        }
        .at(key.position);

        let value_starts = matches!(rest.first(), Some(l) if l.sym != Sym::Space);
        if !value_starts {
            let pair = SearchItem::pair(key_item, SearchItem::null().at(key.position));
            return Ok((pair.at(key.position), rest));
        }

        self.enter(key.position)?;
        let decoded = self.decode_token(rest);
        self.depth -= 1;
        let (value, after) = decoded?;

        Ok((SearchItem::pair(key_item, value).at(key.position), after))
    }

    /// Range and list continuations after a leading value.
    fn decode_suffix<'a>(&mut self, value: SearchItem, rest: &'a [Lexeme]) -> Result<Step<'a>, ParseError> {
        let position = value.position;
        match rest.first().map(|l| &l.sym) {
            Some(Sym::RangeOp) => match self.decode_value(&rest[1..])? {
                None => Ok((
                    SearchItem::range(value, SearchItem::infinity()).at(position),
                    &rest[1..],
                )),
                Some((end, after)) => Ok((SearchItem::range(value, end).at(position), after)),
            },
            Some(Sym::Continuation) => {
                let (items, after) = self.decode_list(value, &rest[1..])?;
                Ok((SearchItem::list(items).at(position), after))
            }
            _ => Ok((value, rest)),
        }
    }

    fn decode_list<'a>(
        &mut self,
        first: SearchItem,
        mut rest: &'a [Lexeme],
    ) -> Result<(Vec<SearchItem>, &'a [Lexeme]), ParseError> {
        let mut items = vec![first];

        while let Some((item, after)) = self.decode_value(rest)? {
            items.push(item);
            rest = after;
            match rest.split_first() {
                Some((Lexeme { sym: Sym::Continuation, .. }, tail)) => rest = tail,
                _ => break,
            }
        }

        Ok((items, rest))
    }

    fn require_value<'a>(&mut self, lexemes: &'a [Lexeme], after: &Lexeme) -> Result<Step<'a>, ParseError> {
        self.decode_value(lexemes)?.ok_or_else(|| ParseError::MissingValue {
            after: after.sym.describe(),
            position: after.position,
        })
    }

    /// Decode a bare value: a literal, a partial, a pin, `NULL` or a group.
    ///
    /// Returns `None` at a space or at end of input.
    fn decode_value<'a>(&mut self, lexemes: &'a [Lexeme]) -> Result<Option<Step<'a>>, ParseError> {
        let Some((first, rest)) = lexemes.split_first() else {
            return Ok(None);
        };
        let position = first.position;

        let step = match &first.sym {
            Sym::Space => return Ok(None),
            Sym::Null => (SearchItem::null().at(position), rest),
            Sym::Group(inner) => {
                let items = self.decode_group(inner, position)?;
                (SearchItem::group(items).at(position), rest)
            }
            Sym::Pin => match rest.split_first() {
                Some((target, after)) => {
                    let inner = match &target.sym {
                        Sym::Word(s) => SearchItem::word(s.clone()),
                        Sym::Quote(s) => SearchItem::quote(s.clone()),
                        other => {
                            return Err(ParseError::NoValidValueType {
                                token: other.describe(),
                                position: target.position,
                            });
                        }
                    };
                    (SearchItem::pin(inner.at(target.position)).at(position), after)
                }
                None => {
                    return Err(ParseError::MissingValue {
                        after: first.sym.describe(),
                        position,
                    });
                }
            },
            sym if sym.is_accumulable() => {
                let count = lexemes.iter().take_while(|l| l.sym.is_accumulable()).count();
                let mut parts: Vec<SearchItem> = lexemes[..count].iter().map(literal).collect();
                let item = if parts.len() == 1 {
                    parts.remove(0)
                } else {
                    SearchItem::partial(parts).at(position)
                };
                (item, &lexemes[count..])
            }
            other => {
                return Err(ParseError::NoValidValueType {
                    token: other.describe(),
                    position,
                });
            }
        };

        Ok(Some(step))
    }

    fn decode_group(&mut self, inner: &[Lexeme], position: Position) -> Result<Vec<SearchItem>, ParseError> {
        self.enter(position)?;
        let items = self.decode_sequence(inner);
        self.depth -= 1;
        items
    }

    fn enter(&mut self, position: Position) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.options.max_depth,
                position,
            });
        }
        self.depth += 1;
        Ok(())
    }
}

/// Item for a single accumulable lexeme.
fn literal(lexeme: &Lexeme) -> SearchItem {
    let item = match &lexeme.sym {
        Sym::Word(s) => SearchItem::word(s.clone()),
        Sym::Quote(s) => SearchItem::quote(s.clone()),
        Sym::Wildcard => SearchItem::wildcard(),
        _ => SearchItem::any_char(),
    };
    item.at(lexeme.position)
}
