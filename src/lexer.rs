use thiserror::Error;

use crate::ast::{CmpOp, Position, Token, TokenKind};
use crate::config::DecodeOptions;

/// Errors raised while tokenizing.
///
/// Every variant carries the text that was not consumed so callers can show
/// context around the failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unterminated quote starting at {position}")]
    UnterminatedQuote {
        position: Position,
        partial: String,
        remainder: String,
    },

    #[error("invalid unicode escape `{escape}` at {position}")]
    InvalidUnicodeEscape {
        position: Position,
        escape: String,
        remainder: String,
    },

    #[error("unterminated group starting at {position}")]
    UnterminatedGroup {
        position: Position,
        contents: Vec<Token>,
        remainder: String,
    },

    #[error("groups nested deeper than {max_depth} levels at {position}")]
    NestingTooDeep { position: Position, max_depth: usize },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedQuote { position, .. }
            | LexError::InvalidUnicodeEscape { position, .. }
            | LexError::UnterminatedGroup { position, .. }
            | LexError::NestingTooDeep { position, .. } => *position,
        }
    }
}

/// Result of [`Lexer::tokenize_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    /// Where tokenizing stopped.
    pub position: Position,
    /// Input left over when a character could not start any token.
    pub remainder: String,
}

pub struct Lexer {
    input: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    depth: usize,
    max_depth: usize,
}

/// Tokenize `input` with default options.
pub fn tokenize(input: &str) -> Result<Tokenized, LexError> {
    Lexer::new(input).tokenize_all()
}

/// Spaces other than line breaks, including the Unicode space separators.
pub fn is_space_like(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{180E}'
            | '\u{2000}'..='\u{200B}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub fn is_newline_like(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

/// Characters allowed inside a bare word.
pub fn is_word_char(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_alphanumeric() || matches!(ch, '@' | '-' | '_' | '.');
    }
    if is_space_like(ch) || is_newline_like(ch) {
        return false;
    }
    let code = ch as u32;
    match code {
        // Latin-1 letters, skipping the multiplication and division signs
        0x00C0..=0x00D6 | 0x00D8..=0x00F6 | 0x00F8..=0x00FF => true,
        // Latin Extended-A/B, IPA, Greek, Cyrillic and supplement
        0x0100..=0x024F | 0x0250..=0x02AF | 0x0370..=0x03FF | 0x0400..=0x052F => true,
        // Private use and everything above
        0xE000.. => true,
        _ => ch.is_alphanumeric(),
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_options(input, DecodeOptions::default())
    }

    pub fn with_options(input: &str, options: DecodeOptions) -> Self {
        Lexer {
            input: input.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.index).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.index + offset).copied()
    }

    fn advance(&mut self) {
        let Some(ch) = self.current_char() else {
            return;
        };
        self.index += 1;

        if ch == '\r' && self.current_char() == Some('\n') {
            // the following '\n' finishes the line break
            return;
        }
        if is_newline_like(ch) {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn remainder_from(&self, index: usize) -> String {
        self.input[index.min(self.input.len())..].iter().collect()
    }

    pub fn remainder(&self) -> String {
        self.remainder_from(self.index)
    }

    /// Tokenize as far as possible.
    ///
    /// Stops at end of input or at the first character no token can start
    /// with (a stray `)` for instance); the rest of the input is returned as
    /// the remainder.
    pub fn tokenize_all(&mut self) -> Result<Tokenized, LexError> {
        let tokens = self.tokenize_sequence()?;
        log::trace!(
            "tokenized {} tokens, stopped at {} with {} chars left",
            tokens.len(),
            self.position(),
            self.input.len() - self.index
        );
        Ok(Tokenized {
            tokens,
            position: self.position(),
            remainder: self.remainder(),
        })
    }

    fn tokenize_sequence(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            if token.kind == TokenKind::EndOfStream {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Read the next token.
    ///
    /// Returns `Ok(None)` when the current character cannot start a token.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let position = self.position();
        let Some(ch) = self.current_char() else {
            return Ok(Some(Token::new(TokenKind::EndOfStream, position)));
        };

        let kind = match ch {
            c if is_space_like(c) || is_newline_like(c) => TokenKind::Space(self.read_space()),
            '"' => TokenKind::Quote(self.read_quote()?),
            '^' => self.single(TokenKind::Pin),
            '>' if self.peek_char(1) == Some('=') => self.double(TokenKind::Cmp(CmpOp::Gte)),
            '<' if self.peek_char(1) == Some('=') => self.double(TokenKind::Cmp(CmpOp::Lte)),
            '!' if self.peek_char(1) == Some('~') => self.double(TokenKind::Cmp(CmpOp::NFuzz)),
            '>' => self.single(TokenKind::Cmp(CmpOp::Gt)),
            '<' => self.single(TokenKind::Cmp(CmpOp::Lt)),
            '!' => self.single(TokenKind::Cmp(CmpOp::Neq)),
            '=' => self.single(TokenKind::Cmp(CmpOp::Eq)),
            '~' => self.single(TokenKind::Cmp(CmpOp::Fuzz)),
            '(' => self.read_group()?,
            '*' => self.single(TokenKind::Wildcard),
            '?' => self.single(TokenKind::AnyChar),
            ':' => self.single(TokenKind::PairOp),
            '.' if self.peek_char(1) == Some('.') => self.double(TokenKind::RangeOp),
            ',' => self.single(TokenKind::ContinuationOp),
            _ => {
                let word = self.read_word();
                if word.is_empty() {
                    return Ok(None);
                }
                TokenKind::Word(word)
            }
        };

        Ok(Some(Token::new(kind, position)))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn double(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        self.advance();
        kind
    }

    fn read_space(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_space_like(ch) || is_newline_like(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '.' && self.peek_char(1) == Some('.') {
                break;
            }
            if !is_word_char(ch) {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    fn read_group(&mut self) -> Result<TokenKind, LexError> {
        let position = self.position();
        let start = self.index;
        if self.depth >= self.max_depth {
            return Err(LexError::NestingTooDeep {
                position,
                max_depth: self.max_depth,
            });
        }
        self.advance(); // Consume '('

        self.depth += 1;
        let contents = self.tokenize_sequence();
        self.depth -= 1;
        let contents = contents?;

        if self.current_char() == Some(')') {
            self.advance();
            Ok(TokenKind::Group(contents))
        } else {
            Err(LexError::UnterminatedGroup {
                position,
                contents,
                remainder: self.remainder_from(start),
            })
        }
    }

    fn read_quote(&mut self) -> Result<String, LexError> {
        let position = self.position();
        let start = self.index;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_position = self.position();
                    let escape_start = self.index;
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        None => break,
                        Some('u') => {
                            self.advance();
                            let decoded = self.read_unicode_escape(escape_position, escape_start)?;
                            result.push(decoded);
                        }
                        Some(escaped) => {
                            result.push(unescape(escaped));
                            self.advance();
                        }
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedQuote {
            position,
            partial: result,
            remainder: self.remainder_from(start),
        })
    }

    /// Decode the part of `\u{HEX}` or `\uHHHH` after the `u`.
    ///
    /// A `\uHHHH` high surrogate must be followed by a `\uHHHH` low surrogate.
    fn read_unicode_escape(
        &mut self,
        position: Position,
        start: usize,
    ) -> Result<char, LexError> {
        let code = if self.current_char() == Some('{') {
            self.advance();
            let mut hex = String::new();
            while let Some(ch) = self.current_char() {
                if ch == '}' {
                    break;
                }
                hex.push(ch);
                self.advance();
            }
            if self.current_char() != Some('}') || hex.is_empty() || hex.len() > 6 {
                return Err(self.invalid_escape(position, start));
            }
            self.advance(); // Consume '}'
            u32::from_str_radix(&hex, 16).map_err(|_| self.invalid_escape(position, start))?
        } else {
            let high = self.read_hex4(position, start)?;
            if (0xD800..0xDC00).contains(&high) {
                if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
                    return Err(self.invalid_escape(position, start));
                }
                self.advance();
                self.advance();
                let low = self.read_hex4(position, start)?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(self.invalid_escape(position, start));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            } else {
                high
            }
        };

        char::from_u32(code).ok_or_else(|| self.invalid_escape(position, start))
    }

    fn read_hex4(&mut self, position: Position, start: usize) -> Result<u32, LexError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.invalid_escape(position, start))?;
            code = code * 16 + digit;
            self.advance();
        }
        Ok(code)
    }

    fn invalid_escape(&self, position: Position, start: usize) -> LexError {
        let end = (self.index + 1).min(self.input.len());
        LexError::InvalidUnicodeEscape {
            position,
            escape: self.input[start..end].iter().collect(),
            remainder: self.remainder_from(start),
        }
    }
}

fn unescape(ch: char) -> char {
    match ch {
        '0' => '\0',
        'n' => '\n',
        'f' => '\u{000C}',
        'b' => '\u{0008}',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{000B}',
        's' => ' ',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_word_stops_before_range() {
        assert_eq!(
            kinds("1.5..2"),
            vec![
                TokenKind::Word("1.5".into()),
                TokenKind::RangeOp,
                TokenKind::Word("2".into()),
            ]
        );
    }

    #[test]
    fn test_crlf_counts_as_one_line() {
        let tokens = tokenize("a\r\nb\rc").unwrap().tokens;
        assert_eq!(tokens[2].position, Position::new(2, 1));
        assert_eq!(tokens[4].position, Position::new(3, 1));
    }

    #[test]
    fn test_stray_paren_ends_tokenizing() {
        let result = tokenize("a) b").unwrap();
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.remainder, ") b");
        assert_eq!(result.position, Position::new(1, 2));
    }
}
