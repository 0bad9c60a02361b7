//! Forward-only document cursor.
//!
//! Exposes a JSON document as an on-demand stream: the consumer peeks the
//! current node's type in O(1), then either extracts a scalar or iterates
//! an object/array, recursing into children as they are discovered. Nothing
//! is buffered ahead of the consumer and no node is visited twice, which is
//! what lets validation interleave with parsing.
//!
//! Grammar enforcement (commas, colons, closing brackets, a single
//! top-level value) lives here; token-level concerns live in [`Lexer`].

use super::lexer::{Lexer, Token};
use super::limits::Limits;
use super::types::JsonType;
use crate::error::{Error, SieveResult};

/// A forward-only cursor over one JSON document.
///
/// The cursor keeps one token of lookahead. It borrows the input buffer
/// for its whole lifetime; create one per document.
pub struct Cursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: u64,
    max_depth: u64,
}

impl<'a> Cursor<'a> {
    /// Open a cursor over `input`.
    ///
    /// Validates UTF-8 and the input size limit up front and primes the
    /// first token.
    pub fn new(input: &'a [u8], limits: &Limits) -> SieveResult<Self> {
        let mut lexer = Lexer::new(input, limits)?;
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
            max_depth: limits.max_nesting_depth,
        })
    }

    /// The JSON type of the current node, without advancing.
    ///
    /// Never reports [`JsonType::Integer`]; whole and fractional numbers
    /// alike peek as `Number`. Fails when the cursor is not positioned on
    /// a value (end of input, or a structural token out of place).
    pub fn peek_type(&self) -> SieveResult<JsonType> {
        match &self.current {
            Token::String(_) => Ok(JsonType::String),
            Token::Number(_) => Ok(JsonType::Number),
            Token::True | Token::False => Ok(JsonType::Boolean),
            Token::Null => Ok(JsonType::Null),
            Token::LeftBrace => Ok(JsonType::Object),
            Token::LeftBracket => Ok(JsonType::Array),
            _ => Err(Error::InvalidJson),
        }
    }

    /// Advance the lookahead token.
    fn bump(&mut self) -> SieveResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Consume the current node as a string.
    pub fn take_string(&mut self) -> SieveResult<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::String(s) => {
                self.bump()?;
                Ok(s)
            }
            other => {
                self.current = other;
                Err(Error::InvalidJson)
            }
        }
    }

    /// Consume the current node as a number, returning the raw token text.
    ///
    /// The integer-then-double extraction discipline belongs to the
    /// consumer: a token containing a fraction or exponent never parses as
    /// `i64`, so `text.parse::<i64>()` succeeding identifies a whole-number
    /// token.
    pub fn take_number(&mut self) -> SieveResult<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Number(raw) => {
                self.bump()?;
                Ok(raw)
            }
            other => {
                self.current = other;
                Err(Error::InvalidJson)
            }
        }
    }

    /// Consume the current node as a boolean.
    pub fn take_bool(&mut self) -> SieveResult<bool> {
        let value = match self.current {
            Token::True => true,
            Token::False => false,
            _ => return Err(Error::InvalidJson),
        };
        self.bump()?;
        Ok(value)
    }

    /// Consume the current node as null.
    pub fn take_null(&mut self) -> SieveResult<()> {
        if self.current != Token::Null {
            return Err(Error::InvalidJson);
        }
        self.bump()
    }

    /// Enter the current node as an object.
    pub fn begin_object(&mut self) -> SieveResult<()> {
        if self.current != Token::LeftBrace {
            return Err(Error::InvalidJson);
        }
        self.enter()?;
        self.bump()
    }

    /// The next field key of the object being iterated, or `None` once the
    /// closing brace has been consumed.
    ///
    /// Pass `first = true` for the call immediately after
    /// [`Cursor::begin_object`]; afterwards the cursor expects a comma
    /// between fields. After `Some(key)` the cursor is positioned on the
    /// field's value, which the caller must consume before asking for the
    /// next key.
    pub fn next_key(&mut self, first: bool) -> SieveResult<Option<String>> {
        if self.current == Token::RightBrace {
            self.leave();
            self.bump()?;
            return Ok(None);
        }

        if !first {
            if self.current != Token::Comma {
                return Err(Error::InvalidJson);
            }
            self.bump()?;
        }

        let key = match std::mem::replace(&mut self.current, Token::Eof) {
            Token::String(s) => s,
            other => {
                self.current = other;
                return Err(Error::InvalidJson);
            }
        };
        self.bump()?;

        if self.current != Token::Colon {
            return Err(Error::InvalidJson);
        }
        self.bump()?;

        Ok(Some(key))
    }

    /// Enter the current node as an array.
    pub fn begin_array(&mut self) -> SieveResult<()> {
        if self.current != Token::LeftBracket {
            return Err(Error::InvalidJson);
        }
        self.enter()?;
        self.bump()
    }

    /// Whether another element follows in the array being iterated.
    ///
    /// Pass `first = true` for the call immediately after
    /// [`Cursor::begin_array`]. On `true` the cursor is positioned on the
    /// element, which the caller must consume before asking again; on
    /// `false` the closing bracket has been consumed.
    pub fn next_element(&mut self, first: bool) -> SieveResult<bool> {
        if self.current == Token::RightBracket {
            self.leave();
            self.bump()?;
            return Ok(false);
        }

        if !first {
            if self.current != Token::Comma {
                return Err(Error::InvalidJson);
            }
            self.bump()?;
        }

        Ok(true)
    }

    /// Require end of input after the root value.
    pub fn finish(&self) -> SieveResult<()> {
        if self.current != Token::Eof {
            return Err(Error::InvalidJson);
        }
        Ok(())
    }

    fn enter(&mut self) -> SieveResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::NestingTooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
