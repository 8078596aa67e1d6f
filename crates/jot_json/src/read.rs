use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::error::JsonError;
use crate::scope::Scope;

// -----------------------------------------------------------------------------
// JsonToken

/// Kind of the next item a [`JsonReader`] will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonToken {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    /// An object member name.
    Name,
    String,
    Number,
    Boolean,
    Null,
    /// End of the top-level value.
    EndDocument,
}

// -----------------------------------------------------------------------------
// Peeked

/// Buffered lookahead: the full decoded token, not just its kind.
#[derive(Debug, Clone)]
enum Peeked {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    True,
    False,
    Null,
    EndDocument,
    /// A number literal, retained verbatim as a span into the source.
    Number { start: usize, end: usize },
    Str(String),
    Name(String),
}

impl Peeked {
    fn token(&self) -> JsonToken {
        match self {
            Self::BeginArray => JsonToken::BeginArray,
            Self::EndArray => JsonToken::EndArray,
            Self::BeginObject => JsonToken::BeginObject,
            Self::EndObject => JsonToken::EndObject,
            Self::True | Self::False => JsonToken::Boolean,
            Self::Null => JsonToken::Null,
            Self::EndDocument => JsonToken::EndDocument,
            Self::Number { .. } => JsonToken::Number,
            Self::Str(_) => JsonToken::String,
            Self::Name(_) => JsonToken::Name,
        }
    }
}

// -----------------------------------------------------------------------------
// JsonReader

/// Pull cursor over JSON text.
///
/// Tokens are consumed one at a time through `begin_*`/`end_*`/`next_*`;
/// [`JsonReader::peek`] reports the next token without consuming it. A
/// [`Scope`] stack enforces the grammar: an ill-placed call fails without
/// consuming input or mutating the stack.
///
/// Strict mode (the default) accepts only RFC 8259 JSON. Lenient mode
/// additionally accepts comments (`//`, `/* */`, `#`), single-quoted and
/// unquoted strings and names, `NaN`/`Infinity`/`-Infinity`, leading `+` on
/// numbers, trailing commas, `=`/`=>` for `:`, `;` for `,`, and multiple
/// top-level values.
pub struct JsonReader<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    lenient: bool,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
}

impl<'a> JsonReader<'a> {
    /// Creates a strict reader over `src`.
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            line_start: 0,
            lenient: false,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
        }
    }

    /// Creates a lenient reader over `src`.
    pub fn lenient(src: &'a str) -> Self {
        let mut reader = Self::new(src);
        reader.lenient = true;
        reader
    }

    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// The scope currently on top of the stack.
    pub fn scope(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::Closed)
    }

    // ------------------------------------------------------------------------
    // Token consumption

    /// Reports the kind of the next token without consuming it.
    pub fn peek(&mut self) -> Result<JsonToken, JsonError> {
        self.fill_peek()?;
        match self.peeked.as_ref() {
            Some(p) => Ok(p.token()),
            None => Err(JsonError::Closed),
        }
    }

    /// Consumes the opening `[` of an array and enters its scope.
    pub fn begin_array(&mut self) -> Result<(), JsonError> {
        self.expect(JsonToken::BeginArray)?;
        self.stack.push(Scope::EmptyArray);
        Ok(())
    }

    /// Consumes the closing `]` of the current array and leaves its scope.
    pub fn end_array(&mut self) -> Result<(), JsonError> {
        self.expect(JsonToken::EndArray)?;
        self.stack.pop();
        Ok(())
    }

    /// Consumes the opening `{` of an object and enters its scope.
    pub fn begin_object(&mut self) -> Result<(), JsonError> {
        self.expect(JsonToken::BeginObject)?;
        self.stack.push(Scope::EmptyObject);
        Ok(())
    }

    /// Consumes the closing `}` of the current object and leaves its scope.
    pub fn end_object(&mut self) -> Result<(), JsonError> {
        self.expect(JsonToken::EndObject)?;
        self.stack.pop();
        Ok(())
    }

    /// Whether the current array or object has another element or member.
    pub fn has_next(&mut self) -> Result<bool, JsonError> {
        let token = self.peek()?;
        Ok(!matches!(
            token,
            JsonToken::EndArray | JsonToken::EndObject | JsonToken::EndDocument,
        ))
    }

    /// Consumes the next object member name.
    pub fn next_name(&mut self) -> Result<String, JsonError> {
        match self.expect(JsonToken::Name)? {
            Peeked::Name(name) => Ok(name),
            _ => Err(JsonError::scope("token buffer out of sync")),
        }
    }

    /// Consumes the next string value.
    ///
    /// A number token is accepted as well and yields its verbatim text.
    pub fn next_string(&mut self) -> Result<String, JsonError> {
        self.fill_peek()?;
        match self.peeked.take() {
            Some(Peeked::Str(s)) => Ok(s),
            Some(Peeked::Number { start, end }) => Ok(self.src[start..end].to_string()),
            Some(other) => {
                let found = other.token();
                self.peeked = Some(other);
                Err(self.unexpected(JsonToken::String, found))
            },
            None => Err(JsonError::Closed),
        }
    }

    /// Consumes the next boolean value.
    pub fn next_bool(&mut self) -> Result<bool, JsonError> {
        match self.expect(JsonToken::Boolean)? {
            Peeked::True => Ok(true),
            Peeked::False => Ok(false),
            _ => Err(JsonError::scope("token buffer out of sync")),
        }
    }

    /// Consumes the next `null` value.
    pub fn next_null(&mut self) -> Result<(), JsonError> {
        self.expect(JsonToken::Null)?;
        Ok(())
    }

    /// Consumes the next number and yields its verbatim source text.
    pub fn next_number(&mut self) -> Result<&'a str, JsonError> {
        self.fill_peek()?;
        let src = self.src;
        match self.peeked.take() {
            Some(Peeked::Number { start, end }) => Ok(&src[start..end]),
            Some(other) => {
                let found = other.token();
                self.peeked = Some(other);
                Err(self.unexpected(JsonToken::Number, found))
            },
            None => Err(JsonError::Closed),
        }
    }

    /// Consumes the next number as an `i64`.
    ///
    /// Exact integral values written in float notation (`1e3`) are accepted;
    /// anything lossy or out of range is an error, never a truncation.
    pub fn next_i64(&mut self) -> Result<i64, JsonError> {
        let text = self.next_numeric_text()?;
        if let Ok(v) = text.parse::<i64>() {
            return Ok(v);
        }
        if let Ok(d) = text.parse::<f64>() {
            let v = d as i64;
            if (v as f64) == d && d.is_finite() {
                return Ok(v);
            }
        }
        Err(JsonError::NumberRange { text, target: "i64" })
    }

    /// Consumes the next number as a `u64`, with the same exactness rules as
    /// [`JsonReader::next_i64`].
    pub fn next_u64(&mut self) -> Result<u64, JsonError> {
        let text = self.next_numeric_text()?;
        if let Ok(v) = text.parse::<u64>() {
            return Ok(v);
        }
        if let Ok(d) = text.parse::<f64>() {
            let v = d as u64;
            if (v as f64) == d && d.is_finite() && d >= 0.0 {
                return Ok(v);
            }
        }
        Err(JsonError::NumberRange { text, target: "u64" })
    }

    /// Consumes the next number as an `f64`.
    pub fn next_f64(&mut self) -> Result<f64, JsonError> {
        let text = self.next_numeric_text()?;
        match text.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            t => t
                .parse::<f64>()
                .map_err(|_| JsonError::NumberRange { text: t.to_string(), target: "f64" }),
        }
    }

    /// Consumes and discards the next value, including whole subtrees.
    pub fn skip_value(&mut self) -> Result<(), JsonError> {
        let mut depth = 0_usize;
        loop {
            match self.peek()? {
                JsonToken::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                },
                JsonToken::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                },
                JsonToken::EndArray => {
                    if depth == 0 {
                        return Err(JsonError::scope("no value to skip"));
                    }
                    self.end_array()?;
                    depth -= 1;
                },
                JsonToken::EndObject => {
                    if depth == 0 {
                        return Err(JsonError::scope("no value to skip"));
                    }
                    self.end_object()?;
                    depth -= 1;
                },
                JsonToken::Name => {
                    self.next_name()?;
                    continue;
                },
                JsonToken::String => {
                    self.next_string()?;
                },
                JsonToken::Number => {
                    self.next_number()?;
                },
                JsonToken::Boolean => {
                    self.next_bool()?;
                },
                JsonToken::Null => {
                    self.next_null()?;
                },
                JsonToken::EndDocument => {
                    return Err(JsonError::scope("no value to skip"));
                },
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Asserts that the whole document has been consumed.
    ///
    /// In strict mode a second top-level value is a syntax error; trailing
    /// whitespace is always fine.
    pub fn end_document(&mut self) -> Result<(), JsonError> {
        self.expect(JsonToken::EndDocument)?;
        Ok(())
    }

    /// Closes the reader. Always legal; every later operation fails with
    /// [`JsonError::Closed`].
    pub fn close(&mut self) {
        self.peeked = None;
        self.stack.clear();
        self.stack.push(Scope::Closed);
    }

    // ------------------------------------------------------------------------
    // Lookahead

    fn fill_peek(&mut self) -> Result<(), JsonError> {
        if self.peeked.is_none() {
            let peeked = self.advance()?;
            self.peeked = Some(peeked);
        }
        Ok(())
    }

    fn expect(&mut self, want: JsonToken) -> Result<Peeked, JsonError> {
        self.fill_peek()?;
        let found = match self.peeked.as_ref() {
            Some(p) => p.token(),
            None => return Err(JsonError::Closed),
        };
        if found != want {
            return Err(self.unexpected(want, found));
        }
        Ok(self.peeked.take().unwrap_or(Peeked::EndDocument))
    }

    fn next_numeric_text(&mut self) -> Result<String, JsonError> {
        self.fill_peek()?;
        match self.peeked.take() {
            Some(Peeked::Number { start, end }) => Ok(self.src[start..end].to_string()),
            Some(Peeked::Str(s)) if self.lenient => Ok(s),
            Some(other) => {
                let found = other.token();
                self.peeked = Some(other);
                Err(self.unexpected(JsonToken::Number, found))
            },
            None => Err(JsonError::Closed),
        }
    }

    /// Produces the next token from the source, driven by the top scope.
    fn advance(&mut self) -> Result<Peeked, JsonError> {
        let top = self.scope();
        match top {
            Scope::Closed => Err(JsonError::Closed),
            Scope::EmptyDocument => {
                self.eat('\u{feff}');
                self.skip_blank()?;
                if self.at_end() {
                    return Ok(Peeked::EndDocument);
                }
                self.set_top(Scope::NonemptyDocument);
                self.peek_value()
            },
            Scope::NonemptyDocument => {
                self.skip_blank()?;
                if self.at_end() {
                    return Ok(Peeked::EndDocument);
                }
                if !self.lenient {
                    return Err(self.syntax_here("multiple top-level values"));
                }
                self.peek_value()
            },
            Scope::EmptyArray => {
                self.skip_blank()?;
                if self.eat(']') {
                    return Ok(Peeked::EndArray);
                }
                self.set_top(Scope::NonemptyArray);
                self.peek_value()
            },
            Scope::NonemptyArray => {
                self.skip_blank()?;
                if self.eat(']') {
                    return Ok(Peeked::EndArray);
                }
                if !(self.eat(',') || (self.lenient && self.eat(';'))) {
                    return Err(self.syntax_here("expected ',' or ']'"));
                }
                self.skip_blank()?;
                if self.peek_ch() == Some(']') {
                    if self.lenient {
                        self.bump();
                        return Ok(Peeked::EndArray);
                    }
                    return Err(self.syntax_here("trailing comma"));
                }
                self.peek_value()
            },
            Scope::EmptyObject => {
                self.skip_blank()?;
                if self.eat('}') {
                    return Ok(Peeked::EndObject);
                }
                self.set_top(Scope::DanglingName);
                self.peek_name().map(Peeked::Name)
            },
            Scope::NonemptyObject => {
                self.skip_blank()?;
                if self.eat('}') {
                    return Ok(Peeked::EndObject);
                }
                if !(self.eat(',') || (self.lenient && self.eat(';'))) {
                    return Err(self.syntax_here("expected ',' or '}'"));
                }
                self.skip_blank()?;
                if self.peek_ch() == Some('}') {
                    if self.lenient {
                        self.bump();
                        return Ok(Peeked::EndObject);
                    }
                    return Err(self.syntax_here("trailing comma"));
                }
                self.set_top(Scope::DanglingName);
                self.peek_name().map(Peeked::Name)
            },
            Scope::DanglingName => {
                self.skip_blank()?;
                if self.eat(':') {
                    // standard separator
                } else if self.lenient && self.eat('=') {
                    self.eat('>');
                } else {
                    return Err(self.syntax_here("expected ':'"));
                }
                self.set_top(Scope::NonemptyObject);
                self.skip_blank()?;
                self.peek_value()
            },
        }
    }

    fn peek_value(&mut self) -> Result<Peeked, JsonError> {
        let Some(c) = self.peek_ch() else {
            return Err(self.syntax_here("unexpected end of input"));
        };
        match c {
            '[' => {
                self.bump();
                Ok(Peeked::BeginArray)
            },
            '{' => {
                self.bump();
                Ok(Peeked::BeginObject)
            },
            '"' => {
                self.bump();
                self.read_quoted('"').map(Peeked::Str)
            },
            '\'' => {
                if !self.lenient {
                    return Err(
                        self.syntax_here("single-quoted strings forbidden outside lenient mode"),
                    );
                }
                self.bump();
                self.read_quoted('\'').map(Peeked::Str)
            },
            _ => self.peek_literal(),
        }
    }

    /// Lexes an unquoted run and classifies it: keyword, number, or (lenient
    /// only) an unquoted string.
    fn peek_literal(&mut self) -> Result<Peeked, JsonError> {
        let start = self.pos;
        while let Some(c) = self.peek_ch() {
            if is_literal_terminator(c) {
                break;
            }
            self.bump();
        }
        let end = self.pos;
        if start == end {
            return Err(self.syntax_here("expected a value"));
        }
        let text = &self.src[start..end];
        match text {
            "true" => return Ok(Peeked::True),
            "false" => return Ok(Peeked::False),
            "null" => return Ok(Peeked::Null),
            _ => {},
        }
        if is_number(text, self.lenient) {
            return Ok(Peeked::Number { start, end });
        }
        if self.lenient && matches!(text, "NaN" | "Infinity" | "-Infinity") {
            return Ok(Peeked::Number { start, end });
        }
        if self.lenient {
            return Ok(Peeked::Str(text.to_string()));
        }
        Err(JsonError::syntax(self.line, self.column_of(start), "malformed value"))
    }

    fn peek_name(&mut self) -> Result<String, JsonError> {
        match self.peek_ch() {
            Some('"') => {
                self.bump();
                self.read_quoted('"')
            },
            Some('\'') if self.lenient => {
                self.bump();
                self.read_quoted('\'')
            },
            Some(c) if self.lenient && !is_literal_terminator(c) => {
                let start = self.pos;
                while let Some(c) = self.peek_ch() {
                    if is_literal_terminator(c) {
                        break;
                    }
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            },
            _ => Err(self.syntax_here("expected a member name")),
        }
    }

    // ------------------------------------------------------------------------
    // String decoding

    /// Decodes a quoted string; the opening quote is already consumed.
    fn read_quoted(&mut self, quote: char) -> Result<String, JsonError> {
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.syntax_here("unterminated string"));
            };
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                self.read_escape(&mut out)?;
                continue;
            }
            if (c as u32) < 0x20 && !self.lenient {
                return Err(self.syntax_here("unescaped control character in string"));
            }
            out.push(c);
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<(), JsonError> {
        let Some(c) = self.bump() else {
            return Err(self.syntax_here("unterminated escape sequence"));
        };
        match c {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '\'' if self.lenient => out.push('\''),
            '\n' if self.lenient => out.push('\n'),
            'u' => {
                let unit = self.read_hex4()?;
                if (0xD800..0xDC00).contains(&unit) {
                    if !(self.eat('\\') && self.eat('u')) {
                        return Err(self.syntax_here("unpaired surrogate escape"));
                    }
                    let trail = self.read_hex4()?;
                    if !(0xDC00..0xE000).contains(&trail) {
                        return Err(self.syntax_here("unpaired surrogate escape"));
                    }
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (trail - 0xDC00);
                    match char::from_u32(combined) {
                        Some(c) => out.push(c),
                        None => return Err(self.syntax_here("invalid surrogate pair")),
                    }
                } else if (0xDC00..0xE000).contains(&unit) {
                    return Err(self.syntax_here("unpaired surrogate escape"));
                } else {
                    match char::from_u32(unit) {
                        Some(c) => out.push(c),
                        None => return Err(self.syntax_here("invalid unicode escape")),
                    }
                }
            },
            _ => return Err(self.syntax_here("invalid escape sequence")),
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32, JsonError> {
        let mut value = 0_u32;
        for _ in 0..4 {
            let Some(c) = self.bump() else {
                return Err(self.syntax_here("unterminated unicode escape"));
            };
            let digit = match c.to_digit(16) {
                Some(d) => d,
                None => return Err(self.syntax_here("invalid unicode escape")),
            };
            value = value * 16 + digit;
        }
        Ok(value)
    }

    // ------------------------------------------------------------------------
    // Low-Level cursor

    /// Skips whitespace and, in lenient mode, comments.
    fn skip_blank(&mut self) -> Result<(), JsonError> {
        loop {
            while let Some(c) = self.peek_ch() {
                if c.is_whitespace() {
                    self.bump();
                } else {
                    break;
                }
            }
            match self.peek_ch() {
                Some('/') => {
                    if !self.lenient {
                        return Err(self.syntax_here("comments forbidden outside lenient mode"));
                    }
                    self.bump();
                    match self.peek_ch() {
                        Some('/') => {
                            self.bump();
                            self.skip_to_eol();
                        },
                        Some('*') => {
                            self.bump();
                            self.skip_block_comment()?;
                        },
                        _ => return Err(self.syntax_here("malformed comment")),
                    }
                },
                Some('#') => {
                    if !self.lenient {
                        return Err(self.syntax_here("comments forbidden outside lenient mode"));
                    }
                    self.skip_to_eol();
                },
                _ => return Ok(()),
            }
        }
    }

    fn skip_to_eol(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), JsonError> {
        loop {
            if self.src[self.pos..].starts_with("*/") {
                self.bump();
                self.bump();
                return Ok(());
            }
            if self.bump().is_none() {
                return Err(self.syntax_here("unterminated comment"));
            }
        }
    }

    fn peek_ch(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_ch()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek_ch() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn column_of(&self, pos: usize) -> usize {
        self.src[self.line_start..pos].chars().count() + 1
    }

    fn column(&self) -> usize {
        self.column_of(self.pos)
    }

    fn syntax_here(&self, detail: &'static str) -> JsonError {
        JsonError::syntax(self.line, self.column(), detail)
    }

    fn unexpected(&self, expected: JsonToken, found: JsonToken) -> JsonError {
        JsonError::Unexpected { expected, found, line: self.line, column: self.column() }
    }
}

impl core::fmt::Debug for JsonReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonReader")
            .field("pos", &self.pos)
            .field("line", &self.line)
            .field("lenient", &self.lenient)
            .field("scope", &self.scope())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Lexing helpers

/// Characters that end an unquoted literal run.
fn is_literal_terminator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '{' | '}' | '[' | ']' | ':' | ',' | ';' | '#' | '/' | '"' | '\'' | '=' | '\\',
        )
}

/// Validates a literal against the JSON number grammar. Lenient mode
/// additionally allows a leading `+` and redundant leading zeros.
pub(crate) fn is_number(text: &str, lenient: bool) -> bool {
    let mut b = text.as_bytes();
    match b.first() {
        Some(b'-') => b = &b[1..],
        Some(b'+') => {
            if !lenient {
                return false;
            }
            b = &b[1..];
        },
        _ => {},
    }
    let digits = b.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    if !lenient && digits > 1 && b[0] == b'0' {
        return false;
    }
    b = &b[digits..];
    if b.first() == Some(&b'.') {
        b = &b[1..];
        let frac = b.iter().take_while(|c| c.is_ascii_digit()).count();
        if frac == 0 {
            return false;
        }
        b = &b[frac..];
    }
    if matches!(b.first(), Some(b'e' | b'E')) {
        b = &b[1..];
        if matches!(b.first(), Some(b'+' | b'-')) {
            b = &b[1..];
        }
        let exp = b.iter().take_while(|c| c.is_ascii_digit()).count();
        if exp == 0 {
            return false;
        }
        b = &b[exp..];
    }
    b.is_empty()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn reads_flat_object() {
        let mut r = JsonReader::new(r#"{"A":1,"B":2}"#);
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "A");
        assert_eq!(r.next_i64().unwrap(), 1);
        assert_eq!(r.next_name().unwrap(), "B");
        assert_eq!(r.next_i64().unwrap(), 2);
        assert!(!r.has_next().unwrap());
        r.end_object().unwrap();
        r.end_document().unwrap();
    }

    #[test]
    fn reads_nested_arrays() {
        let mut r = JsonReader::new("[[],[[]]]");
        r.begin_array().unwrap();
        r.begin_array().unwrap();
        r.end_array().unwrap();
        r.begin_array().unwrap();
        r.begin_array().unwrap();
        r.end_array().unwrap();
        r.end_array().unwrap();
        r.end_array().unwrap();
        r.end_document().unwrap();
    }

    #[test]
    fn peek_is_stable_and_nonconsuming() {
        let mut r = JsonReader::new("[true]");
        assert_eq!(r.peek().unwrap(), JsonToken::BeginArray);
        assert_eq!(r.peek().unwrap(), JsonToken::BeginArray);
        r.begin_array().unwrap();
        assert_eq!(r.peek().unwrap(), JsonToken::Boolean);
        assert!(r.next_bool().unwrap());
    }

    #[test]
    fn scope_violation_preserves_the_stack() {
        let mut r = JsonReader::new("[1]");
        r.begin_array().unwrap();
        let err = r.begin_object().unwrap_err();
        assert!(matches!(
            err,
            JsonError::Unexpected { expected: JsonToken::BeginObject, found: JsonToken::Number, .. },
        ));
        // same call sequence still works after the failed attempt
        assert_eq!(r.scope(), Scope::NonemptyArray);
        assert_eq!(r.next_i64().unwrap(), 1);
        r.end_array().unwrap();
    }

    #[test]
    fn number_text_is_verbatim() {
        let mut r = JsonReader::new("[1.2300, 1e3, -0.5]");
        r.begin_array().unwrap();
        assert_eq!(r.next_number().unwrap(), "1.2300");
        assert_eq!(r.next_number().unwrap(), "1e3");
        assert_eq!(r.next_number().unwrap(), "-0.5");
        r.end_array().unwrap();
    }

    #[test]
    fn integral_narrowing_is_exact() {
        let mut r = JsonReader::new("[1e3, 9223372036854775807, 1.5]");
        r.begin_array().unwrap();
        assert_eq!(r.next_i64().unwrap(), 1000);
        assert_eq!(r.next_i64().unwrap(), i64::MAX);
        assert!(matches!(r.next_i64().unwrap_err(), JsonError::NumberRange { .. }));
    }

    #[test]
    fn u64_rejects_negatives() {
        let mut r = JsonReader::new("[-1]");
        r.begin_array().unwrap();
        assert!(matches!(r.next_u64().unwrap_err(), JsonError::NumberRange { .. }));
    }

    #[test]
    fn string_escapes_decode() {
        let mut r = JsonReader::new(r#""a\n\t\"\\\u0041\uD83D\uDE00""#);
        assert_eq!(r.next_string().unwrap(), "a\n\t\"\\A\u{1F600}");
    }

    #[test]
    fn unpaired_surrogate_is_an_error() {
        let mut r = JsonReader::new(r#""\uD83D""#);
        assert!(matches!(r.next_string().unwrap_err(), JsonError::Syntax { .. }));
    }

    #[test]
    fn errors_carry_line_and_column() {
        let mut r = JsonReader::new("[1,\n  tru]");
        r.begin_array().unwrap();
        r.next_i64().unwrap();
        match r.peek().unwrap_err() {
            JsonError::Syntax { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column >= 3);
            },
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn strict_rejects_single_quotes() {
        // spec example: ['a', 'b', 'c']
        let mut r = JsonReader::new("['a', 'b', 'c']");
        r.begin_array().unwrap();
        assert!(matches!(r.peek().unwrap_err(), JsonError::Syntax { .. }));
    }

    #[test]
    fn lenient_accepts_single_quotes() {
        let mut r = JsonReader::lenient("['a', 'b', 'c']");
        r.begin_array().unwrap();
        assert_eq!(r.next_string().unwrap(), "a");
        assert_eq!(r.next_string().unwrap(), "b");
        assert_eq!(r.next_string().unwrap(), "c");
        r.end_array().unwrap();
        r.end_document().unwrap();
    }

    #[test]
    fn lenient_accepts_unquoted_strings_and_names() {
        let mut r = JsonReader::lenient("{key: value}");
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "key");
        assert_eq!(r.next_string().unwrap(), "value");
        r.end_object().unwrap();
    }

    #[test]
    fn lenient_accepts_comments() {
        let text = "// leading\n[1, /* mid */ 2, # tail\n3]";
        let mut r = JsonReader::lenient(text);
        r.begin_array().unwrap();
        assert_eq!(r.next_i64().unwrap(), 1);
        assert_eq!(r.next_i64().unwrap(), 2);
        assert_eq!(r.next_i64().unwrap(), 3);
        r.end_array().unwrap();
    }

    #[test]
    fn strict_rejects_comments() {
        let mut r = JsonReader::new("[1] // done");
        r.begin_array().unwrap();
        r.next_i64().unwrap();
        r.end_array().unwrap();
        assert!(matches!(r.end_document().unwrap_err(), JsonError::Syntax { .. }));
    }

    #[test]
    fn lenient_separators_and_trailing_commas() {
        let mut r = JsonReader::lenient("{a = 1; b => 2,}");
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "a");
        assert_eq!(r.next_i64().unwrap(), 1);
        assert_eq!(r.next_name().unwrap(), "b");
        assert_eq!(r.next_i64().unwrap(), 2);
        r.end_object().unwrap();
    }

    #[test]
    fn strict_rejects_trailing_comma() {
        let mut r = JsonReader::new("[1,]");
        r.begin_array().unwrap();
        r.next_i64().unwrap();
        assert!(matches!(r.peek().unwrap_err(), JsonError::Syntax { .. }));
    }

    #[test]
    fn lenient_nonfinite_numbers() {
        let mut r = JsonReader::lenient("[NaN, Infinity, -Infinity, +3]");
        r.begin_array().unwrap();
        assert!(r.next_f64().unwrap().is_nan());
        assert_eq!(r.next_f64().unwrap(), f64::INFINITY);
        assert_eq!(r.next_f64().unwrap(), f64::NEG_INFINITY);
        assert_eq!(r.next_i64().unwrap(), 3);
        r.end_array().unwrap();
    }

    #[test]
    fn strict_rejects_nonfinite_numbers() {
        let mut r = JsonReader::new("[NaN]");
        r.begin_array().unwrap();
        assert!(matches!(r.peek().unwrap_err(), JsonError::Syntax { .. }));
    }

    #[test]
    fn multiple_top_level_values() {
        let mut strict = JsonReader::new("1 2");
        strict.next_i64().unwrap();
        assert!(matches!(strict.peek().unwrap_err(), JsonError::Syntax { .. }));

        let mut lenient = JsonReader::lenient("1 2");
        assert_eq!(lenient.next_i64().unwrap(), 1);
        assert_eq!(lenient.next_i64().unwrap(), 2);
        lenient.end_document().unwrap();
    }

    #[test]
    fn skip_value_skips_subtrees() {
        let mut r = JsonReader::new(r#"{"a":{"x":[1,2,{"y":null}]},"b":true}"#);
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "a");
        r.skip_value().unwrap();
        assert_eq!(r.next_name().unwrap(), "b");
        assert!(r.next_bool().unwrap());
        r.end_object().unwrap();
        r.end_document().unwrap();
    }

    #[test]
    fn close_poisons_the_reader() {
        let mut r = JsonReader::new("[1]");
        r.begin_array().unwrap();
        r.close();
        assert_eq!(r.peek().unwrap_err(), JsonError::Closed);
        assert_eq!(r.next_i64().unwrap_err(), JsonError::Closed);
    }

    #[test]
    fn empty_input_is_end_document() {
        let mut r = JsonReader::new("   ");
        assert_eq!(r.peek().unwrap(), JsonToken::EndDocument);
    }

    #[test]
    fn bom_is_skipped() {
        let text = "\u{feff}[1]".to_string();
        let mut r = JsonReader::new(&text);
        r.begin_array().unwrap();
        assert_eq!(r.next_i64().unwrap(), 1);
        r.end_array().unwrap();
    }

    #[test]
    fn number_token_reads_as_string() {
        let mut r = JsonReader::new("[1.25]");
        r.begin_array().unwrap();
        assert_eq!(r.next_string().unwrap(), "1.25");
    }

    #[test]
    fn quoted_number_narrows_in_lenient_mode() {
        let mut r = JsonReader::lenient(r#"["42"]"#);
        r.begin_array().unwrap();
        assert_eq!(r.next_i64().unwrap(), 42);
    }
}
