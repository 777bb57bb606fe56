//! # Metadata Text Parser
//!
//! Recursive-descent parser for the compact JSON subset used as the hidden
//! payload format.
//!
//! ## Supported grammar
//!
//! - objects `{"key": value, ...}` and arrays `[value, ...]`, nested up to
//!   [`MAX_NESTING_DEPTH`] levels below the top-level object
//! - strings with the escapes `\"`, `\\`, `\n`, `\r`, `\t`
//! - unsigned numbers: digits with at most one `.` (a `.` makes it a float)
//! - `true` and `false`
//!
//! There is no `null`, no exponent, no sign and no `\uXXXX` escape. Unicode
//! whitespace is allowed between tokens.

use super::error::{ParseError, ParseErrorKind};
use super::value::{Object, Value};

/// Parse `text` as a single top-level object followed only by whitespace.
///
/// Duplicate keys are allowed; the last occurrence wins.
///
/// # Example
/// ```
/// use stego_meta::json::{parse, Value};
///
/// let meta = parse(r#"{"author":"John Doe","year":2025}"#).unwrap();
/// assert_eq!(meta["year"], Value::Int(2025));
/// ```
pub fn parse(text: &str) -> Result<Object, ParseError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    let object = parser.parse_object()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(parser.error(ParseErrorKind::TrailingInput));
    }
    Ok(object)
}

/// Containers (objects and arrays) that may be open below the top-level
/// object. Deeper input fails with [`ParseErrorKind::NestingTooDeep`].
pub const MAX_NESTING_DEPTH: usize = 128;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_required(&self) -> Result<char, ParseError> {
        self.peek()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        let next = self.peek_required()?;
        if next != expected {
            return Err(self.error(ParseErrorKind::UnexpectedToken(next)));
        }
        self.pos += 1;
        Ok(())
    }

    fn parse_object(&mut self) -> Result<Object, ParseError> {
        self.expect('{')?;
        self.skip_whitespace();

        let mut object = Object::new();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(object);
        }

        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;

            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();

            let value = self.parse_value()?;
            object.insert(key, value);

            self.skip_whitespace();
            match self.peek_required()? {
                ',' => self.pos += 1,
                '}' => {
                    self.pos += 1;
                    return Ok(object);
                }
                other => return Err(self.error(ParseErrorKind::UnexpectedToken(other))),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, ParseError> {
        self.expect('[')?;
        self.skip_whitespace();

        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(items);
        }

        loop {
            self.skip_whitespace();
            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek_required()? {
                ',' => self.pos += 1,
                ']' => {
                    self.pos += 1;
                    return Ok(items);
                }
                other => return Err(self.error(ParseErrorKind::UnexpectedToken(other))),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek_required()? {
            open @ ('{' | '[') => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.error(ParseErrorKind::NestingTooDeep));
                }
                self.depth += 1;
                let value = if open == '{' {
                    self.parse_object().map(Value::Object)
                } else {
                    self.parse_array().map(Value::Array)
                };
                self.depth -= 1;
                value
            }
            '"' => self.parse_string().map(Value::Str),
            c if c.is_ascii_digit() => self.parse_number(),
            't' | 'f' => self.parse_bool().map(Value::Bool),
            other => Err(self.error(ParseErrorKind::UnexpectedToken(other))),
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;

        let mut out = String::new();
        loop {
            let Some(next) = self.peek() else {
                return Err(self.error(ParseErrorKind::UnterminatedString));
            };
            self.pos += 1;
            match next {
                '"' => return Ok(out),
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(self.error(ParseErrorKind::UnterminatedString));
                    };
                    let decoded = match escaped {
                        '"' => '"',
                        '\\' => '\\',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => return Err(self.error(ParseErrorKind::BadEscape(other))),
                    };
                    self.pos += 1;
                    out.push(decoded);
                }
                c => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let mut seen_dot = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' {
                if seen_dot {
                    return Err(self.error(ParseErrorKind::MalformedNumber));
                }
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        let malformed = || ParseError::new(ParseErrorKind::MalformedNumber, start);
        if seen_dot {
            literal.parse::<f64>().map(Value::Float).map_err(|_| malformed())
        } else {
            literal.parse::<i64>().map(Value::Int).map_err(|_| malformed())
        }
    }

    fn parse_bool(&mut self) -> Result<bool, ParseError> {
        let (literal, value) = match self.peek_required()? {
            't' => ("true", true),
            'f' => ("false", false),
            other => return Err(self.error(ParseErrorKind::UnexpectedToken(other))),
        };
        for expected in literal.chars() {
            self.expect(expected)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str) -> ParseErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn test_empty_object() {
        assert!(parse("{}").unwrap().is_empty());
        assert!(parse("  {  }\n").unwrap().is_empty());
    }

    #[test]
    fn test_scalars() {
        let obj = parse(r#"{"s":"hi","i":42,"f":3.25,"t":true,"n":false}"#).unwrap();
        assert_eq!(obj["s"], Value::Str("hi".into()));
        assert_eq!(obj["i"], Value::Int(42));
        assert_eq!(obj["f"], Value::Float(3.25));
        assert_eq!(obj["t"], Value::Bool(true));
        assert_eq!(obj["n"], Value::Bool(false));
    }

    #[test]
    fn test_trailing_dot_is_float() {
        let obj = parse(r#"{"x":1.}"#).unwrap();
        assert_eq!(obj["x"], Value::Float(1.0));
    }

    #[test]
    fn test_nested() {
        let obj = parse(r#"{"a":{"b":[1,[2,{"c":"d"}],[]]}}"#).unwrap();
        let inner = obj["a"].as_object().unwrap();
        let list = inner["b"].as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], Value::Int(1));
        assert_eq!(list[2], Value::Array(vec![]));
    }

    #[test]
    fn test_unicode_whitespace_between_tokens() {
        let obj = parse("{\u{00A0}\"k\"\u{2003}:\u{3000}1 }").unwrap();
        assert_eq!(obj["k"], Value::Int(1));
    }

    #[test]
    fn test_escapes() {
        let obj = parse(r#"{"e":"a\"b\\c\nd\re\tf"}"#).unwrap();
        assert_eq!(obj["e"], Value::Str("a\"b\\c\nd\re\tf".into()));
    }

    #[test]
    fn test_non_ascii_passthrough() {
        let obj = parse(r#"{"città":"Zürich ✓"}"#).unwrap();
        assert_eq!(obj["città"], Value::Str("Zürich ✓".into()));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let obj = parse(r#"{"a":1,"a":2}"#).unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["a"], Value::Int(2));
    }

    #[test]
    fn test_errors() {
        assert_eq!(kind_of(r#"{"a":"open"#), ParseErrorKind::UnterminatedString);
        assert_eq!(kind_of(r#"{"a":1.2.3}"#), ParseErrorKind::MalformedNumber);
        assert_eq!(kind_of(r#"{"a":null}"#), ParseErrorKind::UnexpectedToken('n'));
        assert_eq!(kind_of(r#"{"a":.5}"#), ParseErrorKind::UnexpectedToken('.'));
        assert_eq!(kind_of(r#"{"a":-1}"#), ParseErrorKind::UnexpectedToken('-'));
        assert_eq!(kind_of(r#"{"a":1 "b":2}"#), ParseErrorKind::UnexpectedToken('"'));
        assert_eq!(kind_of(r#"{"a":1,}"#), ParseErrorKind::UnexpectedToken('}'));
        assert_eq!(kind_of(r#"{"a":tru}"#), ParseErrorKind::UnexpectedToken('}'));
        assert_eq!(kind_of(r#"{"a":"\u0041"}"#), ParseErrorKind::BadEscape('u'));
        assert_eq!(kind_of(r#"{} x"#), ParseErrorKind::TrailingInput);
        assert_eq!(kind_of(r#"[1]"#), ParseErrorKind::UnexpectedToken('['));
        assert_eq!(kind_of(r#"{"a":"#), ParseErrorKind::UnexpectedEnd);
        assert_eq!(kind_of(""), ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_integer_overflow_is_malformed() {
        assert_eq!(
            kind_of(r#"{"a":99999999999999999999}"#),
            ParseErrorKind::MalformedNumber
        );
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!(
            r#"{{"a":{}{}}}"#,
            "[".repeat(MAX_NESTING_DEPTH),
            "]".repeat(MAX_NESTING_DEPTH)
        );
        assert!(parse(&at_limit).is_ok());

        let over = format!(
            r#"{{"a":{}{}}}"#,
            "[".repeat(MAX_NESTING_DEPTH + 1),
            "]".repeat(MAX_NESTING_DEPTH + 1)
        );
        assert_eq!(kind_of(&over), ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn test_very_deep_input_fails_cleanly() {
        let deep = format!(r#"{{"a":{}{}}}"#, "[".repeat(200_000), "]".repeat(200_000));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert_eq!(err.position, 5 + MAX_NESTING_DEPTH);

        let objects = format!("{}{}", r#"{"k":"#.repeat(100_000), "}".repeat(100_001));
        assert_eq!(kind_of(&objects), ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn test_error_position() {
        let err = parse(r#"{"a":1} x"#).unwrap_err();
        assert_eq!(err.position, 8);
    }
}
