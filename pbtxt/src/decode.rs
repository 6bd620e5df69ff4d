//! Recursive-descent parser for protobuf text format.

use serde_json::{Map, Number, Value};

use crate::error::FormatError;

/// Decode protobuf text format into an ordered mapping.
///
/// Field order in the source is preserved. A field name occurring more
/// than once in the same message body accumulates into an array, as do
/// bracketed repeated fields.
pub fn decode(text: &str) -> Result<Map<String, Value>, FormatError> {
    let mut parser = Parser::new(text);
    parser.message_body(None)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == '#' {
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Parse fields until `terminator` (or end of input when `None`).
    fn message_body(
        &mut self,
        terminator: Option<char>,
    ) -> Result<Map<String, Value>, FormatError> {
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => {
                    if terminator.is_some() {
                        return Err(FormatError::UnexpectedEof);
                    }
                    return Ok(map);
                }
                Some(ch) if Some(ch) == terminator => {
                    self.bump();
                    return Ok(map);
                }
                Some(_) => {}
            }

            let name = self.identifier()?;
            self.skip_trivia();
            let value = match self.peek() {
                Some('{') => {
                    self.bump();
                    Value::Object(self.message_body(Some('}'))?)
                }
                Some('[') => {
                    self.bump();
                    self.list()?
                }
                Some(':') => {
                    self.bump();
                    self.skip_trivia();
                    match self.peek() {
                        Some('{') => {
                            self.bump();
                            Value::Object(self.message_body(Some('}'))?)
                        }
                        Some('[') => {
                            self.bump();
                            self.list()?
                        }
                        Some(_) => self.scalar()?,
                        None => return Err(FormatError::UnexpectedEof),
                    }
                }
                Some(_) => {
                    return Err(FormatError::Expected {
                        line: self.line,
                        expected: "':', '{' or '[' after field name",
                    });
                }
                None => return Err(FormatError::UnexpectedEof),
            };

            insert_field(&mut map, name, value);

            self.skip_trivia();
            if matches!(self.peek(), Some(',') | Some(';')) {
                self.bump();
            }
        }
    }

    /// Parse list elements after the opening `[`.
    fn list(&mut self) -> Result<Value, FormatError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(FormatError::UnexpectedEof),
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some('{') => {
                    self.bump();
                    items.push(Value::Object(self.message_body(Some('}'))?));
                }
                Some(_) => items.push(self.scalar()?),
            }
            self.skip_trivia();
            if self.peek() == Some(',') {
                self.bump();
            }
        }
    }

    fn scalar(&mut self) -> Result<Value, FormatError> {
        match self.peek() {
            Some('"') | Some('\'') => self.string(),
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '+' || ch == '.' => {
                self.number()
            }
            Some(ch) if is_ident_start(ch) => {
                let ident = self.identifier()?;
                Ok(match ident.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::String(ident),
                })
            }
            Some(ch) => Err(FormatError::UnexpectedChar {
                line: self.line,
                ch,
            }),
            None => Err(FormatError::UnexpectedEof),
        }
    }

    fn string(&mut self) -> Result<Value, FormatError> {
        let quote = self.bump().ok_or(FormatError::UnexpectedEof)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(FormatError::UnexpectedEof),
                Some(ch) if ch == quote => return Ok(Value::String(out)),
                Some('\\') => {
                    let escaped = self.bump().ok_or(FormatError::UnexpectedEof)?;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                Some(ch) => out.push(ch),
            }
        }
    }

    fn number(&mut self) -> Result<Value, FormatError> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit()
                || matches!(ch, '-' | '+' | '.' | 'e' | 'E')
            {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        let number = if text.contains(&['.', 'e', 'E'][..]) {
            text.parse::<f64>().ok().and_then(Number::from_f64)
        } else if let Ok(n) = text.parse::<i64>() {
            Some(Number::from(n))
        } else {
            text.parse::<u64>().ok().map(Number::from)
        };
        match number {
            Some(n) => Ok(Value::Number(n)),
            None => Err(FormatError::InvalidNumber {
                line: self.line,
                text,
            }),
        }
    }

    fn identifier(&mut self) -> Result<String, FormatError> {
        match self.peek() {
            Some(ch) if is_ident_start(ch) => {}
            Some(ch) => {
                return Err(FormatError::UnexpectedChar {
                    line: self.line,
                    ch,
                });
            }
            None => return Err(FormatError::UnexpectedEof),
        }
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Ok(ident)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Insert a field, accumulating repeats of the same name into an array.
fn insert_field(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        None => {
            map.insert(name, value);
        }
        Some(Value::Array(existing)) => match value {
            Value::Array(mut more) => existing.append(&mut more),
            single => existing.push(single),
        },
        Some(existing) => {
            let prior = existing.take();
            *existing = Value::Array(vec![prior, value]);
        }
    }
}
