//! Type expressions found between the braces of a tag, e.g. `{string[]}` or `{(Todo|Error)}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed type expression.
///
/// The serialized form is discriminated on a `type` field, matching the JSDoc type AST
/// (`{"type": "NameExpression", "name": "string"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeExpression {
    /// A bare identifier such as `string` or `Todo`
    NameExpression { name: String },
    /// `T=` or a bracketed `[name]`
    OptionalType { expression: Box<TypeExpression> },
    /// `A|B` or `(A|B)`
    UnionType { elements: Vec<TypeExpression> },
    /// `T[]`, `Array<T>` or `Array.<T>`
    TypeApplication {
        expression: Box<TypeExpression>,
        applications: Vec<TypeExpression>,
    },
    /// `?T`
    NullableType { expression: Box<TypeExpression> },
    /// `!T`
    NonNullableType { expression: Box<TypeExpression> },
    /// `*`
    AllLiteral,
}

impl TypeExpression {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpression::NameExpression { name: name.into() }
    }

    pub fn optional(expression: TypeExpression) -> Self {
        TypeExpression::OptionalType {
            expression: Box::new(expression),
        }
    }

    /// `T[]` is shorthand for `Array<T>`.
    pub fn array_of(element: TypeExpression) -> Self {
        TypeExpression::TypeApplication {
            expression: Box::new(TypeExpression::named("Array")),
            applications: vec![element],
        }
    }

    pub fn union(elements: Vec<TypeExpression>) -> Self {
        TypeExpression::UnionType { elements }
    }

    /// The identifier of a `NameExpression`; every other shape has no name.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeExpression::NameExpression { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeExpression::OptionalType { .. })
    }
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

/// Parses the text between a tag's braces into a [`TypeExpression`].
///
/// Supported forms: names (dotted names included), unions with or without parentheses,
/// `T[]`, `Name<A, B>`, `Name.<A>`, trailing `=` for optional, `?T`, `!T` and `*`.
///
/// # Errors
///
/// Returns a human readable message when the text is empty or not a type expression.
pub fn parse_type_expression(source: &str) -> Result<TypeExpression, String> {
    let mut parser = TypeParser {
        chars: source.chars().collect(),
        pos: 0,
    };

    parser.skip_ws();
    if parser.peek().is_none() {
        return Err("empty type expression".to_string());
    }

    let expr = parser.parse_union()?;

    parser.skip_ws();
    match parser.peek() {
        None => Ok(expr),
        Some(c) => Err(format!("unexpected '{}' at offset {}", c, parser.pos)),
    }
}

struct TypeParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeParser {
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        if self.eat(expected) {
            Ok(())
        } else {
            match self.peek() {
                Some(c) => Err(format!(
                    "expected '{}' but found '{}' at offset {}",
                    expected, c, self.pos
                )),
                None => Err(format!("expected '{}' but reached the end", expected)),
            }
        }
    }

    fn parse_union(&mut self) -> Result<TypeExpression, String> {
        let mut elements = vec![self.parse_postfix()?];
        while self.eat('|') {
            elements.push(self.parse_postfix()?);
        }

        if elements.len() == 1 {
            Ok(elements.swap_remove(0))
        } else {
            Ok(TypeExpression::union(elements))
        }
    }

    fn parse_postfix(&mut self) -> Result<TypeExpression, String> {
        let mut expr = self.parse_prefix()?;

        loop {
            self.skip_ws();
            if self.peek() == Some('[') && self.peek_at(1) == Some(']') {
                self.pos += 2;
                expr = TypeExpression::array_of(expr);
            } else {
                break;
            }
        }

        if self.eat('=') {
            expr = TypeExpression::optional(expr);
        }

        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<TypeExpression, String> {
        self.skip_ws();
        match self.peek() {
            Some('?') => {
                self.pos += 1;
                let expression = Box::new(self.parse_postfix()?);
                Ok(TypeExpression::NullableType { expression })
            }
            Some('!') => {
                self.pos += 1;
                let expression = Box::new(self.parse_postfix()?);
                Ok(TypeExpression::NonNullableType { expression })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<TypeExpression, String> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_union()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('*') => {
                self.pos += 1;
                Ok(TypeExpression::AllLiteral)
            }
            Some(c) if is_name_start(c) => {
                let name = self.parse_name();
                self.parse_applications(name)
            }
            Some(c) => Err(format!("unexpected '{}' at offset {}", c, self.pos)),
            None => Err("unexpected end of type expression".to_string()),
        }
    }

    /// `Name<...>` and `Name.<...>`; a plain name otherwise.
    fn parse_applications(&mut self, name: String) -> Result<TypeExpression, String> {
        self.skip_ws();
        let generic = match (self.peek(), self.peek_at(1)) {
            (Some('<'), _) => {
                self.pos += 1;
                true
            }
            (Some('.'), Some('<')) => {
                self.pos += 2;
                true
            }
            _ => false,
        };

        if !generic {
            return Ok(TypeExpression::named(name));
        }

        let mut applications = vec![self.parse_union()?];
        while self.eat(',') {
            applications.push(self.parse_union()?);
        }
        self.expect('>')?;

        Ok(TypeExpression::TypeApplication {
            expression: Box::new(TypeExpression::named(name)),
            applications,
        })
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_part(c) || (c == '.' && self.peek_at(1).is_some_and(is_name_start)) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_name_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
