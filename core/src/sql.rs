//! SQL text assembly.

use smallvec::SmallVec;

use crate::dialect::{Dialect, write_placeholder};
use crate::error::{JoinError, Result};
use crate::value::Value;

/// SQL keywords and punctuation emitted by the renderer.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    SELECT,
    DISTINCT,
    FROM,
    WHERE,
    GROUP_BY,
    ORDER_BY,
    ASC,
    DESC,
    AS,
    ON,
    AND,
    OR,
    NOT,
    IN,
    LIKE,
    BETWEEN,
    IS_NULL,
    IS_NOT_NULL,
    NULL,
    LEFT_JOIN,
    RIGHT_JOIN,
    INNER_JOIN,
    LPAREN,
    RPAREN,
    COMMA,
    DOT,
    EQ,
    NE,
    GT,
    GE,
    LT,
    LE,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::DISTINCT => "DISTINCT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::GROUP_BY => "GROUP BY",
            Token::ORDER_BY => "ORDER BY",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::AS => "AS",
            Token::ON => "ON",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::IN => "IN",
            Token::LIKE => "LIKE",
            Token::BETWEEN => "BETWEEN",
            Token::IS_NULL => "IS NULL",
            Token::IS_NOT_NULL => "IS NOT NULL",
            Token::NULL => "NULL",
            Token::LEFT_JOIN => "LEFT JOIN",
            Token::RIGHT_JOIN => "RIGHT JOIN",
            Token::INNER_JOIN => "INNER JOIN",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::COMMA => ",",
            Token::DOT => ".",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::GT => ">",
            Token::GE => ">=",
            Token::LT => "<",
            Token::LE => "<=",
        }
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulates SQL text and the parameters bound to its placeholders.
///
/// Words are separated by a single space; punctuation attaches to its
/// neighbours (`f(x)`, `a, b`).
#[derive(Debug, Clone)]
pub struct SqlWriter {
    sql: String,
    params: SmallVec<[Value; 8]>,
    dialect: Dialect,
    glue: bool,
}

impl SqlWriter {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: String::with_capacity(128),
            params: SmallVec::new(),
            dialect,
            glue: true,
        }
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn space(&mut self) {
        if !self.glue {
            self.sql.push(' ');
        }
    }

    pub fn token(&mut self, token: Token) -> &mut Self {
        match token {
            Token::COMMA | Token::RPAREN => {
                self.sql.push_str(token.as_str());
                self.glue = false;
            }
            Token::LPAREN | Token::DOT => {
                self.space();
                self.sql.push_str(token.as_str());
                self.glue = true;
            }
            _ => {
                self.space();
                self.sql.push_str(token.as_str());
                self.glue = false;
            }
        }
        self
    }

    /// Writes raw, already-safe SQL text as one word.
    pub fn raw(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        self.space();
        self.sql.push_str(text);
        self.glue = false;
        self
    }

    /// Writes `alias.column`.
    pub fn column(&mut self, table_alias: &str, column: &str) -> &mut Self {
        self.space();
        self.sql.push_str(table_alias);
        self.sql.push('.');
        self.sql.push_str(column);
        self.glue = false;
        self
    }

    /// Writes a placeholder and records `value` as its parameter.
    pub fn param(&mut self, value: Value) -> &mut Self {
        self.space();
        self.params.push(value);
        write_placeholder(self.dialect, self.params.len(), &mut self.sql);
        self.glue = false;
        self
    }

    /// Writes `(?, ?, ...)` for `values`.
    pub fn param_list<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.token(Token::LPAREN);
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.token(Token::COMMA);
            }
            self.param(value);
        }
        self.token(Token::RPAREN)
    }

    /// Writes a raw template as one word, replacing `{n}` with a placeholder
    /// bound to `args[n]`.
    pub fn template(&mut self, template: &str, args: &[Value]) -> Result<&mut Self> {
        let pieces = parse_template(template, args.len())?;
        self.space();
        for piece in pieces {
            match piece {
                TemplatePiece::Text(text) => self.sql.push_str(text),
                TemplatePiece::Arg(index) => {
                    self.params.push(args[index].clone());
                    write_placeholder(self.dialect, self.params.len(), &mut self.sql);
                }
            }
        }
        self.glue = false;
        Ok(self)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params.into_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplatePiece<'a> {
    Text(&'a str),
    Arg(usize),
}

/// Splits a raw template into text and `{n}` argument references.
///
/// Braces that do not enclose a decimal index are kept as text.
pub(crate) fn parse_template(template: &str, arg_count: usize) -> Result<SmallVec<[TemplatePiece<'_>; 8]>> {
    let mut pieces = SmallVec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        let digits = &after[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            pieces.push(TemplatePiece::Text(&rest[..open + 1]));
            rest = after;
            continue;
        }

        let index: usize = digits
            .parse()
            .map_err(|_| JoinError::Template(format!("bad argument index `{{{digits}}}` in `{template}`")))?;
        if index >= arg_count {
            return Err(JoinError::Template(format!(
                "`{template}` references {{{index}}} but only {arg_count} argument(s) were given"
            )));
        }

        if open > 0 {
            pieces.push(TemplatePiece::Text(&rest[..open]));
        }
        pieces.push(TemplatePiece::Arg(index));
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        pieces.push(TemplatePiece::Text(rest));
    }
    Ok(pieces)
}
