//! Predicate trees for WHERE and ON clauses.

mod condition;
mod operand;

pub use condition::*;
pub use operand::*;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::accessor::FieldRef;
use crate::alias::AliasScope;
use crate::error::{JoinError, Result};
use crate::metadata::EntityType;
use crate::sql::{SqlWriter, Token};
use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    /// Unary operators
    None,
    Value(Value),
    Values(Vec<Value>),
    Range(Value, Value),
    Column(FieldRef),
}

/// A node in a predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    Comparison {
        left: FieldRef,
        op: CompareOp,
        right: Rhs,
    },
    /// Raw SQL with `{n}` argument placeholders
    Raw {
        template: CompactString,
        args: Vec<Value>,
    },
    And(Vec<PredicateNode>),
    Or(Vec<PredicateNode>),
    /// Explicit parenthesization
    Group(Box<PredicateNode>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parent {
    Root,
    And,
    Or,
}

impl PredicateNode {
    /// Collects every table referenced by a column in this tree, as the owning
    /// entity and its explicit alias slot.
    pub fn references(&self, out: &mut SmallVec<[(EntityType, Option<usize>); 4]>) {
        match self {
            PredicateNode::Comparison { left, right, .. } => {
                push_unique(out, (left.owner(), left.slot()));
                if let Rhs::Column(column) = right {
                    push_unique(out, (column.owner(), column.slot()));
                }
            }
            PredicateNode::Raw { .. } => {}
            PredicateNode::And(children) | PredicateNode::Or(children) => {
                for child in children {
                    child.references(out);
                }
            }
            PredicateNode::Group(child) => child.references(out),
        }
    }

    pub(crate) fn render(&self, w: &mut SqlWriter, scope: &AliasScope<'_>) -> Result<()> {
        self.render_in(w, scope, Parent::Root)
    }

    fn render_in(&self, w: &mut SqlWriter, scope: &AliasScope<'_>, parent: Parent) -> Result<()> {
        match self {
            PredicateNode::Comparison { left, op, right } => render_comparison(w, scope, left, *op, right),
            PredicateNode::Raw { template, args } => {
                w.template(template, args)?;
                Ok(())
            }
            PredicateNode::And(children) => render_list(w, scope, children, Token::AND, parent),
            PredicateNode::Or(children) => render_list(w, scope, children, Token::OR, parent),
            PredicateNode::Group(child) => {
                w.token(Token::LPAREN);
                child.render_in(w, scope, Parent::Root)?;
                w.token(Token::RPAREN);
                Ok(())
            }
        }
    }
}

fn push_unique(out: &mut SmallVec<[(EntityType, Option<usize>); 4]>, reference: (EntityType, Option<usize>)) {
    if !out.contains(&reference) {
        out.push(reference);
    }
}

/// Renders `children` joined by `separator`, parenthesized when nested under
/// the other connective.
fn render_list(
    w: &mut SqlWriter,
    scope: &AliasScope<'_>,
    children: &[PredicateNode],
    separator: Token,
    outer: Parent,
) -> Result<()> {
    if let [only] = children {
        return only.render_in(w, scope, outer);
    }
    let parent = if separator == Token::AND { Parent::And } else { Parent::Or };
    let parens = outer != Parent::Root && outer != parent;
    if parens {
        w.token(Token::LPAREN);
    }
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            w.token(separator);
        }
        child.render_in(w, scope, parent)?;
    }
    if parens {
        w.token(Token::RPAREN);
    }
    Ok(())
}

pub(crate) fn write_column(w: &mut SqlWriter, scope: &AliasScope<'_>, field: &FieldRef) -> Result<()> {
    let alias = scope
        .field_alias(field)
        .ok_or(JoinError::TableNotJoined(field.owner().name()))?;
    w.column(&alias, field.column());
    Ok(())
}

fn write_rhs(w: &mut SqlWriter, scope: &AliasScope<'_>, right: &Rhs) -> Result<()> {
    match right {
        Rhs::Value(value) => {
            w.param(value.clone());
        }
        Rhs::Column(field) => write_column(w, scope, field)?,
        Rhs::Values(values) => {
            if values.is_empty() {
                w.token(Token::LPAREN).token(Token::NULL).token(Token::RPAREN);
            } else {
                w.param_list(values.iter().cloned());
            }
        }
        Rhs::Range(low, high) => {
            w.param(low.clone()).token(Token::AND).param(high.clone());
        }
        Rhs::None => {}
    }
    Ok(())
}

fn render_comparison(
    w: &mut SqlWriter,
    scope: &AliasScope<'_>,
    left: &FieldRef,
    op: CompareOp,
    right: &Rhs,
) -> Result<()> {
    write_column(w, scope, left)?;
    match op {
        CompareOp::Eq => w.token(Token::EQ),
        CompareOp::Ne => w.token(Token::NE),
        CompareOp::Gt => w.token(Token::GT),
        CompareOp::Ge => w.token(Token::GE),
        CompareOp::Lt => w.token(Token::LT),
        CompareOp::Le => w.token(Token::LE),
        CompareOp::Like => w.token(Token::LIKE),
        CompareOp::NotLike => w.token(Token::NOT).token(Token::LIKE),
        CompareOp::In => w.token(Token::IN),
        CompareOp::NotIn => w.token(Token::NOT).token(Token::IN),
        CompareOp::Between => w.token(Token::BETWEEN),
        CompareOp::NotBetween => w.token(Token::NOT).token(Token::BETWEEN),
        CompareOp::IsNull => w.token(Token::IS_NULL),
        CompareOp::IsNotNull => w.token(Token::IS_NOT_NULL),
    };
    write_rhs(w, scope, right)
}
