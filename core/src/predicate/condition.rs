use compact_str::{CompactString, format_compact};

use super::{CompareOp, IntoValue, Operand, OperandKind, Parent, PredicateNode, Rhs, render_list};
use crate::accessor::{Field, FieldRef, Resolver};
use crate::alias::AliasScope;
use crate::error::Result;
use crate::sql::{SqlWriter, Token, parse_template};
use crate::value::Value;

/// Fluent builder for one level of a predicate tree.
///
/// Siblings combine with AND. [`Condition::or`] makes the next appended node
/// combine with its predecessor by OR instead; a run of such flips extends the
/// same OR node. Accessors are resolved when the predicate is added, so an
/// unknown column fails at the call that names it.
#[derive(Debug, Clone)]
pub struct Condition<'m> {
    resolver: Resolver<'m>,
    children: Vec<PredicateNode>,
    or_next: bool,
    in_or_run: bool,
}

impl<'m> Condition<'m> {
    pub fn new(resolver: Resolver<'m>) -> Self {
        Self {
            resolver,
            children: Vec::new(),
            or_next: false,
            in_or_run: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[PredicateNode] {
        &self.children
    }

    /// The tree built so far: `None` when empty, the sole child, or an `And`.
    pub fn node(&self) -> Option<PredicateNode> {
        match self.children.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            many => Some(PredicateNode::And(many.to_vec())),
        }
    }

    pub fn into_node(mut self) -> Option<PredicateNode> {
        match self.children.len() {
            0 => None,
            1 => self.children.pop(),
            _ => Some(PredicateNode::And(self.children)),
        }
    }

    pub(crate) fn set_resolver(&mut self, resolver: Resolver<'m>) {
        self.resolver = resolver;
    }

    /// Renders the siblings joined by AND, without outer parentheses.
    pub(crate) fn render(&self, w: &mut SqlWriter, scope: &AliasScope<'_>) -> Result<()> {
        render_list(w, scope, &self.children, Token::AND, Parent::Root)
    }

    /// Appends `node`, honoring a pending `or()`.
    pub fn push(&mut self, node: PredicateNode) -> &mut Self {
        let flip = core::mem::take(&mut self.or_next);
        let previous = if flip { self.children.pop() } else { None };

        match previous {
            Some(PredicateNode::Or(mut run)) if self.in_or_run => {
                run.push(node);
                self.children.push(PredicateNode::Or(run));
            }
            Some(previous) => {
                self.children.push(PredicateNode::Or(vec![previous, node]));
                self.in_or_run = true;
            }
            None => {
                self.children.push(node);
                self.in_or_run = false;
            }
        }
        self
    }

    /// Appends a node that may have failed to build. A failure drops a pending
    /// `or()` so it cannot attach to an unrelated later predicate.
    fn append(&mut self, node: Result<PredicateNode>) -> Result<&mut Self> {
        match node {
            Ok(node) => Ok(self.push(node)),
            Err(err) => {
                self.or_next = false;
                Err(err)
            }
        }
    }

    /// Combines the next appended predicate with the previous one by OR.
    pub fn or(&mut self) -> &mut Self {
        self.or_next = true;
        self
    }

    /// Opens a nested group combined with the surrounding predicates.
    ///
    /// An empty group adds nothing.
    pub fn and<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: for<'c> FnOnce(&'c mut Condition<'m>) -> Result<&'c mut Condition<'m>>,
    {
        let mut nested = Condition::new(self.resolver);
        if let Err(err) = build(&mut nested) {
            self.or_next = false;
            return Err(err);
        }
        if let Some(node) = nested.into_node() {
            self.push(PredicateNode::Group(Box::new(node)));
        }
        Ok(self)
    }

    /// `or()` followed by [`Condition::and`].
    pub fn or_nested<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: for<'c> FnOnce(&'c mut Condition<'m>) -> Result<&'c mut Condition<'m>>,
    {
        self.or();
        self.and(build)
    }

    fn resolve<E: 'static, T>(&self, field: Field<E, T>) -> Result<FieldRef> {
        self.resolver.resolve(&field)
    }

    fn rhs(&self, operand: OperandKind) -> Result<Rhs> {
        Ok(match operand {
            OperandKind::Value(value) => Rhs::Value(value),
            OperandKind::Field { owner, member, slot } => {
                Rhs::Column(self.resolver.resolve_member(owner, member)?.with_slot(slot))
            }
        })
    }

    fn compare<E: 'static, T>(&mut self, field: Field<E, T>, op: CompareOp, right: OperandKind) -> Result<&mut Self> {
        let node = self.resolve(field).and_then(|left| {
            Ok(PredicateNode::Comparison {
                left,
                op,
                right: self.rhs(right)?,
            })
        });
        self.append(node)
    }

    pub fn eq<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        self.compare(field, CompareOp::Eq, value.into_operand())
    }

    pub fn ne<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        self.compare(field, CompareOp::Ne, value.into_operand())
    }

    pub fn gt<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        self.compare(field, CompareOp::Gt, value.into_operand())
    }

    pub fn ge<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        self.compare(field, CompareOp::Ge, value.into_operand())
    }

    pub fn lt<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        self.compare(field, CompareOp::Lt, value.into_operand())
    }

    pub fn le<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        self.compare(field, CompareOp::Le, value.into_operand())
    }

    fn pattern<E: 'static, T>(
        &mut self,
        field: Field<E, T>,
        op: CompareOp,
        pattern: CompactString,
    ) -> Result<&mut Self> {
        self.compare(field, op, OperandKind::Value(Value::Text(pattern)))
    }

    /// `column LIKE '%value%'`
    pub fn like<E: 'static, T, V: IntoValue<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        let text = value.into_value().pattern_text();
        self.pattern(field, CompareOp::Like, format_compact!("%{text}%"))
    }

    /// `column NOT LIKE '%value%'`
    pub fn not_like<E: 'static, T, V: IntoValue<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        let text = value.into_value().pattern_text();
        self.pattern(field, CompareOp::NotLike, format_compact!("%{text}%"))
    }

    /// `column LIKE '%value'`
    pub fn like_left<E: 'static, T, V: IntoValue<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        let text = value.into_value().pattern_text();
        self.pattern(field, CompareOp::Like, format_compact!("%{text}"))
    }

    /// `column LIKE 'value%'`
    pub fn like_right<E: 'static, T, V: IntoValue<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
        let text = value.into_value().pattern_text();
        self.pattern(field, CompareOp::Like, format_compact!("{text}%"))
    }

    /// `column IN (...)`; an empty list renders `column IN (NULL)`.
    pub fn in_list<E, T, I, V>(&mut self, field: Field<E, T>, values: I) -> Result<&mut Self>
    where
        E: 'static,
        I: IntoIterator<Item = V>,
        V: IntoValue<T>,
    {
        let node = self.resolve(field).map(|left| PredicateNode::Comparison {
            left,
            op: CompareOp::In,
            right: Rhs::Values(values.into_iter().map(|v| v.into_value()).collect()),
        });
        self.append(node)
    }

    /// `column NOT IN (...)`; an empty list excludes nothing and renders `1 = 1`.
    pub fn not_in<E, T, I, V>(&mut self, field: Field<E, T>, values: I) -> Result<&mut Self>
    where
        E: 'static,
        I: IntoIterator<Item = V>,
        V: IntoValue<T>,
    {
        let node = self.resolve(field).map(|left| {
            let values: Vec<Value> = values.into_iter().map(|v| v.into_value()).collect();
            if values.is_empty() {
                PredicateNode::Raw {
                    template: "1 = 1".into(),
                    args: Vec::new(),
                }
            } else {
                PredicateNode::Comparison {
                    left,
                    op: CompareOp::NotIn,
                    right: Rhs::Values(values),
                }
            }
        });
        self.append(node)
    }

    pub fn between<E, T, L, H>(&mut self, field: Field<E, T>, low: L, high: H) -> Result<&mut Self>
    where
        E: 'static,
        L: IntoValue<T>,
        H: IntoValue<T>,
    {
        let node = self.resolve(field).map(|left| PredicateNode::Comparison {
            left,
            op: CompareOp::Between,
            right: Rhs::Range(low.into_value(), high.into_value()),
        });
        self.append(node)
    }

    pub fn not_between<E, T, L, H>(&mut self, field: Field<E, T>, low: L, high: H) -> Result<&mut Self>
    where
        E: 'static,
        L: IntoValue<T>,
        H: IntoValue<T>,
    {
        let node = self.resolve(field).map(|left| PredicateNode::Comparison {
            left,
            op: CompareOp::NotBetween,
            right: Rhs::Range(low.into_value(), high.into_value()),
        });
        self.append(node)
    }

    pub fn is_null<E: 'static, T>(&mut self, field: Field<E, T>) -> Result<&mut Self> {
        self.compare_unary(field, CompareOp::IsNull)
    }

    pub fn is_not_null<E: 'static, T>(&mut self, field: Field<E, T>) -> Result<&mut Self> {
        self.compare_unary(field, CompareOp::IsNotNull)
    }

    fn compare_unary<E: 'static, T>(&mut self, field: Field<E, T>, op: CompareOp) -> Result<&mut Self> {
        let node = self.resolve(field).map(|left| PredicateNode::Comparison {
            left,
            op,
            right: Rhs::None,
        });
        self.append(node)
    }

    /// Appends raw SQL; `{0}`, `{1}`, ... become placeholders bound to `args`.
    pub fn apply<I, V>(&mut self, template: &str, args: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        let node = parse_template(template, args.len()).map(|_| PredicateNode::Raw {
            template: template.into(),
            args,
        });
        self.append(node)
    }
}
