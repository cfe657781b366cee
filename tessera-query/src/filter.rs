//! Compiled predicate tree and its SQL rendering.

use serde::Serialize;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::expression::NodePath;
use crate::operator::SqlOp;
use crate::sql::SqlBuilder;
use crate::value::FilterValue;

/// Bound parameters of one comparison; inline for everything but long
/// `in` lists.
pub type ParamList = SmallVec<[FilterValue; 2]>;

/// One `column op params` comparison.
///
/// `table` and `column` come from the record type enum and the property
/// metadata, never from the condition text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Table the column belongs to.
    pub table: &'static str,
    /// Column identifier.
    pub column: SmolStr,
    /// Comparison emitted.
    pub op: SqlOp,
    /// Values bound as parameters, wildcards already applied.
    pub params: ParamList,
    /// Condition this comparison was compiled from.
    pub path: NodePath,
}

impl Comparison {
    fn write_sql(&self, builder: &mut SqlBuilder) {
        builder.push_identifier(&self.column).push(" ");
        match self.op {
            SqlOp::Like | SqlOp::NotLike => {
                let escape = builder.db_type().like_escape();
                builder
                    .push(self.op.as_sql())
                    .push(" ")
                    .push_param_list(&self.params)
                    .push(" ")
                    .push(escape);
            }
            SqlOp::In | SqlOp::NotIn => {
                builder
                    .push(self.op.as_sql())
                    .push(" (")
                    .push_param_list(&self.params)
                    .push(")");
            }
            SqlOp::Between => {
                builder.push("BETWEEN ");
                for (i, param) in self.params.iter().enumerate() {
                    if i > 0 {
                        builder.push(" AND ");
                    }
                    builder.push_param(param.clone());
                }
            }
            SqlOp::Eq | SqlOp::NotEq | SqlOp::Gt | SqlOp::Lt | SqlOp::Gte | SqlOp::Lte => {
                builder
                    .push(self.op.as_sql())
                    .push(" ")
                    .push_param_list(&self.params);
            }
        }
    }
}

/// A folded predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "children", rename_all = "lowercase")]
pub enum Predicate {
    /// A single comparison.
    Compare(Comparison),
    /// All children must hold.
    And(Vec<Predicate>),
    /// At least one child must hold.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// AND the given predicates.
    ///
    /// Returns `None` when there is nothing to combine and the sole
    /// predicate when there is one, so empty subtrees drop out of the
    /// parent fold instead of becoming an always-true clause.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::fold(predicates, Self::And)
    }

    /// OR the given predicates. See [`Predicate::and`] for the folding rules.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::fold(predicates, Self::Or)
    }

    fn fold(
        predicates: impl IntoIterator<Item = Predicate>,
        combine: fn(Vec<Predicate>) -> Predicate,
    ) -> Option<Self> {
        let mut predicates: Vec<_> = predicates.into_iter().collect();
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(combine(predicates)),
        }
    }

    /// Every comparison in the tree, in rendering order.
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Self::Compare(cmp) => out.push(cmp),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_comparisons(out);
                }
            }
        }
    }

    /// Number of bound parameters the rendered SQL will carry.
    pub fn param_count(&self) -> usize {
        self.comparisons().iter().map(|c| c.params.len()).sum()
    }

    /// Render into a builder.
    ///
    /// Each child of a multi-child AND/OR is parenthesized, so precedence
    /// never depends on the database's operator rules.
    pub fn write_sql(&self, builder: &mut SqlBuilder) {
        match self {
            Self::Compare(cmp) => cmp.write_sql(builder),
            Self::And(children) => Self::write_joined(children, " AND ", builder),
            Self::Or(children) => Self::write_joined(children, " OR ", builder),
        }
    }

    fn write_joined(children: &[Predicate], sep: &str, builder: &mut SqlBuilder) {
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                builder.push(sep);
            }
            builder.push("(");
            child.write_sql(builder);
            builder.push(")");
        }
    }
}
