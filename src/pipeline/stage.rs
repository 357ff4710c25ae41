use crate::model::FieldPath;
use crate::pipeline::{AliasedAggregate, AliasedExpr, Expr, SortOrdering};

/// One step of a pipeline. Stages are descriptors only; execution lives
/// in the runner.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    /// Keeps documents whose expression evaluates to boolean true.
    /// False, null, unset, and error all drop the document.
    Where(Expr),
    /// Full barrier: buffers the upstream, emits in collation order with
    /// ties broken by later keys and finally the document key.
    Sort(Vec<SortOrdering>),
    /// Replaces the field set with the evaluated projections. An unset or
    /// errored projection omits its field; an explicit null keeps it.
    Select(Vec<AliasedExpr>),
    /// Like `Select`, but layered on top of the existing field set.
    AddFields(Vec<AliasedExpr>),
    /// Drops top-level output fields by name.
    RemoveFields(Vec<FieldPath>),
    /// Full barrier: one output row per distinct evaluated tuple.
    Distinct(Vec<AliasedExpr>),
    /// Full barrier: groups the upstream and runs accumulators per group.
    Aggregate {
        accumulators: Vec<AliasedAggregate>,
        groups: Vec<AliasedExpr>,
    },
    Limit(usize),
    Offset(usize),
}
