use crate::pipeline::{Expr, IntoExpr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key: the expression producing the key plus its direction.
#[derive(Clone, Debug, PartialEq)]
pub struct SortOrdering {
    expr: Expr,
    direction: SortDirection,
}

impl SortOrdering {
    pub fn new(expr: Expr, direction: SortDirection) -> Self {
        Self { expr, direction }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

pub fn ascending(expr: impl IntoExpr) -> SortOrdering {
    SortOrdering::new(expr.into_expr(), SortDirection::Ascending)
}

pub fn descending(expr: impl IntoExpr) -> SortOrdering {
    SortOrdering::new(expr.into_expr(), SortDirection::Descending)
}

impl Expr {
    pub fn ascending(self) -> SortOrdering {
        ascending(self)
    }

    pub fn descending(self) -> SortOrdering {
        descending(self)
    }
}
