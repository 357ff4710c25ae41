use crate::pipeline::Expr;

/// An accumulator applied per group by an aggregate stage.
#[derive(Clone, Debug, PartialEq)]
pub enum AggregateFunction {
    /// Number of input documents.
    CountAll,
    /// Number of documents where the expression yields a concrete,
    /// non-null value.
    Count(Expr),
    /// Number of documents where the expression yields boolean true.
    CountIf(Expr),
    /// Number of distinct concrete values under the collation total order.
    CountDistinct(Expr),
    Sum(Expr),
    Avg(Expr),
    Minimum(Expr),
    Maximum(Expr),
}

impl AggregateFunction {
    pub fn alias(self, name: impl Into<String>) -> AliasedAggregate {
        AliasedAggregate {
            alias: name.into(),
            function: self,
        }
    }
}

/// An accumulator bound to its output field name.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasedAggregate {
    alias: String,
    function: AggregateFunction,
}

impl AliasedAggregate {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn function(&self) -> &AggregateFunction {
        &self.function
    }
}

pub fn count_all() -> AggregateFunction {
    AggregateFunction::CountAll
}

pub fn count(expr: Expr) -> AggregateFunction {
    AggregateFunction::Count(expr)
}

pub fn count_if(expr: Expr) -> AggregateFunction {
    AggregateFunction::CountIf(expr)
}

pub fn count_distinct(expr: Expr) -> AggregateFunction {
    AggregateFunction::CountDistinct(expr)
}

pub fn sum(expr: Expr) -> AggregateFunction {
    AggregateFunction::Sum(expr)
}

pub fn avg(expr: Expr) -> AggregateFunction {
    AggregateFunction::Avg(expr)
}

pub fn minimum(expr: Expr) -> AggregateFunction {
    AggregateFunction::Minimum(expr)
}

pub fn maximum(expr: Expr) -> AggregateFunction {
    AggregateFunction::Maximum(expr)
}
