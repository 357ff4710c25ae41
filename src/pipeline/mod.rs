//! Declarative document pipelines.
//!
//! A [`Pipeline`] is an ordered list of stages built once and run against
//! any number of documents, either eagerly over a `Vec` or lazily over a
//! stream. Stage expressions come from the builder surface in
//! [`expr`]; there is no textual query parser.

pub mod aggregate;
pub mod expr;
mod function;
mod ordering;
mod runner;
mod stage;

pub use aggregate::{AggregateFunction, AliasedAggregate};
pub use expr::{AliasedExpr, Expr, FunctionExpr, IntoExpr};
pub use function::Function;
pub use ordering::{ascending, descending, SortDirection, SortOrdering};
pub use stage::Stage;

use futures::stream::BoxStream;

use crate::error::FirestoreResult;
use crate::model::{FieldPath, IntoFieldPath, PipelineDocument};

/// An immutable sequence of pipeline stages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn with(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Keeps only documents whose condition evaluates to boolean true.
    pub fn filter(self, condition: Expr) -> Self {
        self.with(Stage::Where(condition))
    }

    pub fn sort(self, orderings: Vec<SortOrdering>) -> Self {
        self.with(Stage::Sort(orderings))
    }

    pub fn select(self, projections: Vec<AliasedExpr>) -> Self {
        self.with(Stage::Select(projections))
    }

    /// Projects the named fields unchanged, mirroring a plain field list
    /// selection.
    pub fn select_fields<I, P>(self, paths: I) -> FirestoreResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: IntoFieldPath,
    {
        let mut projections = Vec::new();
        for path in paths {
            let path = path.into_field_path()?;
            let alias = path.canonical_string();
            projections.push(AliasedExpr::new(alias, Expr::Field(path)));
        }
        Ok(self.select(projections))
    }

    pub fn add_fields(self, projections: Vec<AliasedExpr>) -> Self {
        self.with(Stage::AddFields(projections))
    }

    pub fn remove_fields<I, P>(self, paths: I) -> FirestoreResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: IntoFieldPath,
    {
        let paths = paths
            .into_iter()
            .map(IntoFieldPath::into_field_path)
            .collect::<FirestoreResult<Vec<FieldPath>>>()?;
        Ok(self.with(Stage::RemoveFields(paths)))
    }

    pub fn distinct(self, projections: Vec<AliasedExpr>) -> Self {
        self.with(Stage::Distinct(projections))
    }

    pub fn aggregate(self, accumulators: Vec<AliasedAggregate>) -> Self {
        self.with(Stage::Aggregate {
            accumulators,
            groups: Vec::new(),
        })
    }

    pub fn aggregate_grouped(
        self,
        accumulators: Vec<AliasedAggregate>,
        groups: Vec<AliasedExpr>,
    ) -> Self {
        self.with(Stage::Aggregate {
            accumulators,
            groups,
        })
    }

    pub fn limit(self, limit: usize) -> Self {
        self.with(Stage::Limit(limit))
    }

    pub fn offset(self, offset: usize) -> Self {
        self.with(Stage::Offset(offset))
    }

    /// Runs the pipeline over an already-materialized document set.
    /// Output order matches input order except across sort stages.
    pub fn run(&self, documents: Vec<PipelineDocument>) -> Vec<PipelineDocument> {
        log::debug!(
            "running {} pipeline stages over {} documents",
            self.stages.len(),
            documents.len()
        );
        self.stages
            .iter()
            .fold(documents, |current, stage| {
                runner::apply_stage(stage, current)
            })
    }

    /// Runs the pipeline over a document stream. Per-document stages pass
    /// items through as they arrive; sort, distinct, and aggregate stages
    /// are full barriers and buffer the upstream before emitting.
    pub fn run_stream<'a>(
        &self,
        documents: BoxStream<'a, PipelineDocument>,
    ) -> BoxStream<'a, PipelineDocument> {
        log::debug!("running {} pipeline stages over a stream", self.stages.len());
        self.stages
            .iter()
            .cloned()
            .fold(documents, |current, stage| {
                runner::apply_stage_stream(stage, current)
            })
    }
}
