use std::cmp::Ordering;
use std::collections::BTreeMap;

use futures_util::stream::{self, BoxStream, StreamExt};

use crate::evaluation::{evaluate, EvaluationResult};
use crate::model::{FieldPath, PipelineDocument};
use crate::pipeline::{
    AggregateFunction, AliasedAggregate, AliasedExpr, Expr, SortDirection, SortOrdering, Stage,
};
use crate::value::{compare, FirestoreValue, MapValue, Numeric};

pub(super) fn apply_stage(stage: &Stage, input: Vec<PipelineDocument>) -> Vec<PipelineDocument> {
    match stage {
        Stage::Where(expr) => input
            .into_iter()
            .filter(|document| passes(expr, document))
            .collect(),
        Stage::Sort(orderings) => sort_documents(orderings, input),
        Stage::Select(projections) => input
            .into_iter()
            .map(|document| select_document(projections, document))
            .collect(),
        Stage::AddFields(projections) => input
            .into_iter()
            .map(|document| add_fields_document(projections, document))
            .collect(),
        Stage::RemoveFields(paths) => input
            .into_iter()
            .map(|document| remove_fields_document(paths, document))
            .collect(),
        Stage::Distinct(projections) => distinct_documents(projections, input),
        Stage::Aggregate {
            accumulators,
            groups,
        } => aggregate_documents(accumulators, groups, input),
        Stage::Limit(limit) => input.into_iter().take(*limit).collect(),
        Stage::Offset(offset) => input.into_iter().skip(*offset).collect(),
    }
}

pub(super) fn apply_stage_stream<'a>(
    stage: Stage,
    input: BoxStream<'a, PipelineDocument>,
) -> BoxStream<'a, PipelineDocument> {
    match stage {
        Stage::Where(expr) => input
            .filter(move |document| std::future::ready(passes(&expr, document)))
            .boxed(),
        Stage::Select(projections) => input
            .map(move |document| select_document(&projections, document))
            .boxed(),
        Stage::AddFields(projections) => input
            .map(move |document| add_fields_document(&projections, document))
            .boxed(),
        Stage::RemoveFields(paths) => input
            .map(move |document| remove_fields_document(&paths, document))
            .boxed(),
        Stage::Limit(limit) => input.take(limit).boxed(),
        Stage::Offset(offset) => input.skip(offset).boxed(),
        // Barrier stages buffer the whole upstream before emitting.
        barrier => stream::once(async move {
            let documents = input.collect::<Vec<_>>().await;
            stream::iter(apply_stage(&barrier, documents))
        })
        .flatten()
        .boxed(),
    }
}

fn passes(expr: &Expr, document: &PipelineDocument) -> bool {
    evaluate(expr, document).is_true()
}

/// Evaluates projections into an output field map. Unset and errored
/// expressions omit their field; explicit nulls are kept.
fn project(projections: &[AliasedExpr], document: &PipelineDocument) -> MapValue {
    let mut fields = BTreeMap::new();
    for projection in projections {
        match evaluate(projection.expr(), document) {
            EvaluationResult::Value(value) => {
                fields.insert(projection.alias().to_string(), value);
            }
            EvaluationResult::Null => {
                fields.insert(projection.alias().to_string(), FirestoreValue::null());
            }
            EvaluationResult::Unset | EvaluationResult::Error(_) => {}
        }
    }
    MapValue::new(fields)
}

fn select_document(projections: &[AliasedExpr], document: PipelineDocument) -> PipelineDocument {
    let fields = project(projections, &document);
    document.with_fields(fields)
}

fn add_fields_document(
    projections: &[AliasedExpr],
    document: PipelineDocument,
) -> PipelineDocument {
    let added = project(projections, &document);
    let fields = document.fields().merged_with(&added);
    document.with_fields(fields)
}

fn remove_fields_document(paths: &[FieldPath], document: PipelineDocument) -> PipelineDocument {
    let mut fields = document.fields().clone();
    for path in paths {
        fields = remove_path(&fields, path.segments());
    }
    document.with_fields(fields)
}

fn remove_path(fields: &MapValue, segments: &[String]) -> MapValue {
    match segments {
        [] => fields.clone(),
        [leaf] => fields.without(leaf),
        [head, rest @ ..] => match fields.get(head).map(FirestoreValue::kind) {
            Some(crate::value::ValueKind::Map(child)) => {
                let pruned = remove_path(child, rest);
                let mut copy = fields.fields().clone();
                copy.insert(head.clone(), FirestoreValue::from_map_value(pruned));
                MapValue::new(copy)
            }
            _ => fields.clone(),
        },
    }
}

/// One evaluated sort key. `None` is a missing (unset or unevaluable)
/// key, which sorts before every present value.
type SortKey = Vec<Option<FirestoreValue>>;

fn sort_key(orderings: &[SortOrdering], document: &PipelineDocument) -> SortKey {
    orderings
        .iter()
        .map(|ordering| match evaluate(ordering.expr(), document) {
            EvaluationResult::Value(value) => Some(value),
            EvaluationResult::Null => Some(FirestoreValue::null()),
            EvaluationResult::Unset | EvaluationResult::Error(_) => None,
        })
        .collect()
}

fn compare_keys(orderings: &[SortOrdering], left: &SortKey, right: &SortKey) -> Ordering {
    for (index, ordering) in orderings.iter().enumerate() {
        let component = match (&left[index], &right[index]) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => compare::compare(l, r),
        };
        let directed = match ordering.direction() {
            SortDirection::Ascending => component,
            SortDirection::Descending => component.reverse(),
        };
        if directed != Ordering::Equal {
            return directed;
        }
    }
    Ordering::Equal
}

fn sort_documents(
    orderings: &[SortOrdering],
    input: Vec<PipelineDocument>,
) -> Vec<PipelineDocument> {
    let mut keyed: Vec<(SortKey, PipelineDocument)> = input
        .into_iter()
        .map(|document| (sort_key(orderings, &document), document))
        .collect();
    keyed.sort_by(|(left_key, left_doc), (right_key, right_doc)| {
        compare_keys(orderings, left_key, right_key).then_with(|| {
            // Final tie-break: document identity, keyless rows first.
            match (left_doc.key(), right_doc.key()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(l), Some(r)) => l.cmp(r),
            }
        })
    });
    keyed.into_iter().map(|(_, document)| document).collect()
}

/// Group key for `distinct` and grouped aggregation: `None` marks an
/// unset or unevaluable component and groups with other `None`s.
type GroupKey = Vec<Option<FirestoreValue>>;

fn group_key(projections: &[AliasedExpr], document: &PipelineDocument) -> GroupKey {
    projections
        .iter()
        .map(|projection| match evaluate(projection.expr(), document) {
            EvaluationResult::Value(value) => Some(value),
            EvaluationResult::Null => Some(FirestoreValue::null()),
            EvaluationResult::Unset | EvaluationResult::Error(_) => None,
        })
        .collect()
}

fn keys_equal(left: &GroupKey, right: &GroupKey) -> bool {
    left.len() == right.len()
        && left.iter().zip(right.iter()).all(|pair| match pair {
            (None, None) => true,
            (Some(l), Some(r)) => compare::compare(l, r) == Ordering::Equal,
            _ => false,
        })
}

fn key_fields(projections: &[AliasedExpr], key: &GroupKey) -> BTreeMap<String, FirestoreValue> {
    let mut fields = BTreeMap::new();
    for (projection, component) in projections.iter().zip(key.iter()) {
        if let Some(value) = component {
            fields.insert(projection.alias().to_string(), value.clone());
        }
    }
    fields
}

fn distinct_documents(
    projections: &[AliasedExpr],
    input: Vec<PipelineDocument>,
) -> Vec<PipelineDocument> {
    let mut seen: Vec<GroupKey> = Vec::new();
    let mut output = Vec::new();
    for document in &input {
        let key = group_key(projections, document);
        if seen.iter().any(|existing| keys_equal(existing, &key)) {
            continue;
        }
        output.push(PipelineDocument::keyless(MapValue::new(key_fields(
            projections,
            &key,
        ))));
        seen.push(key);
    }
    output
}

fn aggregate_documents(
    accumulators: &[AliasedAggregate],
    groups: &[AliasedExpr],
    input: Vec<PipelineDocument>,
) -> Vec<PipelineDocument> {
    struct Group {
        key: GroupKey,
        documents: Vec<PipelineDocument>,
    }

    // Without grouping there is always exactly one output row, even for
    // an empty input.
    let mut grouped: Vec<Group> = if groups.is_empty() {
        vec![Group {
            key: Vec::new(),
            documents: Vec::new(),
        }]
    } else {
        Vec::new()
    };

    for document in input {
        if groups.is_empty() {
            grouped[0].documents.push(document);
            continue;
        }
        let key = group_key(groups, &document);
        match grouped
            .iter_mut()
            .find(|group| keys_equal(&group.key, &key))
        {
            Some(group) => group.documents.push(document),
            None => grouped.push(Group {
                key,
                documents: vec![document],
            }),
        }
    }

    grouped
        .into_iter()
        .map(|group| {
            let mut fields = key_fields(groups, &group.key);
            for accumulator in accumulators {
                if let Some(value) = accumulate(accumulator.function(), &group.documents) {
                    fields.insert(accumulator.alias().to_string(), value);
                }
            }
            PipelineDocument::keyless(MapValue::new(fields))
        })
        .collect()
}

/// Runs one accumulator over a group. `None` omits the output field
/// (only integer sum overflow does this today).
fn accumulate(
    function: &AggregateFunction,
    documents: &[PipelineDocument],
) -> Option<FirestoreValue> {
    match function {
        AggregateFunction::CountAll => Some(FirestoreValue::from_integer(documents.len() as i64)),
        AggregateFunction::Count(expr) => {
            let count = concrete_values(expr, documents).count();
            Some(FirestoreValue::from_integer(count as i64))
        }
        AggregateFunction::CountIf(expr) => {
            let count = documents
                .iter()
                .filter(|document| evaluate(expr, document).is_true())
                .count();
            Some(FirestoreValue::from_integer(count as i64))
        }
        AggregateFunction::CountDistinct(expr) => {
            let mut distinct: Vec<FirestoreValue> = Vec::new();
            for value in concrete_values(expr, documents) {
                if !distinct
                    .iter()
                    .any(|existing| compare::compare(existing, &value) == Ordering::Equal)
                {
                    distinct.push(value);
                }
            }
            Some(FirestoreValue::from_integer(distinct.len() as i64))
        }
        AggregateFunction::Sum(expr) => {
            let mut integer_sum: Option<i64> = Some(0);
            let mut double_sum = 0.0;
            let mut saw_double = false;
            for value in concrete_values(expr, documents) {
                match value.as_numeric() {
                    Some(Numeric::Integer(amount)) => {
                        integer_sum = integer_sum.and_then(|sum| sum.checked_add(amount));
                        double_sum += amount as f64;
                    }
                    Some(Numeric::Double(amount)) => {
                        saw_double = true;
                        double_sum += amount;
                    }
                    None => {}
                }
            }
            if saw_double {
                Some(FirestoreValue::from_double(double_sum))
            } else {
                integer_sum.map(FirestoreValue::from_integer)
            }
        }
        AggregateFunction::Avg(expr) => {
            let mut sum = 0.0;
            let mut count = 0usize;
            for value in concrete_values(expr, documents) {
                if let Some(numeric) = value.as_numeric() {
                    sum += numeric.as_f64();
                    count += 1;
                }
            }
            if count == 0 {
                Some(FirestoreValue::null())
            } else {
                Some(FirestoreValue::from_double(sum / count as f64))
            }
        }
        AggregateFunction::Minimum(expr) => Some(extreme(expr, documents, Ordering::Less)),
        AggregateFunction::Maximum(expr) => Some(extreme(expr, documents, Ordering::Greater)),
    }
}

fn extreme(expr: &Expr, documents: &[PipelineDocument], keep: Ordering) -> FirestoreValue {
    let mut best: Option<FirestoreValue> = None;
    for value in concrete_values(expr, documents) {
        best = Some(match best.take() {
            None => value,
            Some(current) => {
                if compare::compare(&value, &current) == keep {
                    value
                } else {
                    current
                }
            }
        });
    }
    best.unwrap_or_else(FirestoreValue::null)
}

fn concrete_values<'a>(
    expr: &'a Expr,
    documents: &'a [PipelineDocument],
) -> impl Iterator<Item = FirestoreValue> + 'a {
    documents
        .iter()
        .filter_map(move |document| match evaluate(expr, document) {
            EvaluationResult::Value(value) => Some(value),
            _ => None,
        })
}
