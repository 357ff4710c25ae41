//! Shared test fixtures.
//!
//! Every builder returns a freshly constructed value, so no state is
//! shared or mutated across test cases.

use std::collections::BTreeMap;

use firestore_pipeline::model::{DocumentKey, PipelineDocument, Timestamp};
use firestore_pipeline::value::{FirestoreValue, MapValue};

pub fn doc(path: &str, fields: Vec<(&str, FirestoreValue)>) -> PipelineDocument {
    PipelineDocument::new(
        DocumentKey::from_string(path).expect("valid test document path"),
        MapValue::from_entries(fields),
    )
}

pub fn array<I, V>(values: I) -> FirestoreValue
where
    I: IntoIterator<Item = V>,
    V: Into<FirestoreValue>,
{
    FirestoreValue::from_array(values.into_iter().map(Into::into).collect())
}

pub fn map(entries: Vec<(&str, FirestoreValue)>) -> FirestoreValue {
    let fields: BTreeMap<String, FirestoreValue> = entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    FirestoreValue::from_map(fields)
}

fn book(
    id: &str,
    title: &str,
    author: &str,
    genre: &str,
    published: i64,
    rating: f64,
    tags: [&str; 3],
    awards: Vec<(&str, FirestoreValue)>,
) -> PipelineDocument {
    doc(
        &format!("books/{id}"),
        vec![
            ("title", title.into()),
            ("author", author.into()),
            ("genre", genre.into()),
            ("published", published.into()),
            ("rating", rating.into()),
            ("tags", array(tags)),
            ("awards", map(awards)),
        ],
    )
}

/// The standard eleven-book corpus. Book 11 carries only a title, an
/// author, and a timestamp, which makes it the "missing fields" probe.
pub fn books() -> Vec<PipelineDocument> {
    vec![
        doc(
            "books/book1",
            vec![
                ("title", "The Hitchhiker's Guide to the Galaxy".into()),
                ("author", "Douglas Adams".into()),
                ("genre", "Science Fiction".into()),
                ("published", 1979.into()),
                ("rating", 4.2.into()),
                ("tags", array(["comedy", "space", "adventure"])),
                (
                    "awards",
                    map(vec![("hugo", true.into()), ("nebula", false.into())]),
                ),
                (
                    "nestedField",
                    map(vec![("level.1", map(vec![("level.2", true.into())]))]),
                ),
            ],
        ),
        book(
            "book2",
            "Pride and Prejudice",
            "Jane Austen",
            "Romance",
            1813,
            4.5,
            ["classic", "social commentary", "love"],
            vec![("none", true.into())],
        ),
        book(
            "book3",
            "One Hundred Years of Solitude",
            "Gabriel García Márquez",
            "Magical Realism",
            1967,
            4.3,
            ["family", "history", "fantasy"],
            vec![("nobel", true.into()), ("nebula", false.into())],
        ),
        book(
            "book4",
            "The Lord of the Rings",
            "J.R.R. Tolkien",
            "Fantasy",
            1954,
            4.7,
            ["adventure", "magic", "epic"],
            vec![("hugo", false.into()), ("nebula", false.into())],
        ),
        book(
            "book5",
            "The Handmaid's Tale",
            "Margaret Atwood",
            "Dystopian",
            1985,
            4.1,
            ["feminism", "totalitarianism", "resistance"],
            vec![("arthur c. clarke", true.into()), ("booker prize", false.into())],
        ),
        book(
            "book6",
            "Crime and Punishment",
            "Fyodor Dostoevsky",
            "Psychological Thriller",
            1866,
            4.3,
            ["philosophy", "crime", "redemption"],
            vec![("none", true.into())],
        ),
        book(
            "book7",
            "To Kill a Mockingbird",
            "Harper Lee",
            "Southern Gothic",
            1960,
            4.2,
            ["racism", "injustice", "coming-of-age"],
            vec![("pulitzer", true.into())],
        ),
        book(
            "book8",
            "1984",
            "George Orwell",
            "Dystopian",
            1949,
            4.2,
            ["surveillance", "totalitarianism", "propaganda"],
            vec![("prometheus", true.into())],
        ),
        book(
            "book9",
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "Modernist",
            1925,
            4.0,
            ["wealth", "american dream", "love"],
            vec![("none", true.into())],
        ),
        book(
            "book10",
            "Dune",
            "Frank Herbert",
            "Science Fiction",
            1965,
            4.6,
            ["politics", "desert", "ecology"],
            vec![("hugo", true.into()), ("nebula", true.into())],
        ),
        doc(
            "books/book11",
            vec![
                ("title", "Timestamp Book".into()),
                ("author", "Timestamp Author".into()),
                ("timestamp", Timestamp::new(1_672_531_200, 0).into()),
            ],
        ),
    ]
}

/// Titles of the given documents, in order, for compact assertions.
pub fn titles(documents: &[PipelineDocument]) -> Vec<String> {
    use firestore_pipeline::value::ValueKind;
    documents
        .iter()
        .map(|document| {
            match document.fields().get("title").map(FirestoreValue::kind) {
                Some(ValueKind::String(title)) => title.clone(),
                _ => "<missing>".to_string(),
            }
        })
        .collect()
}

/// Ids of the given documents, in order.
pub fn ids(documents: &[PipelineDocument]) -> Vec<String> {
    documents
        .iter()
        .map(|document| {
            document
                .key()
                .map(|key| key.id().to_string())
                .unwrap_or_else(|| "<keyless>".to_string())
        })
        .collect()
}
