//! Small datasets shared by tests and doc examples.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_IDENTIFIER: AtomicU64 = AtomicU64::new(1);

/// A named person with a process-unique identifier.
///
/// Two people may share a name but never an identifier, which makes
/// `Person` handy for duplicate-key and grouping scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub identifier: String,
}

impl Person {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let n = NEXT_IDENTIFIER.fetch_add(1, Ordering::Relaxed);
        Self {
            name: name.into(),
            identifier: format!("person-{n:08}"),
        }
    }
}

/// Four people, two of them named "Mike".
///
/// # Example
///
/// ```
/// use ironstream::testing::sample_people;
///
/// let people = sample_people();
/// assert_eq!(people.iter().filter(|p| p.name == "Mike").count(), 2);
/// ```
#[must_use]
pub fn sample_people() -> Vec<Person> {
    ["Adam", "Mike", "John", "Mike"]
        .into_iter()
        .map(Person::new)
        .collect()
}

/// A fixed list of words with some repeats.
#[must_use]
pub fn sample_words() -> Vec<String> {
    [
        "stream", "map", "filter", "reduce", "collect", "map", "sorted", "limit", "stream",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
