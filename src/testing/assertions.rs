//! Assertion functions for testing stream results.

use crate::error::StreamError;
use crate::stream::{Stream, StreamItem};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use ironstream::Stream;
/// use ironstream::testing::assert_collections_equal;
///
/// let actual = Stream::of(vec![1, 2, 3]).map(|x| x * 2).to_vec().unwrap();
/// assert_collections_equal(&actual, &[2, 4, 6]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

fn multiset<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// Useful for results of unordered or parallel evaluation.
///
/// # Panics
///
/// Panics if the collections differ as multisets.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 2, 1], &[1, 1, 2, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    let actual_counts = multiset(actual);
    let expected_counts = multiset(expected);
    if actual_counts != expected_counts {
        let missing: Vec<_> = expected_counts
            .iter()
            .filter(|(k, n)| actual_counts.get(*k) != Some(*n))
            .map(|(k, _)| *k)
            .collect();
        let extra: Vec<_> = actual_counts
            .iter()
            .filter(|(k, n)| expected_counts.get(*k) != Some(*n))
            .map(|(k, _)| *k)
            .collect();

        panic!(
            "Collection content mismatch:\n  Missing or miscounted: {missing:?}\n  Extra or miscounted: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

/// Drain `stream` for one of the predicate assertions below.
fn drain<T: StreamItem>(stream: Stream<T>, assertion: &str) -> Vec<T> {
    match stream.to_vec() {
        Ok(items) => items,
        Err(err) => panic!("{assertion}: stream failed before it could be checked: {err:#}"),
    }
}

/// Run `stream` and assert every element it yields satisfies `predicate`.
///
/// Unlike [`Stream::all_match`], this reports the first offending element
/// and its position.
///
/// # Panics
///
/// Panics if the stream fails or any element does not satisfy the predicate.
///
/// # Example
///
/// ```
/// use ironstream::Stream;
/// use ironstream::testing::assert_all;
///
/// assert_all(Stream::of(vec![2, 4, 6]).map(|x| x + 1), |x| x % 2 == 1);
/// ```
pub fn assert_all<T: StreamItem + Debug>(stream: Stream<T>, predicate: impl Fn(&T) -> bool) {
    let items = drain(stream, "assert_all");
    if let Some((i, item)) = items.iter().enumerate().find(|(_, x)| !predicate(*x)) {
        panic!("Element #{i} failed the predicate:\n  Element: {item:?}\n  Stream yielded: {items:?}");
    }
}

/// Run `stream` and assert at least one element satisfies `predicate`.
///
/// # Panics
///
/// Panics if the stream fails or yields no matching element.
pub fn assert_any<T: StreamItem + Debug>(stream: Stream<T>, predicate: impl Fn(&T) -> bool) {
    let items = drain(stream, "assert_any");
    assert!(
        items.iter().any(predicate),
        "No element matched the predicate:\n  Stream yielded: {items:?}"
    );
}

/// Run `stream` and assert no element satisfies `predicate`.
///
/// # Panics
///
/// Panics if the stream fails or any element matches.
pub fn assert_none<T: StreamItem + Debug>(stream: Stream<T>, predicate: impl Fn(&T) -> bool) {
    let items = drain(stream, "assert_none");
    if let Some((i, item)) = items.iter().enumerate().find(|(_, x)| predicate(*x)) {
        panic!("Element #{i} unexpectedly matched:\n  Element: {item:?}\n  Stream yielded: {items:?}");
    }
}

/// Assert that two hash maps hold the same entries.
///
/// # Panics
///
/// Panics on a size mismatch, a missing key, or a differing value.
pub fn assert_maps_equal<K, V, S: BuildHasher>(
    actual: &HashMap<K, V, S>,
    expected: &HashMap<K, V, S>,
) where
    K: Debug + Eq + Hash,
    V: Debug + PartialEq,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "HashMap size mismatch:\n  Expected size: {}\n  Actual size: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (key, expected_value) in expected {
        match actual.get(key) {
            Some(actual_value) if actual_value == expected_value => {}
            Some(actual_value) => {
                panic!(
                    "HashMap value mismatch for key {key:?}:\n  Expected: {expected_value:?}\n  Actual: {actual_value:?}"
                );
            }
            None => {
                panic!("HashMap missing key: {key:?}");
            }
        }
    }
}

/// Assert that a terminal operation failed with `expected`.
///
/// # Panics
///
/// Panics if `result` is `Ok`, or fails with anything other than `expected`.
///
/// # Example
///
/// ```
/// use ironstream::{Stream, StreamError};
/// use ironstream::testing::assert_stream_error;
///
/// let s = Stream::of(vec![1, 2, 3]);
/// let again = s.clone();
/// s.count().unwrap();
/// assert_stream_error(again.count(), &StreamError::AlreadyConsumed);
/// ```
pub fn assert_stream_error<T: Debug>(result: anyhow::Result<T>, expected: &StreamError) {
    match result {
        Ok(value) => panic!("Expected error {expected:?}, got Ok({value:?})"),
        Err(err) => match err.downcast_ref::<StreamError>() {
            Some(actual) => assert_eq!(
                actual, expected,
                "Stream error mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
            ),
            None => panic!("Expected stream error {expected:?}, got unrelated error: {err:#}"),
        },
    }
}
