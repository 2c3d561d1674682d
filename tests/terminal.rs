use anyhow::Result;
use ironstream::testing::*;
use ironstream::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn one_to_hundred() -> Stream<i32> {
    IntStream::range_closed(1, 100).boxed().unordered()
}

#[test]
fn matching_on_values() -> Result<()> {
    assert!(Stream::of(vec![2, 4, 6]).all_match(|x| x % 2 == 0)?);
    assert!(!Stream::of(vec![2, 3, 6]).all_match(|x| x % 2 == 0)?);
    assert!(Stream::of(vec![1, 2, 3]).any_match(|x| *x == 2)?);
    assert!(!Stream::of(vec![1, 2, 3]).any_match(|x| *x == 5)?);
    assert!(Stream::of(vec![1, 2, 3]).none_match(|x| *x > 3)?);
    assert!(!Stream::of(vec![1, 2, 3]).none_match(|x| *x > 2)?);
    Ok(())
}

#[test]
fn match_assertions_agree_with_match_terminals() -> Result<()> {
    let evens = || Stream::of(vec![1, 2, 3, 4, 5, 6]).filter(|x: &i32| x % 2 == 0);
    assert!(evens().all_match(|x| x % 2 == 0)?);
    assert_all(evens(), |x| x % 2 == 0);
    assert!(evens().any_match(|x| *x == 4)?);
    assert_any(evens(), |x| *x == 4);
    assert!(evens().none_match(|x| *x > 6)?);
    assert_none(evens(), |x| *x > 6);

    assert_none(Stream::<i32>::empty(), |_| true);
    assert_all(Stream::<i32>::empty(), |_| false);
    Ok(())
}

#[test]
#[should_panic(expected = "Element #1 failed the predicate")]
fn assert_all_reports_the_offending_element() {
    assert_all(Stream::of(vec![2, 3, 4]), |x| x % 2 == 0);
}

#[test]
#[should_panic(expected = "No element matched")]
fn assert_any_on_empty_stream_panics() {
    assert_any(Stream::<i32>::empty(), |_| true);
}

#[test]
#[should_panic(expected = "stream failed before it could be checked")]
fn assert_none_surfaces_stream_errors() {
    let s = Stream::of(vec![1]);
    let again = s.clone();
    let _ = s.to_vec();
    assert_none(again, |_| false);
}

#[test]
fn matching_on_empty_is_vacuous() -> Result<()> {
    assert!(Stream::<i32>::empty().all_match(|_| false)?);
    assert!(Stream::<i32>::empty().none_match(|_| true)?);
    assert!(!Stream::<i32>::empty().any_match(|_| true)?);
    Ok(())
}

#[test]
fn matching_short_circuits_infinite_sources() -> Result<()> {
    let pulled = Arc::new(AtomicUsize::new(0));
    let p = Arc::clone(&pulled);
    let found = Stream::iterate(1, |x: &i32| x + 1)
        .peek(move |_: &i32| {
            p.fetch_add(1, Ordering::SeqCst);
        })
        .any_match(|x| *x == 10)?;
    assert!(found);
    assert_eq!(pulled.load(Ordering::SeqCst), 10);

    assert!(!Stream::generate(|| 3).all_match(|x| *x < 3)?);
    assert!(!Stream::iterate(0, |x: &i32| x + 1).none_match(|x| *x == 1000)?);
    Ok(())
}

#[test]
fn matching_ignores_parallel_mode() -> Result<()> {
    let found = Stream::iterate(1u64, |x: &u64| x * 2)
        .parallel()
        .any_match(|x| *x > 1_000)?;
    assert!(found);
    Ok(())
}

#[test]
fn count_sized_and_unsized() -> Result<()> {
    assert_eq!(one_to_hundred().count()?, 100);
    assert_eq!(Stream::<i32>::empty().count()?, 0);
    assert_eq!(one_to_hundred().filter(|x: &i32| x % 3 == 0).count()?, 33);
    assert_eq!(Stream::of(vec![1, 1, 2]).distinct().count()?, 2);
    Ok(())
}

#[test]
fn find_first_and_find_any() -> Result<()> {
    assert_eq!(one_to_hundred().find_first()?, Some(1));
    assert_eq!(Stream::<i32>::empty().find_first()?, None);

    let any = one_to_hundred().find_any()?;
    assert!(any.is_some_and(|x| (1..=100).contains(&x)));
    assert_eq!(Stream::iterate(5, |x: &i32| x + 1).find_any()?, Some(5));
    Ok(())
}

#[test]
fn min_and_max() -> Result<()> {
    assert_eq!(one_to_hundred().min()?, Some(1));
    assert_eq!(one_to_hundred().max()?, Some(100));
    assert_eq!(Stream::<i32>::empty().min()?, None);

    let longest = Stream::of(vec!["a", "ccc", "bb", "ddd"])
        .max_by(|a: &&str, b: &&str| a.len().cmp(&b.len()))?;
    assert_eq!(longest, Some("ccc"));
    let shortest = Stream::of(vec!["bb", "x", "y"])
        .min_by(|a: &&str, b: &&str| a.len().cmp(&b.len()))?;
    assert_eq!(shortest, Some("x"));
    Ok(())
}

#[test]
fn min_max_with_none_elements() -> Result<()> {
    let values = || Stream::of(vec![Some(1), None, Some(3)]);

    // Option's own ordering treats None as smallest.
    assert_eq!(values().min()?, Some(None));
    assert_eq!(values().max()?, Some(Some(3)));

    assert_stream_error(
        values().strict_min_by(|a: &i32, b: &i32| a.cmp(b)),
        &StreamError::NullElement { operation: "min" },
    );
    assert_stream_error(
        values().strict_max_by(|a: &i32, b: &i32| a.cmp(b)),
        &StreamError::NullElement { operation: "max" },
    );

    let present = Stream::of(vec![Some(4), Some(2), Some(9)]);
    assert_eq!(present.strict_max_by(|a: &i32, b: &i32| a.cmp(b))?, Some(9));
    Ok(())
}

#[test]
fn for_each_visits_every_element() -> Result<()> {
    let seen = Mutex::new(Vec::new());
    Stream::of(vec!["a", "b", "c"]).for_each(|s| seen.lock().unwrap().push(s))?;
    assert_eq!(seen.into_inner().unwrap(), vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn for_each_ordered_keeps_encounter_order() -> Result<()> {
    let mut seen = Vec::new();
    one_to_hundred().for_each_ordered(|x| seen.push(x))?;
    assert_eq!(seen, (1..=100).collect::<Vec<_>>());

    let mut parallel_seen = Vec::new();
    IntStream::range(0, 1_000)
        .boxed()
        .map(|x: i32| x * 2)
        .parallel()
        .for_each_ordered(|x| parallel_seen.push(x))?;
    assert_eq!(parallel_seen, (0..1_000).map(|x| x * 2).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn reduce_variants() -> Result<()> {
    let sum = Stream::of(vec![1, 2, 3, 4, 5]).reduce(|a, b| a + b)?;
    assert_eq!(sum, Some(15));
    assert_eq!(Stream::<i32>::empty().reduce(|a, b| a + b)?, None);

    let from_hundred = Stream::of(vec![3, 5, 9]).reduce_from(100, |a, b| a + b)?;
    assert_eq!(from_hundred, 117);
    let identity_only = Stream::<i32>::empty().reduce_from(17, |a, b| a + b)?;
    assert_eq!(identity_only, 17);
    Ok(())
}

#[test]
fn reduce_combine_in_parallel() -> Result<()> {
    let total = IntStream::range_closed(1, 100_000)
        .map_to_obj(|x| x.to_string())
        .parallel()
        .reduce_combine(
            0i64,
            |acc, s: String| acc + s.parse::<i64>().unwrap_or(0),
            |a, b| a + b,
        )?;
    assert_eq!(total, 5_000_050_000);
    Ok(())
}

#[test]
fn to_vec_keeps_order() -> Result<()> {
    let out = IntStream::range_closed(1, 100).boxed().to_vec()?;
    assert_eq!(out.len(), 100);
    assert_eq!(out.first(), Some(&1));
    assert_eq!(out.last(), Some(&100));
    Ok(())
}

#[test]
fn collect_with_three_functions() -> Result<()> {
    let joined = Stream::of(vec!["a", "b", "c"]).collect_with(
        String::new,
        |s: &mut String, x| s.push_str(x),
        |s: &mut String, other| s.push_str(&other),
    )?;
    assert_eq!(joined, "abc");

    let lengths = Stream::of(sample_words()).parallel().collect_with(
        HashMap::new,
        |m: &mut HashMap<String, usize>, w: String| {
            m.insert(w.clone(), w.len());
        },
        |m: &mut HashMap<String, usize>, other| m.extend(other),
    )?;
    assert_eq!(lengths["filter"], 6);
    assert_eq!(lengths.len(), 7);
    Ok(())
}

#[test]
fn failed_terminal_still_consumes() {
    let s = Stream::of(vec![Some(1), None]);
    let again = s.clone();
    assert!(s.strict_min_by(|a: &i32, b: &i32| a.cmp(b)).is_err());
    assert_stream_error(again.count(), &StreamError::AlreadyConsumed);
}
