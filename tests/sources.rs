use anyhow::Result;
use ironstream::testing::*;
use ironstream::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn one_to_hundred() -> Stream<i32> {
    IntStream::range_closed(1, 100).boxed().unordered()
}

#[test]
fn of_keeps_encounter_order() -> Result<()> {
    let out = Stream::of(vec!["to", "List", "collector", "test"]).to_vec()?;
    assert_collections_equal(&out, &["to", "List", "collector", "test"]);
    Ok(())
}

#[test]
fn from_vec_attaches_to_existing_pipeline() -> Result<()> {
    let p = TestPipeline::new();
    let s = from_vec(&p, vec![5, 2, 7, 3]);
    assert_eq!(p.node_count(), 1);
    assert_eq!(s.to_vec()?, vec![5, 2, 7, 3]);
    Ok(())
}

#[test]
fn from_iter_and_collect_into_stream() -> Result<()> {
    let p = TestPipeline::new();
    let a = from_iter(&p, 1..=3).to_vec()?;
    let b: Stream<i32> = (4..=6).collect();
    assert_eq!(a, vec![1, 2, 3]);
    assert_eq!(b.to_vec()?, vec![4, 5, 6]);
    Ok(())
}

#[test]
fn empty_stream_has_no_elements() -> Result<()> {
    assert_eq!(Stream::<i32>::empty().count()?, 0);
    assert!(Stream::<i32>::empty().to_vec()?.is_empty());
    Ok(())
}

#[test]
fn of_nullable_yields_zero_or_one() -> Result<()> {
    assert_eq!(Stream::of_nullable(Some(1)).to_vec()?, vec![1]);
    assert!(Stream::<i32>::of_nullable(None).to_vec()?.is_empty());
    Ok(())
}

#[test]
fn iterate_is_infinite_until_limited() -> Result<()> {
    let out = Stream::iterate(2, |x: &i32| x * 2).limit(5).to_vec()?;
    assert_eq!(out, vec![2, 4, 8, 16, 32]);
    Ok(())
}

#[test]
fn iterate_while_stops_at_first_failure() -> Result<()> {
    let out = Stream::iterate_while(2, |x: &i32| *x <= 32, |x: &i32| x * 2).to_vec()?;
    assert_eq!(out, vec![2, 4, 8, 16, 32]);

    let none = Stream::iterate_while(100, |x: &i32| *x < 10, |x: &i32| x + 1).count()?;
    assert_eq!(none, 0);
    Ok(())
}

#[test]
fn iterate_only_computes_pulled_elements() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let out = Stream::iterate(1u64, move |x: &u64| {
        c.fetch_add(1, Ordering::SeqCst);
        x + 1
    })
    .limit(3)
    .to_vec()?;
    assert_eq!(out, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn generate_with_limit_terminates() -> Result<()> {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    let s = Stream::generate(move || c.fetch_add(1, Ordering::SeqCst));
    assert!(!s.characteristics().contains(Characteristic::ORDERED));
    assert_eq!(s.limit(5).count()?, 5);
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    Ok(())
}

#[test]
fn concat_appends_in_order() -> Result<()> {
    let golden = IntStream::range_closed(1, 200).boxed().to_vec()?;
    let concatenated = Stream::concat(
        one_to_hundred(),
        IntStream::range_closed(101, 200).boxed(),
    )
    .to_vec()?;
    assert_eq!(concatenated, golden);
    Ok(())
}

#[test]
fn concat_characteristics() {
    let both_sized = Stream::concat(Stream::of(vec![1, 2]), Stream::of(vec![3]));
    let c = both_sized.characteristics();
    assert!(c.contains(Characteristic::ORDERED));
    assert_eq!(c.exact_size(), Some(3));

    let one_unsized = Stream::concat(
        Stream::of(vec![1, 2]).filter(|x: &i32| *x > 1),
        Stream::of(vec![3]),
    );
    assert_eq!(one_unsized.characteristics().exact_size(), None);

    let one_unordered = Stream::concat(Stream::of(vec![1]).unordered(), Stream::of(vec![2]));
    assert!(
        !one_unordered
            .characteristics()
            .contains(Characteristic::ORDERED)
    );
}

#[test]
fn concat_is_lazy_over_infinite_inputs() -> Result<()> {
    let out = Stream::concat(Stream::of(vec![0]), Stream::iterate(1, |x: &i32| x + 1))
        .limit(4)
        .to_vec()?;
    assert_eq!(out, vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn source_characteristics() {
    let values = Stream::of(vec![3, 1, 2]).characteristics();
    assert!(values.contains(Characteristic::ORDERED));
    assert!(values.contains(Characteristic::SIZED));
    assert!(!values.contains(Characteristic::SORTED));
    assert_eq!(values.exact_size(), Some(3));

    let range = IntStream::range(0, 10).characteristics();
    assert!(range.contains(Characteristic::ORDERED));
    assert!(range.contains(Characteristic::SORTED));
    assert!(range.contains(Characteristic::DISTINCT));
    assert_eq!(range.exact_size(), Some(10));

    let iterate = Stream::iterate(0, |x: &i32| x + 1).characteristics();
    assert!(iterate.contains(Characteristic::ORDERED));
    assert!(!iterate.contains(Characteristic::SIZED));
}
