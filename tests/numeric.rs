use anyhow::Result;
use ironstream::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn double_sum_and_average() -> Result<()> {
    let sum = DoubleStream::of(vec![1.5, 2.0, 3.5]).sum()?;
    assert!(approx(sum, 7.0));

    let avg = IntStream::of(vec![1, 2, 3, 4, 5]).average()?;
    assert_eq!(avg, Some(3.0));
    assert_eq!(IntStream::empty().average()?, None);
    assert_eq!(IntStream::empty().sum()?, 0);
    Ok(())
}

#[test]
fn compensated_sum_is_accurate() -> Result<()> {
    let sum = DoubleStream::generate(|| 0.1).limit(10_000).sum()?;
    assert!((sum - 1_000.0).abs() < 1e-9);

    let mut manual = CompensatedSum::default();
    for _ in 0..10 {
        manual.add(0.1);
    }
    assert!(approx(manual.value(), 1.0));
    Ok(())
}

#[test]
fn integer_sums_widen() -> Result<()> {
    let sum = IntStream::of(vec![i32::MAX, i32::MAX]).sum()?;
    assert_eq!(sum, 2 * i64::from(i32::MAX));
    Ok(())
}

#[test]
fn ranges() -> Result<()> {
    let half_open = IntStream::range(0, 100).to_vec()?;
    assert_eq!(half_open, (0..100).collect::<Vec<_>>());

    let closed = LongStream::range_closed(1, 5).to_vec()?;
    assert_eq!(closed, vec![1, 2, 3, 4, 5]);

    assert!(IntStream::range(5, 5).to_vec()?.is_empty());
    assert!(IntStream::range(5, 1).to_vec()?.is_empty());
    assert_eq!(IntStream::range_closed(5, 5).to_vec()?, vec![5]);
    assert_eq!(IntStream::range(5, 1).count()?, 0);

    let top = IntStream::range_closed(i32::MAX - 2, i32::MAX).to_vec()?;
    assert_eq!(top, vec![i32::MAX - 2, i32::MAX - 1, i32::MAX]);
    Ok(())
}

#[test]
fn boxed_round_trip() -> Result<()> {
    let list = IntStream::range_closed(1, 100).boxed().to_vec()?;
    assert_eq!(list.len(), 100);
    assert_eq!(list[0], 1);
    assert_eq!(list[99], 100);
    Ok(())
}

#[test]
fn map_to_obj_and_back() -> Result<()> {
    let chars = IntStream::range_closed(1, 3)
        .map_to_obj(|i| char::from_digit(i as u32, 10).unwrap_or('?'))
        .to_vec()?;
    assert_eq!(chars, vec!['1', '2', '3']);

    let lengths = Stream::of(vec!["a", "bb", "ccc"])
        .map_to_int(|s| s.len() as i32)
        .sum()?;
    assert_eq!(lengths, 6);

    let doubled = Stream::of(vec![1.5, 2.5]).map_to_double(|x: f64| x * 2.0).sum()?;
    assert!(approx(doubled, 8.0));

    let longs = Stream::of(vec!["10", "20"])
        .map_to_long(|s| s.parse().unwrap_or(0))
        .to_vec()?;
    assert_eq!(longs, vec![10i64, 20]);
    Ok(())
}

#[test]
fn widening_conversions() -> Result<()> {
    let long_sum = IntStream::range_closed(1, 3).as_long_stream().sum()?;
    assert_eq!(long_sum, 6);

    let doubles = IntStream::range(1, 4).as_double_stream().to_vec()?;
    assert_eq!(doubles, vec![1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn summary_statistics_of_doubles() -> Result<()> {
    let stats = DoubleStream::of(vec![49.8, 50.1, 51.6]).summary_statistics()?;
    assert_eq!(stats.count(), 3);
    assert!(approx(stats.sum(), 151.5));
    assert_eq!(stats.min(), Some(49.8));
    assert_eq!(stats.max(), Some(51.6));
    assert!(stats.average().is_some_and(|a| approx(a, 50.5)));
    Ok(())
}

#[test]
fn summary_statistics_empty_and_combined() -> Result<()> {
    let empty = IntStream::empty().summary_statistics()?;
    assert_eq!(empty.count(), 0);
    assert_eq!(empty.sum(), 0);
    assert_eq!(empty.min(), None);
    assert_eq!(empty.average(), None);

    let mut left = IntStream::range(0, 50).summary_statistics()?;
    let right = IntStream::range(50, 100).summary_statistics()?;
    left.combine(&right);
    assert_eq!(left.count(), 100);
    assert_eq!(left.sum(), 4_950);
    assert_eq!(left.min(), Some(0));
    assert_eq!(left.max(), Some(99));

    let parallel = IntStream::range(0, 100).parallel().summary_statistics()?;
    assert_eq!(parallel.sum(), left.sum());
    assert_eq!(parallel.min(), left.min());
    assert_eq!(parallel.max(), left.max());
    Ok(())
}

#[test]
fn nan_poisons_min_and_max() -> Result<()> {
    let data = vec![1.0, f64::NAN, 3.0];
    assert!(DoubleStream::of(data.clone()).min()?.is_some_and(f64::is_nan));
    assert!(DoubleStream::of(data.clone()).max()?.is_some_and(f64::is_nan));

    let stats = DoubleStream::of(data.clone()).summary_statistics()?;
    assert!(stats.min().is_some_and(f64::is_nan));
    assert!(stats.max().is_some_and(f64::is_nan));

    let mut left = DoubleStream::of(vec![-5.0, 2.0]).summary_statistics()?;
    left.combine(&DoubleStream::of(vec![f64::NAN]).summary_statistics()?);
    assert!(left.min().is_some_and(f64::is_nan));
    assert!(left.max().is_some_and(f64::is_nan));

    let parallel = DoubleStream::of(data)
        .with_mode(ExecMode::Parallel {
            threads: Some(2),
            partitions: Some(3),
        })
        .summary_statistics()?;
    assert!(parallel.min().is_some_and(f64::is_nan));
    assert_eq!(DoubleStream::of(vec![2.0, -0.5, 7.0]).min()?, Some(-0.5));
    Ok(())
}

#[test]
fn summary_statistics_serialize() -> Result<()> {
    let stats = LongStream::of(vec![4, 8, 15, 16, 23, 42]).summary_statistics()?;
    let json = serde_json::to_string(&stats)?;
    let back: SummaryStatistics<i64> = serde_json::from_str(&json)?;
    assert_eq!(back.count(), stats.count());
    assert_eq!(back.sum(), 108);
    assert_eq!(back.min(), Some(4));
    assert_eq!(back.max(), Some(42));
    Ok(())
}

#[test]
fn numeric_stages() -> Result<()> {
    let out = IntStream::of(vec![5, 3, 5, 1, 3])
        .distinct()
        .sorted()
        .map(|x| x * 10)
        .to_vec()?;
    assert_eq!(out, vec![10, 30, 50]);

    let doubles = DoubleStream::of(vec![2.5, f64::NAN, -1.0, f64::NAN])
        .distinct()
        .sorted()
        .to_vec()?;
    assert_eq!(doubles.len(), 3);
    assert_eq!(doubles[0], -1.0);
    assert_eq!(doubles[1], 2.5);
    assert!(doubles[2].is_nan());

    let evens = IntStream::iterate(0, |x| x + 1)
        .filter(|x| x % 2 == 0)
        .skip(1)
        .limit(3)
        .to_vec()?;
    assert_eq!(evens, vec![2, 4, 6]);

    let pairs = IntStream::range(1, 3).flat_map(|x| vec![x, -x]).to_vec()?;
    assert_eq!(pairs, vec![1, -1, 2, -2]);
    Ok(())
}

#[test]
fn numeric_terminals() -> Result<()> {
    assert_eq!(IntStream::range(0, 10).min()?, Some(0));
    assert_eq!(IntStream::range(0, 10).max()?, Some(9));
    assert_eq!(DoubleStream::of(vec![1.0, 3.0, 2.0]).max()?, Some(3.0));
    assert_eq!(IntStream::range(1, 5).reduce(|a, b| a * b)?, Some(24));
    assert_eq!(IntStream::empty().reduce_from(7, |a, b| a + b)?, 7);
    assert!(IntStream::range(0, 10).any_match(|x| x == 9)?);
    assert!(IntStream::range(0, 10).all_match(|x| x < 10)?);
    assert!(IntStream::empty().none_match(|_| true)?);
    assert_eq!(IntStream::range(3, 10).find_first()?, Some(3));
    assert_eq!(IntStream::range(0, 1_000).count()?, 1_000);

    let mut seen = Vec::new();
    IntStream::range(0, 3).for_each_ordered(|x| seen.push(x))?;
    assert_eq!(seen, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn concat_numeric() -> Result<()> {
    let both = IntStream::concat(IntStream::range(0, 2), IntStream::of(vec![9])).to_vec()?;
    assert_eq!(both, vec![0, 1, 9]);
    Ok(())
}
