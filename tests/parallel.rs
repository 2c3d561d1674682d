use anyhow::Result;
use ironstream::collectors::*;
use ironstream::testing::*;
use ironstream::*;
use std::sync::Mutex;
use std::thread;

/// Keeps a running maximum but cannot combine partial results.
struct RunningMax;

impl Collector<i32, Option<i32>, Option<i32>> for RunningMax {
    fn create(&self) -> Option<i32> {
        None
    }

    fn add_input(&self, acc: &mut Option<i32>, value: i32) -> Result<()> {
        *acc = Some(acc.map_or(value, |m| m.max(value)));
        Ok(())
    }

    fn finish(&self, acc: Option<i32>) -> Option<i32> {
        acc
    }
}

fn parallel(threads: usize, partitions: usize) -> ExecMode {
    ExecMode::Parallel {
        threads: Some(threads),
        partitions: Some(partitions),
    }
}

#[test]
fn parallel_matches_sequential() -> Result<()> {
    let build = || {
        IntStream::range(0, 10_000)
            .boxed()
            .map(|x: i32| i64::from(x) * 3)
            .filter(|x: &i64| x % 7 != 0)
    };
    let seq = build().to_vec()?;
    let par = build().parallel().to_vec()?;
    assert_eq!(par, seq);

    let seq_sum = build().reduce(|a, b| a + b)?;
    let par_sum = build().with_mode(parallel(3, 5)).reduce(|a, b| a + b)?;
    assert_eq!(par_sum, seq_sum);
    Ok(())
}

#[test]
fn barriers_run_before_partitioning() -> Result<()> {
    let out = Stream::of(vec![5, 3, 9, 3, 1, 9, 7])
        .distinct()
        .sorted()
        .map(|x: i32| x * 10)
        .with_mode(parallel(2, 3))
        .to_vec()?;
    assert_eq!(out, vec![10, 30, 50, 70, 90]);

    let limited = IntStream::iterate(0, |x| x + 1)
        .map(|x| x * 2)
        .limit(100)
        .with_mode(parallel(4, 8))
        .to_vec()?;
    assert_eq!(limited, (0..100).map(|x| x * 2).collect::<Vec<_>>());

    let skipped = IntStream::range(0, 20)
        .skip(15)
        .parallel()
        .to_vec()?;
    assert_eq!(skipped, vec![15, 16, 17, 18, 19]);

    let taken = Stream::of(vec![2, 4, 6, 7, 8])
        .take_while(|x: &i32| x % 2 == 0)
        .parallel()
        .to_vec()?;
    assert_eq!(taken, vec![2, 4, 6]);
    Ok(())
}

#[test]
fn concat_in_parallel_keeps_order() -> Result<()> {
    let out = Stream::concat(
        IntStream::range(0, 50).boxed().parallel(),
        IntStream::range(50, 100).boxed(),
    );
    assert!(out.is_parallel());
    assert_eq!(out.to_vec()?, (0..100).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn for_each_runs_on_worker_threads() -> Result<()> {
    let seen = Mutex::new(Vec::new());
    IntStream::range(0, 1_000)
        .boxed()
        .with_mode(parallel(4, 16))
        .for_each(|x| seen.lock().unwrap().push(x))?;
    let seen = seen.into_inner().unwrap();
    assert_collections_unordered_equal(&seen, &(0..1_000).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn dedicated_pool_size_is_respected() -> Result<()> {
    let caller = thread::current().id();
    let ids = Mutex::new(Vec::new());
    IntStream::range(0, 64)
        .boxed()
        .with_mode(parallel(2, 8))
        .for_each(|_| ids.lock().unwrap().push(thread::current().id()))?;
    let mut ids = ids.into_inner().unwrap();
    ids.sort_by_key(|id| format!("{id:?}"));
    ids.dedup();
    assert!(ids.len() <= 2);
    assert!(!ids.contains(&caller));
    Ok(())
}

#[test]
fn non_merging_collector_fails_across_partitions() -> Result<()> {
    let seq = IntStream::range(0, 100).boxed().collect(RunningMax)?;
    assert_eq!(seq, Some(99));

    let one_partition = IntStream::range(0, 100)
        .boxed()
        .with_mode(parallel(2, 1))
        .collect(RunningMax)?;
    assert_eq!(one_partition, Some(99));

    let result = IntStream::range(0, 100)
        .boxed()
        .with_mode(parallel(2, 4))
        .collect(RunningMax);
    assert_stream_error(result, &StreamError::MergeUnsupported);
    Ok(())
}

#[test]
fn mode_switches_last_call_wins() -> Result<()> {
    let s = Stream::of(vec![1, 2, 3]).parallel().map(|x: i32| x + 1).sequential();
    assert!(!s.is_parallel());
    assert_eq!(s.to_vec()?, vec![2, 3, 4]);

    let p = Stream::of(vec![1, 2, 3]).sequential().parallel();
    assert!(p.is_parallel());
    assert_eq!(p.collect(to_list())?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn empty_parallel_stream() -> Result<()> {
    assert!(Stream::<i32>::empty().parallel().to_vec()?.is_empty());
    assert_eq!(Stream::<i32>::empty().parallel().reduce(|a, b| a + b)?, None);
    assert_eq!(
        Stream::<i32>::empty().parallel().collect(joining_with_affixes(",", "<", ">"))?,
        "<>"
    );
    Ok(())
}

#[test]
fn runner_defaults() {
    let r = Runner::default();
    assert_eq!(r.mode, ExecMode::Sequential);
    assert!(r.default_partitions >= 4);
    let p = Runner::for_mode(parallel(1, 1));
    assert_eq!(p.mode, parallel(1, 1));
    assert_eq!(p.default_partitions, r.default_partitions);
}
