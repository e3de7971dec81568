use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use basketatlas::prelude::{Asset, NormalSource, PayloadFormat, SimulationRequest};
use gridservice::prelude::*;

struct Zero;

impl NormalSource for Zero {
    fn next_normal(&mut self) -> f64 {
        0.0
    }
}

fn zero_grid() -> LocalPlatform {
    let worker = BasketWorker::with_source_factory(Arc::new(|| Box::new(Zero) as Box<dyn NormalSource>));
    LocalPlatform::new(Arc::new(worker), 4).unwrap()
}

fn single_asset(paths: usize) -> SimulationRequest {
    SimulationRequest::new(vec![Asset::new("X", 100.0, 0.2, 1.0)], 0.05, 1.0, paths)
}

fn sample_basket(paths: usize) -> SimulationRequest {
    SimulationRequest::new(
        vec![
            Asset::new("AAPL", 180.0, 0.25, 0.4),
            Asset::new("MSFT", 350.0, 0.20, 0.3),
            Asset::new("GOOGL", 140.0, 0.28, 0.3),
        ],
        0.05,
        1.0,
        paths,
    )
}

#[test]
fn test_deterministic_distributed_valuation() {
    let platform = zero_grid();
    let report = Driver::new(&platform, TaskOptions::default())
        .with_chunk_size(300)
        .run(&single_asset(1_000))
        .unwrap();
    assert_eq!(report.num_chunks(), 4);
    assert_eq!(report.num_simulations(), 1_000);
    assert!((report.value() - 100.0 * (-0.02_f64).exp()).abs() < 1e-9);
}

#[test]
fn test_json_payloads() {
    let platform = zero_grid();
    let report = Driver::new(&platform, TaskOptions::default())
        .with_chunk_size(100)
        .with_format(PayloadFormat::JsonV1)
        .run(&single_asset(250))
        .unwrap();
    assert_eq!(report.num_chunks(), 3);
    assert!((report.value() - 100.0 * (-0.02_f64).exp()).abs() < 1e-9);
}

#[test]
fn test_entropy_workers_price_near_forward() {
    let platform = LocalPlatform::new(Arc::new(BasketWorker::new()), 4).unwrap();
    let request = sample_basket(100_000);
    let expected: f64 = request.basket().iter().map(|a| a.weight() * a.spot()).sum();
    let report = Driver::new(&platform, TaskOptions::default())
        .with_chunk_size(7_000)
        .run(&request)
        .unwrap();
    assert_eq!(report.num_chunks(), 15);
    assert!(
        (report.value() - expected).abs() / expected < 0.02,
        "value = {}",
        report.value()
    );
}

#[test]
fn test_invalid_request_fails_every_chunk() {
    let platform = zero_grid();
    let request = SimulationRequest::new(
        vec![
            Asset::new("X", 100.0, 0.2, 0.5),
            Asset::new("Y", 100.0, 0.2, 0.4),
        ],
        0.05,
        1.0,
        30,
    );
    let options = TaskOptions::default().with_max_retries(0);
    let err = Driver::new(&platform, options)
        .with_chunk_size(10)
        .run(&request)
        .unwrap_err();
    match err {
        ServiceError::ChunksFailed(ChunkFailures(failures)) => {
            assert_eq!(
                failures.iter().map(|f| f.index).collect::<Vec<_>>(),
                vec![0, 1, 2]
            );
            assert!(failures
                .iter()
                .all(|f| f.message.contains("weights do not sum to one")));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

/// Fails the first `failures` calls, then delegates to a zero-draw basket worker.
struct Flaky {
    failures: usize,
    calls: AtomicUsize,
    inner: BasketWorker,
}

impl Flaky {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
            inner: BasketWorker::with_source_factory(Arc::new(|| Box::new(Zero) as Box<dyn NormalSource>)),
        }
    }
}

impl TaskProcessor for Flaky {
    fn process(&self, payload: &[u8], options: &TaskOptions) -> std::result::Result<Vec<u8>, TaskFailure> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(TaskFailure::new("transient failure"));
        }
        self.inner.process(payload, options)
    }
}

#[test]
fn test_retries_absorb_transient_failures() {
    let flaky = Arc::new(Flaky::new(2));
    let platform = LocalPlatform::new(flaky.clone(), 1).unwrap();
    let report = Driver::new(&platform, TaskOptions::default().with_max_retries(2))
        .run(&single_asset(10))
        .unwrap();
    assert_eq!(report.num_chunks(), 1);
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_exhausted_retries_surface_failure() {
    let platform = LocalPlatform::new(Arc::new(Flaky::new(5)), 1).unwrap();
    let err = Driver::new(&platform, TaskOptions::default().with_max_retries(1))
        .run(&single_asset(10))
        .unwrap_err();
    match err {
        ServiceError::ChunksFailed(ChunkFailures(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].message, "transient failure");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

struct Slow;

impl TaskProcessor for Slow {
    fn process(&self, _payload: &[u8], _options: &TaskOptions) -> std::result::Result<Vec<u8>, TaskFailure> {
        thread::sleep(Duration::from_secs(3));
        Ok(b"1".to_vec())
    }
}

#[test]
fn test_wait_is_bounded_by_max_duration() {
    let platform = LocalPlatform::new(Arc::new(Slow), 1).unwrap();
    let err = Driver::new(&platform, TaskOptions::default().with_max_duration_secs(1))
        .run(&single_asset(10))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Platform(PlatformError::Timeout { pending: 1, .. })
    ));
}
