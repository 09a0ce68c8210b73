use eventide::time::{delay, timeout};
use eventide::tools::retry;
use eventide::{Deferred, Error, RuntimeBuilder, VirtualTime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_retry_succeeds_before_limit() {
    let rt = RuntimeBuilder::new().build();
    let s = rt.scheduler();
    let attempts = Rc::new(Cell::new(0));

    let result = rt.block_on({
        let attempts = attempts.clone();
        let factory_scheduler = s.clone();
        async move {
            retry(&s, 5, move || {
                let n = attempts.get();
                attempts.set(n + 1);

                if n < 2 {
                    Deferred::rejected(&factory_scheduler, "fail")
                } else {
                    Deferred::of(&factory_scheduler, 42)
                }
            })
            .await
        }
    });

    assert!(
        matches!(result, Ok(42)),
        "Retry should succeed before limit"
    );
    assert_eq!(attempts.get(), 3, "Should have retried 3 times");
}

#[test]
fn test_retry_fails_after_limit() {
    let rt = RuntimeBuilder::new().build();
    let s = rt.scheduler();
    let attempts = Rc::new(Cell::new(0));

    let result = rt.block_on({
        let attempts = attempts.clone();
        let factory_scheduler = s.clone();
        async move {
            retry(&s, 3, move || {
                attempts.set(attempts.get() + 1);
                Deferred::<usize>::rejected(&factory_scheduler, format!("fail {}", attempts.get()))
            })
            .await
        }
    });

    assert_eq!(result, Err(Error::msg("fail 4")), "Should report the last error");
    assert_eq!(attempts.get(), 4, "Should have retried 4 times");
}

#[test]
fn test_retry_with_interval() {
    let rt = RuntimeBuilder::new().build();
    let s = rt.scheduler();
    let started_at = Rc::new(RefCell::new(Vec::new()));
    let interval = Duration::from_millis(20);

    let result = rt.block_on({
        let started_at = started_at.clone();
        let factory_scheduler = s.clone();
        async move {
            retry(&s, 3, move || {
                let mut started = started_at.borrow_mut();
                started.push(factory_scheduler.now());

                if started.len() < 3 {
                    Deferred::rejected(&factory_scheduler, "fail")
                } else {
                    Deferred::of(&factory_scheduler, 77)
                }
            })
            .set_interval(interval)
            .await
        }
    });

    assert!(
        matches!(result, Ok(77)),
        "Retry with interval should succeed"
    );
    assert_eq!(
        *started_at.borrow(),
        [
            VirtualTime::from_millis(0),
            VirtualTime::from_millis(20),
            VirtualTime::from_millis(40),
        ],
        "Attempts should be spaced by the interval"
    );
}

#[test]
fn test_timeout_with_retry() {
    let rt = RuntimeBuilder::new().build();
    let s = rt.scheduler();
    let attempts = Rc::new(Cell::new(0));

    let result = rt.block_on({
        let attempts = attempts.clone();
        let factory_scheduler = s.clone();
        async move {
            retry(&s, 5, move || {
                let n = attempts.get();
                attempts.set(n + 1);

                let latency = if n < 3 { 20 } else { 0 };
                let work = delay(&factory_scheduler, Duration::from_millis(latency), 123);

                timeout(&factory_scheduler, Duration::from_millis(10), work)
            })
            .await
        }
    });

    assert!(
        matches!(result, Ok(123)),
        "Timeout+Retry should eventually succeed"
    );
    assert_eq!(attempts.get(), 4, "Should have attempted 4 times");
}

#[test]
fn test_retry_start_returns_deferred() {
    let rt = RuntimeBuilder::new().build();
    let s = rt.scheduler();

    let factory_scheduler = s.clone();
    let outcome = retry(&s, 0, move || Deferred::of(&factory_scheduler, "once")).start();

    assert!(outcome.is_pending(), "Attempts start on the next microtask drain");
    rt.run_until_idle().unwrap();

    assert_eq!(outcome.state(), eventide::State::Fulfilled("once"));
}
