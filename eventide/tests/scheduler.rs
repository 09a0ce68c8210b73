use eventide::{Deferred, RuntimeBuilder, Scheduler, TimerStatus, VirtualTime};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, label: impl Into<String>) -> impl FnOnce() + 'static {
    let log = log.clone();
    let label = label.into();
    move || log.borrow_mut().push(label)
}

#[test]
fn test_macrotasks_run_in_fire_time_order() {
    let scheduler = Scheduler::new();
    let log = Log::default();

    scheduler.schedule_at(Duration::from_millis(100), push(&log, "A"));
    scheduler.schedule_at(Duration::from_millis(0), push(&log, "B"));
    scheduler.schedule_at(Duration::from_millis(50), push(&log, "C"));

    scheduler.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["B", "C", "A"]);
    assert_eq!(
        scheduler.now(),
        VirtualTime::from_millis(100),
        "Clock should stop at the last fire time"
    );
}

#[test]
fn test_equal_fire_times_keep_enqueue_order() {
    let scheduler = Scheduler::new();
    let log = Log::default();

    for label in ["first", "second", "third"] {
        scheduler.schedule_at(Duration::from_millis(10), push(&log, label));
    }

    scheduler.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["first", "second", "third"]);
}

#[test]
fn test_microtasks_drain_before_next_macrotask() {
    let scheduler = Scheduler::new();
    let log = Log::default();

    let s = scheduler.clone();
    let l = log.clone();
    scheduler.schedule_at(Duration::from_millis(5), move || {
        l.borrow_mut().push("macro 1".into());

        // A chain of microtasks, each enqueuing the next.
        let inner = l.clone();
        let again = s.clone();
        s.schedule_microtask(move || {
            inner.borrow_mut().push("micro a".into());
            let deepest = inner.clone();
            again.schedule_microtask(move || deepest.borrow_mut().push("micro b".into()));
        });
    });
    scheduler.schedule_at(Duration::from_millis(5), push(&log, "macro 2"));

    scheduler.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["macro 1", "micro a", "micro b", "macro 2"]);
}

#[test]
fn test_settled_future_continuation_beats_zero_delay_timer() {
    let scheduler = Scheduler::new();
    let log = Log::default();

    scheduler.schedule_at(Duration::ZERO, push(&log, "timer"));

    let l = log.clone();
    Deferred::of(&scheduler, "continuation").map(move |v| l.borrow_mut().push(v.to_string()));

    log.borrow_mut().push("sync".into());
    scheduler.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["sync", "continuation", "timer"]);
}

#[test]
fn test_cancelled_timer_never_runs_nor_moves_clock() {
    let scheduler = Scheduler::new();
    let log = Log::default();

    scheduler.schedule_at(Duration::from_millis(10), push(&log, "kept"));
    let late = scheduler.schedule_at(Duration::from_millis(500), push(&log, "cancelled"));

    assert!(scheduler.cancel(&late));
    scheduler.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["kept"]);
    assert_eq!(late.status(), TimerStatus::Cancelled);
    assert_eq!(scheduler.now(), VirtualTime::from_millis(10));
}

#[test]
fn test_cancel_ignores_handles_from_another_scheduler() {
    let a = Scheduler::new();
    let b = Scheduler::new();
    let log = Log::default();

    let ta = a.schedule_at(Duration::from_millis(10), push(&log, "a-task"));
    let tb = b.schedule_at(Duration::from_millis(10), push(&log, "b-task"));
    assert_eq!(ta.sequence(), tb.sequence());

    assert!(!a.cancel(&tb));
    assert_eq!(tb.status(), TimerStatus::Scheduled);
    assert_eq!(a.pending_macrotasks(), 1);

    a.run_until_idle().unwrap();
    b.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["a-task", "b-task"]);
    assert_eq!(ta.status(), TimerStatus::Fired);
    assert_eq!(tb.status(), TimerStatus::Fired);
}

#[test]
fn test_cancel_from_inside_earlier_task() {
    let scheduler = Scheduler::new();
    let log = Log::default();

    let victim = scheduler.schedule_at(Duration::from_millis(20), push(&log, "victim"));

    let s = scheduler.clone();
    scheduler.schedule_at(Duration::from_millis(10), move || {
        assert!(s.cancel(&victim));
    });

    scheduler.run_until_idle().unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(scheduler.diagnostics().macrotasks_run, 1);
}

#[test]
fn test_delays_are_relative_to_current_time() {
    let scheduler = Scheduler::new();
    let fired_at = Rc::new(RefCell::new(None));

    let s = scheduler.clone();
    let out = fired_at.clone();
    scheduler.schedule_at(Duration::from_millis(40), move || {
        let clock = s.clone();
        s.schedule_at(Duration::from_millis(15), move || {
            *out.borrow_mut() = Some(clock.now());
        });
    });

    scheduler.run_until_idle().unwrap();

    assert_eq!(*fired_at.borrow(), Some(VirtualTime::from_millis(55)));
}

#[test]
fn test_start_time_is_configurable() {
    let scheduler = RuntimeBuilder::new()
        .start_time(VirtualTime::from_millis(1_000))
        .build_scheduler();

    let timer = scheduler.schedule_at(Duration::from_millis(5), || {});

    assert_eq!(timer.fire_time(), VirtualTime::from_millis(1_005));
}

#[test]
fn test_independent_schedulers_do_not_interact() {
    let first = Scheduler::new();
    let second = Scheduler::new();
    let log = Log::default();

    first.schedule_at(Duration::from_millis(10), push(&log, "first"));
    second.schedule_at(Duration::from_millis(10), push(&log, "second"));

    first.run_until_idle().unwrap();

    assert_eq!(*log.borrow(), ["first"]);
    assert_eq!(second.pending_macrotasks(), 1);
    assert_eq!(second.now(), VirtualTime::ZERO);
    assert!(!first.ptr_eq(&second));
}

#[test]
fn test_diagnostics_count_executed_work() {
    let scheduler = Scheduler::new();

    scheduler.schedule_microtask(|| {});
    scheduler.schedule_microtask(|| {});
    scheduler.schedule_at(Duration::from_millis(1), || {});

    assert!(!scheduler.is_idle());
    scheduler.run_until_idle().unwrap();
    assert!(scheduler.is_idle());

    let diagnostics = scheduler.diagnostics();
    assert_eq!(diagnostics.microtasks_run, 2);
    assert_eq!(diagnostics.macrotasks_run, 1);
}
