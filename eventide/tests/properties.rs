use eventide::sync::{Sequencer, join_all, race};
use eventide::time::delay;
use eventide::{Deferred, Error, Scheduler, State, VirtualTime};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// One attempt at settling a deferred.
#[derive(Debug, Clone)]
enum Settle {
    Fulfill(u32),
    Reject(String),
}

fn arb_settle() -> impl Strategy<Value = Settle> {
    prop_oneof![
        any::<u32>().prop_map(Settle::Fulfill),
        "[a-z]{1,8}".prop_map(Settle::Reject),
    ]
}

fn arb_delays() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..50, 1..20)
}

proptest! {
    #[test]
    fn macrotasks_run_sorted_by_time_then_enqueue_order(delays in arb_delays()) {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (index, delay) in delays.iter().enumerate() {
            let order = order.clone();
            scheduler.schedule_at(Duration::from_millis(*delay), move || order.borrow_mut().push(index));
        }

        scheduler.run_until_idle().unwrap();

        let mut expected: Vec<usize> = (0..delays.len()).collect();
        expected.sort_by_key(|&i| delays[i]);

        prop_assert_eq!(&*order.borrow(), &expected);
        prop_assert_eq!(
            scheduler.now(),
            VirtualTime::from_millis(*delays.iter().max().unwrap())
        );
    }

    #[test]
    fn first_settlement_wins(attempts in prop::collection::vec(arb_settle(), 1..10)) {
        let scheduler = Scheduler::new();
        let deferred: Deferred<u32> = Deferred::new(&scheduler);
        deferred.mark_handled();

        for attempt in &attempts {
            match attempt {
                Settle::Fulfill(v) => deferred.fulfill(*v),
                Settle::Reject(reason) => deferred.reject(reason.as_str()),
            };
        }

        let expected = match &attempts[0] {
            Settle::Fulfill(v) => State::Fulfilled(*v),
            Settle::Reject(reason) => State::Rejected(Error::msg(reason.clone())),
        };

        prop_assert_eq!(deferred.state(), expected);
        prop_assert_eq!(
            scheduler.diagnostics().settlement_conflicts,
            attempts.len() as u64 - 1
        );
    }

    #[test]
    fn join_all_keeps_input_order(delays in arb_delays()) {
        let scheduler = Scheduler::new();
        let inputs: Vec<_> = delays
            .iter()
            .enumerate()
            .map(|(i, d)| delay(&scheduler, Duration::from_millis(*d), i))
            .collect();

        let all = join_all(&scheduler, inputs);
        scheduler.run_until_idle().unwrap();

        prop_assert_eq!(all.state(), State::Fulfilled((0..delays.len()).collect()));
    }

    #[test]
    fn race_picks_the_earliest_input(delays in arb_delays()) {
        let scheduler = Scheduler::new();
        let inputs: Vec<_> = delays
            .iter()
            .enumerate()
            .map(|(i, d)| delay(&scheduler, Duration::from_millis(*d), i))
            .collect();

        let winner = race(&scheduler, inputs);
        scheduler.run_until_idle().unwrap();

        let min = delays.iter().min().copied().unwrap();
        let expected = delays.iter().position(|&d| d == min).unwrap();

        prop_assert_eq!(winner.state(), State::Fulfilled(expected));
    }

    #[test]
    fn sequencer_reassembles_any_arrival_order(
        ids in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let mut sequencer = Sequencer::new(ids.len());

        for id in &ids {
            prop_assert_eq!(sequencer.place(*id, id * 10), Ok(None));
        }

        let expected: Vec<usize> = (0..ids.len()).map(|id| id * 10).collect();
        prop_assert_eq!(sequencer.values(), Some(expected));
    }

    #[test]
    fn microtasks_always_precede_same_instant_macrotasks(chain in 1usize..30) {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        scheduler.schedule_at(Duration::ZERO, move || l.borrow_mut().push("macro"));

        fn link(s: Scheduler, log: Rc<RefCell<Vec<&'static str>>>, left: usize) {
            log.borrow_mut().push("micro");
            if left > 1 {
                let next = s.clone();
                s.schedule_microtask(move || link(next, log, left - 1));
            }
        }

        let s = scheduler.clone();
        let l = log.clone();
        scheduler.schedule_microtask(move || link(s, l, chain));

        scheduler.run_until_idle().unwrap();

        let log = log.borrow();
        prop_assert_eq!(log.len(), chain + 1);
        prop_assert_eq!(log.last().copied(), Some("macro"));
    }
}
