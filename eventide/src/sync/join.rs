use super::gate::Gate;
use crate::future::Deferred;
use crate::scheduler::Scheduler;

use std::cell::RefCell;
use std::rc::Rc;

/// Waits for every future and collects their values in input order.
///
/// The result rejects with the first rejection observed; the remaining
/// inputs keep running but are no longer waited for. An empty input
/// fulfills with an empty vector.
///
/// # Examples
///
/// ```rust
/// use eventide::sync::join_all;
/// use eventide::time::delay;
/// use eventide::{Scheduler, State};
/// use std::time::Duration;
///
/// let scheduler = Scheduler::new();
/// let slow = delay(&scheduler, Duration::from_millis(30), "slow");
/// let fast = delay(&scheduler, Duration::from_millis(10), "fast");
///
/// let all = join_all(&scheduler, [slow, fast]);
/// scheduler.run_until_idle().unwrap();
///
/// assert_eq!(all.state(), State::Fulfilled(vec!["slow", "fast"]));
/// ```
pub fn join_all<T, I>(scheduler: &Scheduler, futures: I) -> Deferred<Vec<T>>
where
    T: Clone + 'static,
    I: IntoIterator<Item = Deferred<T>>,
{
    let futures: Vec<Deferred<T>> = futures.into_iter().collect();
    let (gate, output) = Gate::deferred(scheduler, futures.len());

    for (index, future) in futures.iter().enumerate() {
        let gate = gate.clone();
        let output = output.clone();

        future.subscribe_with(move |outcome| match outcome {
            Ok(value) => {
                // `index` is below the gate capacity by construction.
                let _ = gate.fill(index, value);
            }
            Err(error) => {
                if output.is_pending() {
                    output.reject(error);
                }
            }
        });
    }

    output
}

/// Waits for two futures of different types.
///
/// Rejects with whichever rejection is observed first.
pub fn zip<A, B>(a: &Deferred<A>, b: &Deferred<B>) -> Deferred<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    let output = Deferred::new(a.scheduler());
    let pair: Rc<RefCell<(Option<A>, Option<B>)>> = Rc::new(RefCell::new((None, None)));

    let (slots, out) = (pair.clone(), output.clone());
    a.subscribe_with(move |outcome| match outcome {
        Ok(value) => {
            slots.borrow_mut().0 = Some(value);
            complete(&slots, &out);
        }
        Err(error) => {
            if out.is_pending() {
                out.reject(error);
            }
        }
    });

    let (slots, out) = (pair, output.clone());
    b.subscribe_with(move |outcome| match outcome {
        Ok(value) => {
            slots.borrow_mut().1 = Some(value);
            complete(&slots, &out);
        }
        Err(error) => {
            if out.is_pending() {
                out.reject(error);
            }
        }
    });

    output
}

fn complete<A, B>(slots: &RefCell<(Option<A>, Option<B>)>, output: &Deferred<(A, B)>)
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    let pair = {
        let mut slots = slots.borrow_mut();

        match (slots.0.take(), slots.1.take()) {
            (Some(a), Some(b)) => Some((a, b)),
            (a, b) => {
                *slots = (a, b);
                None
            }
        }
    };

    if let Some(pair) = pair {
        if output.is_pending() {
            output.fulfill(pair);
        }
    }
}
