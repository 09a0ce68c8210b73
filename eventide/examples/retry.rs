//! Example: Using the retry utility

use eventide::tools::retry;
use eventide::{Deferred, Error, Scheduler};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[eventide::main]
async fn main(scheduler: Scheduler) -> Result<(), Error> {
    let attempts = Rc::new(Cell::new(0));
    let s = scheduler.clone();

    let counter = attempts.clone();
    let result = retry(&scheduler, 5, move || {
        let n = counter.get() + 1;
        counter.set(n);
        println!("Attempt {n} at {}", s.now());

        if n < 3 {
            Deferred::rejected(&s, "Failed")
        } else {
            Deferred::of(&s, "Success!")
        }
    })
    .set_interval(Duration::from_millis(100))
    .await;

    println!("Result: {result:?} after {} attempts", attempts.get());
    Ok(())
}
