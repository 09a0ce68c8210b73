//! Example: Coroutines reassembling out-of-order replies

use eventide::sync::{Sequencer, join_all};
use eventide::time::delay;
use eventide::{Deferred, Error, Scheduler, coroutine};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

async fn fetch(scheduler: Scheduler, id: usize, latency: u64) -> Result<String, Error> {
    let reply = delay(&scheduler, Duration::from_millis(latency), format!("chunk-{id}")).await?;
    println!("{reply} arrived at {}", scheduler.now());
    Ok(reply)
}

#[eventide::main(microtask_budget = 10_000)]
async fn main(scheduler: Scheduler) -> Result<(), Error> {
    let latencies = [30, 10, 20];
    let sequencer = Rc::new(RefCell::new(Sequencer::new(latencies.len())));

    let workers: Vec<Deferred<()>> = latencies
        .iter()
        .enumerate()
        .map(|(id, latency)| {
            let s = scheduler.clone();
            let sequencer = sequencer.clone();
            let latency = *latency;

            coroutine::run(&scheduler, async move {
                let chunk = fetch(s, id, latency).await?;
                sequencer.borrow_mut().place(id, chunk)?;
                Ok(())
            })
        })
        .collect();

    join_all(&scheduler, workers).await?;

    let ordered = sequencer.borrow().values().unwrap_or_default();
    println!("in order: {}", ordered.join(", "));

    Ok(())
}
