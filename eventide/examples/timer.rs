//! Example: Sleeping on virtual time

use eventide::time::sleep;
use eventide::{Error, Scheduler};
use std::time::Duration;

#[eventide::main]
async fn main(scheduler: Scheduler) -> Result<(), Error> {
    // No wall-clock time passes; the clock jumps straight to the timer.
    println!("Waiting for 1 second at {}...", scheduler.now());
    sleep(&scheduler, Duration::from_secs(1)).await?;
    println!("Done at {}!", scheduler.now());

    Ok(())
}
