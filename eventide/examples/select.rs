//! Example: Racing deferred values with a timeout

use eventide::time::{delay, timeout};
use eventide::{Error, Scheduler, select};
use std::time::Duration;

#[eventide::main]
async fn main(scheduler: Scheduler) -> Result<(), Error> {
    let fast = delay(&scheduler, Duration::from_millis(500), "fast");
    let slow = delay(&scheduler, Duration::from_millis(1000), "slow");

    let winner = select! {
        fast => |v| format!("{v} finished first"),
        slow => |v| format!("{v} finished first"),
    };
    println!("{}", winner.await?);

    let late = delay(&scheduler, Duration::from_secs(5), ());
    match timeout(&scheduler, Duration::from_secs(1), late).await {
        Ok(()) => println!("finished in time"),
        Err(error) => println!("gave up: {error}"),
    }

    Ok(())
}
