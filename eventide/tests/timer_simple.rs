use eventide::time::sleep;
use eventide::{Error, Scheduler, VirtualTime};
use std::time::Duration;

#[eventide::test]
async fn test_sleep_basic(scheduler: Scheduler) -> Result<(), Error> {
    let start = scheduler.now();
    sleep(&scheduler, Duration::from_millis(50)).await?;
    let elapsed = scheduler.now().saturating_duration_since(start);

    assert_eq!(
        elapsed,
        Duration::from_millis(50),
        "Sleep should advance virtual time by exactly the duration"
    );
    Ok(())
}

#[eventide::test]
async fn test_sleep_zero_duration(scheduler: Scheduler) -> Result<(), Error> {
    sleep(&scheduler, Duration::ZERO).await?;

    assert_eq!(
        scheduler.now(),
        VirtualTime::ZERO,
        "Zero duration sleep should not move the clock"
    );
    Ok(())
}

#[eventide::test]
async fn test_sleep_in_function(scheduler: Scheduler) -> Result<(), Error> {
    sleep_and_record(&scheduler).await?;
    sleep_and_record(&scheduler).await?;

    assert_eq!(scheduler.now(), VirtualTime::from_millis(60));
    Ok(())
}

async fn sleep_and_record(scheduler: &Scheduler) -> Result<(), Error> {
    let before = scheduler.now();
    sleep(scheduler, Duration::from_millis(30)).await?;
    let after = scheduler.now();

    assert_eq!(after.saturating_duration_since(before), Duration::from_millis(30));
    Ok(())
}

#[eventide::test]
async fn test_long_sleep_costs_nothing() {
    let scheduler = Scheduler::new();
    let day = sleep(&scheduler, Duration::from_secs(24 * 60 * 60));

    scheduler.run_until_idle().unwrap();

    assert!(!day.is_pending());
    assert_eq!(scheduler.now().as_millis(), 24 * 60 * 60 * 1000);
}
