use eventide::time::delay;
use eventide::{Deferred, Error, Scheduler, select};
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[eventide::test]
async fn test_select_single_deferred(scheduler: Scheduler) -> Result<(), Error> {
    let winner = select! {
        Deferred::of(&scheduler, 42) => |v| v * 2,
    };

    assert_eq!(winner.await?, 84);
    Ok(())
}

#[eventide::test]
async fn test_select_earliest_wins(scheduler: Scheduler) -> Result<(), Error> {
    let winner = select! {
        delay(&scheduler, ms(200), "slow") => |v| v,
        delay(&scheduler, ms(100), "fast") => |v| v,
    };

    assert_eq!(winner.await?, "fast");
    Ok(())
}

#[eventide::test]
async fn test_select_different_input_types(scheduler: Scheduler) -> Result<(), Error> {
    let winner = select! {
        delay(&scheduler, ms(20), 42i32) => |v| format!("number: {}", v),
        delay(&scheduler, ms(10), "hello") => |v| format!("string: {}", v),
    };

    assert_eq!(winner.await?, "string: hello");
    Ok(())
}

#[eventide::test]
async fn test_select_tie_goes_to_first_scheduled(scheduler: Scheduler) -> Result<(), Error> {
    let winner = select! {
        delay(&scheduler, ms(10), 1) => |v| v,
        delay(&scheduler, ms(10), 2) => |v| v,
        delay(&scheduler, ms(10), 3) => |v| v,
    };

    assert_eq!(winner.await?, 1);
    Ok(())
}

#[eventide::test]
async fn test_select_with_captured_values(scheduler: Scheduler) -> Result<(), Error> {
    let multiplier = 10;

    let winner = select! {
        delay(&scheduler, ms(5), 5) => move |v| v * multiplier,
        delay(&scheduler, ms(3), 3) => move |v| v * multiplier,
    };

    assert_eq!(winner.await?, 30);
    Ok(())
}

#[eventide::test]
async fn test_select_pattern_binding(scheduler: Scheduler) -> Result<(), Error> {
    let winner = select! {
        delay(&scheduler, ms(1), (1, 2)) => |(a, b)| a + b,
        delay(&scheduler, ms(2), (3, 4)) => |(a, b)| a * b,
    };

    assert_eq!(winner.await?, 3);
    Ok(())
}

#[eventide::test]
async fn test_select_rejection_wins_race(scheduler: Scheduler) -> Result<(), Error> {
    let winner = select! {
        Deferred::<i32>::rejected(&scheduler, "refused") => |v| v,
        delay(&scheduler, ms(5), 1) => |v| v,
    };

    assert_eq!(winner.await, Err(Error::msg("refused")));
    Ok(())
}
