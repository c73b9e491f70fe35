//! Slot lifecycle: queue-full handling, release on seen, wait timeouts

use std::time::{Duration, Instant};
use uring_core::{ops::Nop, Error, Ring, RingConfig, Result};

#[test]
fn test_fill_to_capacity() -> Result<()> {
    let mut ring = Ring::new(4)?;
    let capacity = ring.capacity();

    for i in 0..capacity {
        ring.push(&Nop, u64::from(i))?;
    }
    assert_eq!(ring.free_slots(), 0);
    assert_eq!(ring.submit()?, capacity as usize);

    for _ in 0..capacity {
        ring.wait_for_completion(None)?.mark_seen();
    }
    assert_eq!(ring.free_slots(), capacity);

    Ok(())
}

#[test]
fn test_queue_full_has_no_side_effect() -> Result<()> {
    let mut ring = Ring::new(2)?;
    ring.push(&Nop, 1)?;
    ring.push(&Nop, 2)?;

    let before = ring.stats();
    assert!(matches!(ring.get_next_submission_slot(), Err(Error::QueueFull)));
    assert_eq!(ring.stats(), before);

    // Only the two real entries go out
    assert_eq!(ring.submit()?, 2);

    Ok(())
}

#[test]
fn test_single_slot_scenario() -> Result<()> {
    let mut ring = Ring::new(1)?;
    assert_eq!(ring.capacity(), 1);

    ring.push(&Nop, 0xA)?;
    ring.submit()?;

    // A is in flight and its completion not yet seen
    let err = ring.push(&Nop, 0xB).unwrap_err();
    assert!(matches!(err, Error::QueueFull));
    assert!(err.is_recoverable());

    let cqe = ring.wait_for_completion(None)?;
    assert_eq!(cqe.user_data(), 0xA);
    cqe.mark_seen();

    ring.push(&Nop, 0xB)?;
    assert_eq!(ring.submit()?, 1);
    let cqe = ring.wait_for_completion(None)?;
    assert_eq!(cqe.user_data(), 0xB);
    cqe.mark_seen();

    Ok(())
}

#[test]
fn test_slot_reused_many_times() -> Result<()> {
    let mut ring = Ring::new(2)?;

    // Far more round trips than slots
    for i in 0..64u64 {
        ring.push(&Nop, i)?;
        ring.submit()?;
        let cqe = ring.wait_for_completion(None)?;
        assert_eq!(cqe.user_data(), i);
        cqe.mark_seen();
    }
    assert_eq!(ring.stats().outstanding, 0);

    Ok(())
}

#[test]
fn test_dropped_completion_is_released() -> Result<()> {
    let mut ring = Ring::new(1)?;
    ring.push(&Nop, 1)?;
    ring.submit()?;

    {
        let _cqe = ring.wait_for_completion(None)?;
    }

    assert_eq!(ring.free_slots(), 1);
    assert_eq!(ring.stats().ready, 0);

    Ok(())
}

#[test]
fn test_abandoned_slot_submits_as_nop() -> Result<()> {
    let mut ring = Ring::new(2)?;

    // Acquired, never prepared
    drop(ring.get_next_submission_slot()?);

    assert_eq!(ring.submit()?, 1);
    let cqe = ring.wait_for_completion(None)?;
    assert_eq!(cqe.user_data(), 0);
    assert_eq!(cqe.result(), 0);
    cqe.mark_seen();

    Ok(())
}

#[test]
fn test_submit_with_nothing_prepared() -> Result<()> {
    let mut ring = Ring::new(2)?;
    assert_eq!(ring.submit()?, 0);
    Ok(())
}

#[test]
fn test_zero_timeout_on_empty_queue() -> Result<()> {
    let mut ring = Ring::new(2)?;

    let start = Instant::now();
    let err = ring.wait_for_completion(Some(Duration::ZERO)).unwrap_err();
    assert!(matches!(err, Error::TimedOut));
    assert!(start.elapsed() < Duration::from_millis(50));

    Ok(())
}

#[test]
fn test_zero_timeout_with_ready_completion() -> Result<()> {
    let mut ring = Ring::new(2)?;
    ring.push(&Nop, 4)?;
    ring.submit_and_wait(1)?;

    let cqe = ring.wait_for_completion(Some(Duration::ZERO))?;
    assert_eq!(cqe.user_data(), 4);
    cqe.mark_seen();

    Ok(())
}

#[test]
fn test_timed_wait_elapses() -> Result<()> {
    let mut ring = Ring::new(2)?;

    let start = Instant::now();
    let err = ring
        .wait_for_completion(Some(Duration::from_millis(50)))
        .unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, Error::TimedOut), "unexpected error: {err}");
    assert!(elapsed >= Duration::from_millis(40));
    assert!(elapsed < Duration::from_secs(2));

    Ok(())
}

#[test]
fn test_timed_wait_returns_completion() -> Result<()> {
    let mut ring = Ring::new(2)?;
    ring.push(&Nop, 8)?;
    ring.submit()?;

    let cqe = ring.wait_for_completion(Some(Duration::from_secs(5)))?;
    assert_eq!(cqe.user_data(), 8);
    cqe.mark_seen();

    Ok(())
}

#[test]
fn test_next_completion_uses_config_timeout() -> Result<()> {
    let config = RingConfig::new(2).with_wait_timeout(Duration::from_millis(20));
    let mut ring = Ring::with_config(config)?;

    assert!(matches!(ring.next_completion(), Err(Error::TimedOut)));

    ring.push(&Nop, 1)?;
    ring.submit()?;
    ring.next_completion()?.mark_seen();

    Ok(())
}
