use std::time::{Duration, Instant};

use resolverd::core::resolver::RateMeter;

#[test]
fn test_decreasing_counter_never_negative() {
    let t0 = Instant::now();
    let mut meter = RateMeter::new();

    let samples = [100u64, 400, 50, 60, 60, 10_000, 0];
    for (i, value) in samples.iter().enumerate() {
        let previous = meter.value();
        meter.update_at(*value, t0 + Duration::from_secs(i as u64));

        assert!(meter.speed() >= 0.0);
        if matches!(previous, Some(p) if *value < p) {
            assert_eq!(meter.speed(), 0.0);
        }
    }
}

#[test]
fn test_rate_is_exact() {
    let t0 = Instant::now();
    let mut meter = RateMeter::new();

    meter.update_at(1_000, t0);
    meter.update_at(4_000, t0 + Duration::from_millis(1500));
    assert_eq!(meter.speed(), 2_000.0);
}

#[test]
fn test_same_instant_is_zero() {
    let t0 = Instant::now();
    let mut meter = RateMeter::new();

    meter.update_at(1_000, t0);
    meter.update_at(9_000, t0);
    assert_eq!(meter.speed(), 0.0);
}

#[test]
fn test_reset_discards_history() {
    let t0 = Instant::now();
    let mut meter = RateMeter::new();

    meter.update_at(0, t0);
    meter.update_at(1_000_000, t0 + Duration::from_secs(1));
    assert!(meter.speed() > 0.0);

    meter.reset();
    meter.update_at(5_000_000, t0 + Duration::from_secs(2));
    assert_eq!(meter.speed(), 0.0);
}
