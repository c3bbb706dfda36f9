//! Tests for analysis window resolution

use super::*;
use crate::Error;
use crate::app::models::Epoch;
use crate::app::services::datum_engine::resolve_window;

#[test]
fn test_default_window_is_nineteen_years_ending_now() {
    let now = utc(2024, 6, 1);
    let window = resolve_window(None, 19, now).unwrap();
    assert_eq!(window.start, utc(2005, 6, 1));
    assert_eq!(window.end, now);
}

#[test]
fn test_default_window_from_leap_day() {
    let now = utc(2024, 2, 29);
    let window = resolve_window(None, 19, now).unwrap();
    assert_eq!(window.start, utc(2005, 2, 28));
}

#[test]
fn test_short_epoch_used_as_is() {
    let epoch = Epoch::new(utc(2015, 1, 1), utc(2020, 1, 1)).unwrap();
    let window = resolve_window(Some(&epoch), 19, utc(2030, 1, 1)).unwrap();
    assert_eq!(window, epoch);
}

#[test]
fn test_long_epoch_clamped_to_most_recent_years() {
    let epoch = Epoch::new(utc(1980, 1, 1), utc(2020, 1, 1)).unwrap();
    let window = resolve_window(Some(&epoch), 19, utc(2030, 1, 1)).unwrap();
    assert_eq!(window.start, utc(2001, 1, 1));
    assert_eq!(window.end, utc(2020, 1, 1));
}

#[test]
fn test_reversed_epoch_rejected() {
    let epoch = Epoch {
        start: utc(2020, 1, 1),
        end: utc(2010, 1, 1),
    };
    let result = resolve_window(Some(&epoch), 19, utc(2030, 1, 1));
    assert!(matches!(result, Err(Error::InvalidEpoch { .. })));
}
