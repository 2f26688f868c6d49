use super::*;
use chrono::TimeZone;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
}

#[test]
fn half_open_bounds() {
    let window = ExportWindow::new(at(1), at(8));
    assert!(window.contains(at(1)));
    assert!(window.contains(at(7)));
    assert!(!window.contains(at(8)));
    assert_eq!(window.duration(), Duration::days(7));
    assert!(!window.is_empty());
}

#[test]
fn inverted_bounds_collapse_to_empty() {
    let window = ExportWindow::new(at(8), at(1));
    assert!(window.is_empty());
    assert_eq!(window.duration(), Duration::zero());
}

#[test]
fn days_back_ends_at_the_given_instant() {
    let end = at(15);
    let window = ExportWindow::days_back(14, end);
    assert_eq!(window.end, end);
    assert_eq!(window.start, at(1));
}

#[test]
fn clamp_start_moves_only_forward() {
    let window = ExportWindow::new(at(1), at(8));

    // Watermark before the window: unchanged.
    let clamped = window.clamp_start(at(1) - Duration::days(3)).unwrap();
    assert_eq!(clamped, window);

    // Watermark inside: start moves to it.
    let clamped = window.clamp_start(at(4)).unwrap();
    assert_eq!(clamped.start, at(4));
    assert_eq!(clamped.end, at(8));

    // Watermark at or past the end: nothing remains.
    assert!(window.clamp_start(at(8)).is_none());
    assert!(window.clamp_start(at(20)).is_none());
}

#[test]
fn epoch_bounds_carry_subsecond_precision() {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        + Duration::milliseconds(250);
    let window = ExportWindow::new(start, at(2));
    let (s, e) = window.epoch_bounds();
    assert!((s - (start.timestamp() as f64 + 0.25)).abs() < 1e-6);
    assert_eq!(e, at(2).timestamp() as f64);
}
