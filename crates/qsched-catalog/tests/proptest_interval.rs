//! Property-based tests for the interval model.

use proptest::prelude::*;
use qsched_catalog::{ClockTime, Day, DaySet, Section, TimeWindow};

/// A random timed section between 08:00 and 22:00 on a random non-empty day set.
fn arb_section() -> impl Strategy<Value = Section> {
    (1_u8..32, 8 * 60_u16..22 * 60, 10_u16..=180).prop_map(|(mask, begin, len)| {
        let days: Vec<Day> = Day::ALL
            .into_iter()
            .filter(|d| mask & (1 << d.index()) != 0)
            .collect();
        let end = (begin + len).min(23 * 60 + 59);
        let fmt = |m: u16| format!("{:02}:{:02}", m / 60, m % 60);
        Section::meeting("S", &days, &fmt(begin), &fmt(end)).expect("generated window is valid")
    })
}

/// Minute-by-minute reference: both meet on some shared day and minute.
fn overlaps_by_sweep(a: &Section, b: &Section) -> bool {
    let (Some(wa), Some(wb)) = (a.window, b.window) else {
        return false;
    };
    let shared: DaySet = a.days.intersection(b.days);
    !shared.is_empty()
        && (wa.begin.minutes()..wa.end.minutes())
            .any(|m| (wb.begin.minutes()..wb.end.minutes()).contains(&m))
}

proptest! {
    /// `overlaps(a, b) == overlaps(b, a)`.
    #[test]
    fn test_overlap_is_symmetric(a in arb_section(), b in arb_section()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    /// The closed-form test agrees with a per-minute sweep.
    #[test]
    fn test_overlap_matches_sweep(a in arb_section(), b in arb_section()) {
        prop_assert_eq!(a.overlaps(&b), overlaps_by_sweep(&a, &b));
    }

    /// TBA sections never conflict with anything.
    #[test]
    fn test_unscheduled_never_overlaps(a in arb_section()) {
        let tba = Section::unscheduled("TBA-A");
        prop_assert!(!a.overlaps(&tba));
        prop_assert!(!tba.overlaps(&a));
    }

    /// Window overlap on the raw clock matches the section-level test when days coincide.
    #[test]
    fn test_window_overlap_same_day(b1 in 0_u16..1400, l1 in 1_u16..40, b2 in 0_u16..1400, l2 in 1_u16..40) {
        let w = |b: u16, l: u16| {
            TimeWindow::new(
                ClockTime::saturating_from_minutes(u32::from(b)),
                ClockTime::saturating_from_minutes(u32::from(b + l)),
            )
            .expect("non-empty window")
        };
        let (w1, w2) = (w(b1, l1), w(b2, l2));
        let expected = !(b1 + l1 <= b2 || b2 + l2 <= b1);
        prop_assert_eq!(w1.overlaps(&w2), expected);
    }
}
