//! Piecewise proration of one period's pay over a commitment history
//!
//! A history is a list of segments ordered by start; each segment runs until
//! the next one starts and the last runs forever. The fraction of a period
//! earned is
//!
//! ```text
//! sum(overlap_ms(segment, period) * share) / (period_ms * approved_share)
//! ```
//!
//! accumulated in integers and divided once, when applied to an amount.

use std::fmt;

use dho_common::{Asset, TimePoint};

use crate::error::{PayrollError, PayrollResult};

/// From `start` on, `time_share_x100` percent is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitmentSegment {
    pub start: TimePoint,
    pub time_share_x100: i64,
}

impl CommitmentSegment {
    pub fn new(start: TimePoint, time_share_x100: i64) -> Self {
        Self {
            start,
            time_share_x100,
        }
    }
}

/// Half-open interval `[start, end)` of one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl PeriodWindow {
    pub fn new(start: TimePoint, end: TimePoint) -> Self {
        Self { start, end }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

/// Exact fraction of a period's pay, `numerator / denominator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proration {
    pub numerator: i128,
    pub denominator: i128,
}

impl Proration {
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// `amount * numerator / denominator`, truncated at the asset's precision
    pub fn apply(&self, amount: &Asset) -> PayrollResult<Asset> {
        Ok(amount.mul_ratio(self.numerator, self.denominator)?)
    }

    /// Lossy view for logging
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for Proration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.as_f64())
    }
}

fn overlap_ms(window: &PeriodWindow, start: TimePoint, end: Option<TimePoint>) -> i64 {
    let from = start.max(window.start);
    let to = match end {
        Some(end) => end.min(window.end),
        None => window.end,
    };
    if to > from {
        (to - from).num_milliseconds()
    } else {
        0
    }
}

/// Fraction of `window` earned under `segments`, relative to `approved_share_x100`
pub fn prorate(
    window: &PeriodWindow,
    segments: &[CommitmentSegment],
    approved_share_x100: i64,
) -> PayrollResult<Proration> {
    let duration = window.duration_ms();
    if duration <= 0 {
        return Err(PayrollError::InvalidProration(format!(
            "period ending {} does not start before it ends",
            window.end
        )));
    }
    if approved_share_x100 <= 0 {
        return Err(PayrollError::InvalidProration(
            "approved time share must be positive".to_string(),
        ));
    }
    if segments.windows(2).any(|pair| pair[0].start >= pair[1].start) {
        return Err(PayrollError::InvalidProration(
            "commitment segments must have strictly increasing start dates".to_string(),
        ));
    }

    let mut numerator: i128 = 0;
    for (i, segment) in segments.iter().enumerate() {
        if !(0..=approved_share_x100).contains(&segment.time_share_x100) {
            return Err(PayrollError::InvalidProration(format!(
                "time share {} outside 0..={}",
                segment.time_share_x100, approved_share_x100
            )));
        }
        let end = segments.get(i + 1).map(|next| next.start);
        let overlap = overlap_ms(window, segment.start, end);
        numerator += i128::from(overlap) * i128::from(segment.time_share_x100);
    }

    Ok(Proration {
        numerator,
        denominator: i128::from(duration) * i128::from(approved_share_x100),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t(seconds: i64) -> TimePoint {
        Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn hypha(s: &str) -> Asset {
        s.parse().unwrap()
    }

    #[test]
    fn test_full_commitment_pays_everything() {
        let window = PeriodWindow::new(t(0), t(60));
        let fraction = prorate(&window, &[CommitmentSegment::new(t(-10), 100)], 100).unwrap();

        assert_eq!(fraction.numerator, fraction.denominator);
        assert_eq!(fraction.apply(&hypha("759.75 HYPHA")).unwrap(), hypha("759.75 HYPHA"));
    }

    #[test]
    fn test_halves() {
        let window = PeriodWindow::new(t(0), t(60));
        let segments = [
            CommitmentSegment::new(t(0), 100),
            CommitmentSegment::new(t(30), 50),
        ];
        let fraction = prorate(&window, &segments, 100).unwrap();

        assert_eq!(fraction.numerator * 4, fraction.denominator * 3);
        assert_eq!(fraction.apply(&hypha("1000.00 HYPHA")).unwrap(), hypha("750.00 HYPHA"));
    }

    #[test]
    fn test_thirds() {
        let window = PeriodWindow::new(t(0), t(90));
        let segments = [
            CommitmentSegment::new(t(0), 50),
            CommitmentSegment::new(t(30), 100),
            CommitmentSegment::new(t(60), 75),
        ];
        let fraction = prorate(&window, &segments, 100).unwrap();

        assert_eq!(fraction.numerator * 4, fraction.denominator * 3);
        assert_eq!(fraction.to_string(), "0.7500");
    }

    #[test]
    fn test_time_before_first_segment_is_unpaid() {
        let window = PeriodWindow::new(t(0), t(100));
        let fraction = prorate(&window, &[CommitmentSegment::new(t(25), 80)], 80).unwrap();

        assert_eq!(fraction.apply(&hypha("100.00 HYPHA")).unwrap(), hypha("75.00 HYPHA"));
    }

    #[test]
    fn test_share_relative_to_approved() {
        let window = PeriodWindow::new(t(0), t(60));
        let segments = [
            CommitmentSegment::new(t(0), 40),
            CommitmentSegment::new(t(30), 20),
        ];
        let fraction = prorate(&window, &segments, 40).unwrap();

        assert_eq!(fraction.numerator * 4, fraction.denominator * 3);
    }

    #[test]
    fn test_segments_outside_window_are_ignored() {
        let window = PeriodWindow::new(t(100), t(200));
        let segments = [
            CommitmentSegment::new(t(0), 100),
            CommitmentSegment::new(t(50), 0),
            CommitmentSegment::new(t(250), 100),
        ];
        let fraction = prorate(&window, &segments, 100).unwrap();

        assert!(fraction.is_zero());
    }

    #[test]
    fn test_rejects_bad_input() {
        let window = PeriodWindow::new(t(0), t(60));
        let unordered = [
            CommitmentSegment::new(t(30), 100),
            CommitmentSegment::new(t(30), 50),
        ];
        assert!(prorate(&window, &unordered, 100).is_err());
        assert!(prorate(&window, &[CommitmentSegment::new(t(0), 100)], 0).is_err());
        assert!(prorate(&window, &[CommitmentSegment::new(t(0), 120)], 100).is_err());
        assert!(prorate(&PeriodWindow::new(t(60), t(60)), &[], 100).is_err());
    }
}
