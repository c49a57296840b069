use crate::day_key::{date_key, start_of_day};
use crate::models::{Choice, EntryRecord, TrendPoint};
use chrono::{DateTime, Duration, Local, TimeZone};
use std::collections::HashMap;

pub const WINDOW_DAYS: u32 = 7;

/// Padding added around the plotted values on the vertical axis.
const Y_PADDING: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    pub points: Vec<TrendPoint>,
}

pub fn project_today(entries: &[EntryRecord]) -> Trend {
    project(entries, &Local::now(), WINDOW_DAYS)
}

/// Cumulative score for each of the `window_days` calendar days ending on
/// the local date of `reference`, oldest first.
///
/// Days without a record count as [`Choice::Same`].
pub fn project<Tz: TimeZone>(
    entries: &[EntryRecord],
    reference: &DateTime<Tz>,
    window_days: u32,
) -> Trend {
    // Stepping over NaiveDate keeps DST transitions from skipping or repeating a day.
    let today = reference.date_naive();
    let choices: HashMap<&str, Choice> = entries
        .iter()
        .map(|entry| (entry.day_key.as_str(), entry.choice))
        .collect();

    let mut total = 0i64;
    let mut points = Vec::with_capacity(window_days as usize);
    for offset in (0..window_days).rev() {
        let date = today - Duration::days(i64::from(offset));
        let choice = choices
            .get(date_key(date).as_str())
            .copied()
            .unwrap_or(Choice::Same);
        total += i64::from(choice.value());
        points.push(TrendPoint { date, value: total });
    }

    Trend { points }
}

impl Trend {
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|point| point.value)
    }

    /// `(min - 2, max + 2)` over the plotted values; `(-2, 2)` when empty.
    pub fn y_domain(&self) -> (i64, i64) {
        let min = self.values().min().unwrap_or(0);
        let max = self.values().max().unwrap_or(0);
        (min - Y_PADDING, max + Y_PADDING)
    }

    pub fn y_axis_values(&self) -> Vec<i64> {
        let (low, high) = self.y_domain();
        (low..=high).collect()
    }

    /// Start of the first day minus 12 hours to start of the last day plus
    /// 12 hours, so the end points are not clipped.
    pub fn x_domain<Tz: TimeZone>(&self, tz: &Tz) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let first = start_of_day(self.points.first()?.date, tz)?;
        let last = start_of_day(self.points.last()?.date, tz)?;
        Some((first - Duration::hours(12), last + Duration::hours(12)))
    }
}
