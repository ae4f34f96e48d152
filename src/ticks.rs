use super::TimeSeries;
use chrono::prelude::*;

/// Label format for the month ticks, e.g. "Jan 2024".
pub const TICK_FORMAT: &str = "%b %Y";

/// How the date axis of a chart is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStrategy {
    /// months between two ticks
    pub interval: u32,
    pub format: &'static str,
}

/// Months between ticks for a series spanning `span_days`.
pub fn month_interval(span_days: i64) -> u32 {
    if span_days <= 120 {
        1
    } else if span_days <= 365 {
        2
    } else {
        3
    }
}

impl TickStrategy {
    pub fn for_span(span_days: i64) -> TickStrategy {
        TickStrategy {
            interval: month_interval(span_days),
            format: TICK_FORMAT,
        }
    }

    /// None for an empty series, the chart then keeps the default ticks.
    pub fn for_series(ts: &TimeSeries) -> Option<TickStrategy> {
        let strategy = ts.span_days().map(TickStrategy::for_span);
        if let Some(s) = strategy {
            log::debug!("ticks every {} month(s)", s.interval);
        }
        strategy
    }

    /// First days of the months in [start, end] whose month index (Jan = 0)
    /// is a multiple of the interval.
    pub fn ticks(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
        let interval = self.interval.max(1);
        let mut ticks = Vec::new();
        let mut cursor = NaiveDate::from_ymd_opt(start.year(), start.month(), 1);
        while let Some(day) = cursor {
            let dt = match day.and_hms_opt(0, 0, 0) {
                Some(dt) => dt,
                None => break,
            };
            if dt > end {
                break;
            }
            if dt >= start && day.month0() % interval == 0 {
                ticks.push(dt);
            }
            cursor = first_of_next_month(day);
        }
        ticks
    }
}

fn first_of_next_month(d: NaiveDate) -> Option<NaiveDate> {
    if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    }
}

/// Label format for the evenly spaced fallback ticks, finer for short spans.
pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    if d > chrono::Duration::weeks(1) {
        "%y-%m-%d"
    } else if d > chrono::Duration::days(1) {
        "%m-%d %H"
    } else {
        "%d %H:%M"
    }
}
