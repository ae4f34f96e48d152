use anyhow::{bail, Context, Result};
use chrono::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
pub mod chart;
pub mod cli;
pub mod recent;
pub mod threshold;
pub mod ticks;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// Formats tried, in order, for cells carrying both a date and a time.
pub const DT_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Formats tried, in order, for plain calendar dates.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a date or datetime string; a plain date maps to midnight.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }
    for fmt in DT_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    bail!("could not parse '{}' as a date", s)
}

/// The main struct for the price time series, sorted by time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub time: Vec<NaiveDateTime>,
    pub price: Vec<f64>,
}

/// Which part of a series to keep.
/// `last` wins over the date bounds when both are given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Window {
    pub last: Option<usize>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeSeries {
    pub fn new(capacity: usize) -> TimeSeries {
        let time: Vec<NaiveDateTime> = Vec::with_capacity(capacity);
        let price: Vec<f64> = Vec::with_capacity(capacity);
        TimeSeries { time, price }
    }

    /// Builds a series from unordered pairs.
    /// The sort is stable, pairs with the same time keep their order.
    pub fn from_pairs(mut pairs: Vec<(NaiveDateTime, f64)>) -> TimeSeries {
        pairs.sort_by_key(|&(t, _)| t);
        let mut ts = TimeSeries::new(pairs.len());
        for (t, p) in pairs {
            ts.time.push(t);
            ts.price.push(p);
        }
        ts
    }

    /// Init a TimeSeries from the csv file at `fin`,
    /// reading the dates from `date_col` and the prices from `price_col`.
    pub fn from_csv<P: AsRef<Path>>(fin: P, date_col: &str, price_col: &str) -> Result<TimeSeries> {
        let fin = fin.as_ref();
        let file = File::open(fin).with_context(|| format!("could not open {}", fin.display()))?;
        let ts = TimeSeries::from_reader(file, date_col, price_col)
            .with_context(|| format!("could not load the series from {}", fin.display()))?;
        log::info!("read {} rows from {}", ts.len(), fin.display());
        Ok(ts)
    }

    /// Same as `from_csv` for any reader.
    /// Fails on a missing column, an unparsable date, or a price that is not a number.
    pub fn from_reader<R: Read>(rdr: R, date_col: &str, price_col: &str) -> Result<TimeSeries> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(rdr);
        let headers = reader.headers().context("could not read the csv header")?.clone();
        let date_idx = column_index(&headers, date_col)?;
        let price_idx = column_index(&headers, price_col)?;
        let mut pairs: Vec<(NaiveDateTime, f64)> = Vec::new();
        for (i, record) in reader.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = record.with_context(|| format!("could not read csv line {}", line))?;
            let raw_date = record.get(date_idx).unwrap_or("");
            let raw_price = record.get(price_idx).unwrap_or("");
            let t = parse_datetime(raw_date).with_context(|| format!("line {}", line))?;
            let p: f64 = raw_price
                .parse()
                .with_context(|| format!("line {}: invalid price '{}'", line, raw_price))?;
            if p.is_nan() {
                bail!("line {}: price is NaN", line);
            }
            pairs.push((t, p));
        }
        Ok(TimeSeries::from_pairs(pairs))
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// first and last datetime, None for an empty series
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.time.first(), self.time.last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        }
    }

    /// whole days between the first and last datetime
    pub fn span_days(&self) -> Option<i64> {
        self.bounds().map(|(first, last)| (last - first).num_days())
    }

    /// keeps the final `n` entries, or everything if the series is shorter
    pub fn last(&self, n: usize) -> TimeSeries {
        let from = self.len().saturating_sub(n);
        TimeSeries {
            time: self.time[from..].to_vec(),
            price: self.price[from..].to_vec(),
        }
    }

    /// keeps the entries with start <= datetime <= end,
    /// an omitted bound does not constrain that side
    pub fn between(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> TimeSeries {
        let mut ts = TimeSeries::new(self.len());
        for (&t, &p) in self.time.iter().zip(self.price.iter()) {
            if start.map_or(false, |s| t < s) || end.map_or(false, |e| t > e) {
                continue;
            }
            ts.time.push(t);
            ts.price.push(p);
        }
        ts
    }

    pub fn slice(&self, window: &Window) -> TimeSeries {
        let ts = match window.last {
            Some(n) => {
                if window.start.is_some() || window.end.is_some() {
                    log::warn!("--last given, ignoring the date window");
                }
                self.last(n)
            }
            None => self.between(window.start, window.end),
        };
        log::info!("kept {} of {} rows", ts.len(), self.len());
        ts
    }
}

impl std::fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "datetime,price")?;
        for (t, p) in self.time.iter().zip(self.price.iter()) {
            writeln!(f, "{},{}", t, p)?
        }
        Ok(())
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    match headers.iter().position(|h| h == name) {
        Some(i) => Ok(i),
        None => bail!(
            "column '{}' not found, available columns: {}",
            name,
            headers.iter().collect::<Vec<_>>().join(", ")
        ),
    }
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}
