use super::chart::{render, Chart};
use super::cli::ThresholdArgs;
use super::TimeSeries;
use anyhow::Result;
use chrono::prelude::*;
use std::cmp::Ordering;
use std::path::PathBuf;

/// -1 below, 0 at, 1 above the threshold.
/// Equality is exact, with no tolerance.
pub fn classify(v: f64, threshold: f64) -> i8 {
    match v.partial_cmp(&threshold) {
        Some(Ordering::Less) => -1,
        Some(Ordering::Greater) => 1,
        // NaN never reaches here: the loader and the cli both reject it
        _ => 0,
    }
}

/// Threshold labels, same index as the series they come from.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub time: Vec<NaiveDateTime>,
    pub label: Vec<i8>,
}

impl Labels {
    /// labels as a plain series, for plotting
    pub fn to_series(&self) -> TimeSeries {
        TimeSeries {
            time: self.time.clone(),
            price: self.label.iter().map(|&l| f64::from(l)).collect(),
        }
    }
}

impl std::fmt::Display for Labels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "datetime,label")?;
        for (t, l) in self.time.iter().zip(self.label.iter()) {
            writeln!(f, "{},{}", t, l)?
        }
        Ok(())
    }
}

impl TimeSeries {
    pub fn classify(&self, threshold: f64) -> Labels {
        let label: Vec<i8> = self.price.iter().map(|&p| classify(p, threshold)).collect();
        log::info!(
            "{} below, {} at, {} above {}",
            label.iter().filter(|&&l| l == -1).count(),
            label.iter().filter(|&&l| l == 0).count(),
            label.iter().filter(|&&l| l == 1).count(),
            threshold
        );
        Labels {
            time: self.time.clone(),
            label,
        }
    }
}

/// Loads the series, labels it against the threshold and plots the labels.
pub fn run(args: &ThresholdArgs) -> Result<PathBuf> {
    let ts = TimeSeries::from_csv(&args.series.csv, &args.series.date_col, &args.series.price_col)?;
    let labels = ts.classify(args.threshold);
    log::debug!("labels:\n{}", labels);
    let fout = args
        .out
        .clone()
        .unwrap_or_else(|| Chart::Threshold.default_out());
    render(&labels.to_series(), Chart::Threshold, &fout)
}
