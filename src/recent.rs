use super::chart::{render, Chart};
use super::cli::RecentArgs;
use super::TimeSeries;
use anyhow::Result;
use std::path::PathBuf;

/// Loads the series, keeps the requested window and plots it.
pub fn run(args: &RecentArgs) -> Result<PathBuf> {
    let ts = TimeSeries::from_csv(&args.series.csv, &args.series.date_col, &args.series.price_col)?;
    let sliced = ts.slice(&args.window);
    log::debug!("sliced series:\n{}", sliced);
    let fout = args.out.clone().unwrap_or_else(|| Chart::Recent.default_out());
    render(&sliced, Chart::Recent, &fout)
}
