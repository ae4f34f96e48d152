use super::ticks::{suitable_xfmt, TickStrategy};
use super::{min_and_max, TimeSeries};
use anyhow::{Context, Result};
use chrono::prelude::*;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const CHART_SIZE: (u32, u32) = (800, 500);

/// The two kinds of chart the tool draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    /// raw prices
    Recent,
    /// threshold labels, -1 / 0 / 1
    Threshold,
}

impl Chart {
    pub fn title(&self) -> &'static str {
        match self {
            Chart::Recent => "Recent Gas Prices",
            Chart::Threshold => "Gas Prices vs Threshold",
        }
    }

    pub fn y_desc(&self) -> &'static str {
        match self {
            Chart::Recent => "Price (USD / gallon)",
            Chart::Threshold => "Below=-1  At=0  Above=1",
        }
    }

    pub fn default_out(&self) -> PathBuf {
        match self {
            Chart::Recent => PathBuf::from("out/recent.png"),
            Chart::Threshold => PathBuf::from("out/threshold.png"),
        }
    }

    fn y_labels(&self) -> usize {
        match self {
            Chart::Recent => 10,
            Chart::Threshold => 3,
        }
    }

    fn format_y(&self, y: f64) -> String {
        match self {
            Chart::Recent => format!("{:.2}", y),
            Chart::Threshold => format!("{:.0}", y),
        }
    }

    /// y range with some room above and below the values
    pub fn y_range(&self, values: &[f64]) -> Range<f64> {
        match self {
            Chart::Threshold => -1.5..1.5,
            Chart::Recent => match min_and_max(values) {
                Some((ymin, ymax)) => {
                    let yspan = (ymax - ymin) / 10f64;
                    let pad = if yspan > 0. { yspan } else { 1. };
                    (ymin - pad)..(ymax + pad)
                }
                None => 0f64..1f64,
            },
        }
    }
}

/// Datetime x axis whose key points are the month ticks when there are any,
/// and evenly spaced points otherwise.
#[derive(Debug, Clone)]
pub struct DateAxis {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    ticks: Vec<DateTime<Utc>>,
}

impl DateAxis {
    /// Axis covering the series plus a margin of 1/20 of its span on each side.
    /// An empty series gets the first day of 1970.
    pub fn for_series(ts: &TimeSeries, strategy: Option<TickStrategy>) -> DateAxis {
        let (xmindt, xmaxdt) = match ts.bounds() {
            Some((first, last)) => {
                let xspan: chrono::Duration = last - first;
                let xmargin = if xspan > chrono::Duration::zero() {
                    xspan / 20
                } else {
                    chrono::Duration::days(1)
                };
                (first - xmargin, last + xmargin)
            }
            None => {
                let epoch = NaiveDateTime::default();
                (epoch, epoch + chrono::Duration::days(1))
            }
        };
        let ticks = match strategy {
            Some(s) => s.ticks(xmindt, xmaxdt),
            None => Vec::new(),
        };
        DateAxis {
            start: TimeZone::from_utc_datetime(&Utc, &xmindt),
            end: TimeZone::from_utc_datetime(&Utc, &xmaxdt),
            ticks: ticks
                .iter()
                .map(|t| TimeZone::from_utc_datetime(&Utc, t))
                .collect(),
        }
    }

    /// true when the month ticks label the axis
    pub fn has_month_ticks(&self) -> bool {
        !self.ticks.is_empty()
    }

    fn span(&self) -> chrono::Duration {
        self.end - self.start
    }
}

impl Ranged for DateAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = DateTime<Utc>;

    fn map(&self, value: &DateTime<Utc>, limit: (i32, i32)) -> i32 {
        let total = self.span().num_milliseconds() as f64;
        if total <= 0. {
            return limit.0;
        }
        let offset = (*value - self.start).num_milliseconds() as f64;
        limit.0 + ((limit.1 - limit.0) as f64 * offset / total).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<DateTime<Utc>> {
        if self.has_month_ticks() {
            return self.ticks.clone();
        }
        let n = hint.max_num_points().min(10);
        if n < 2 {
            return vec![self.start];
        }
        let step = self.span() / (n as i32 - 1);
        (0..n).map(|i| self.start + step * i as i32).collect()
    }

    fn range(&self) -> Range<DateTime<Utc>> {
        self.start..self.end
    }
}

/// creates the parent directory of `fout` if it does not exist yet
pub fn ensure_parent_dir(fout: &Path) -> Result<()> {
    if let Some(parent) = fout.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("could not create directory {}", parent.display()))?;
            log::debug!("created directory {}", parent.display());
        }
    }
    Ok(())
}

/// Plots the series as a line chart to the png file `fout` and returns its path.
pub fn render(ts: &TimeSeries, chart_kind: Chart, fout: &Path) -> Result<PathBuf> {
    ensure_parent_dir(fout)?;
    let strategy = TickStrategy::for_series(ts);
    let axis = DateAxis::for_series(ts, strategy);
    let xfmt = match strategy {
        Some(s) if axis.has_month_ticks() => s.format,
        _ => suitable_xfmt(axis.span()),
    };
    let yrange = chart_kind.y_range(&ts.price);

    let root = BitMapBackend::new(fout, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(chart_kind.title(), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(axis, yrange)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 14))
        .x_desc("Date")
        .y_desc(chart_kind.y_desc())
        .x_labels(12)
        .y_labels(chart_kind.y_labels())
        .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
        .y_label_formatter(&|y: &f64| chart_kind.format_y(*y))
        .draw()?;

    let line = LineSeries::new(
        ts.time
            .iter()
            .zip(ts.price.iter())
            .map(|(x, y)| (TimeZone::from_utc_datetime(&Utc, x), *y)),
        RGBColor(31, 119, 180).stroke_width(2),
    );
    chart.draw_series(line)?;
    root.present()
        .with_context(|| format!("could not write {}", fout.display()))?;
    log::info!("plotted {} points to {}", ts.len(), fout.display());
    Ok(fout.to_path_buf())
}
