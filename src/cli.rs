use super::{parse_datetime, Window, VERSION};
use anyhow::{bail, Context, Result};
use clap::{App, Arg, ArgMatches, SubCommand};
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the series is read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesArgs {
    pub csv: PathBuf,
    pub date_col: String,
    pub price_col: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentArgs {
    pub series: SeriesArgs,
    pub window: Window,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdArgs {
    pub series: SeriesArgs,
    pub threshold: f64,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlotRecent(RecentArgs),
    Threshold(ThresholdArgs),
    /// no subcommand given
    Help,
}

fn series_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    let arg_csv = Arg::with_name("csv")
        .help("path to the csv file")
        .long("csv")
        .takes_value(true)
        .required(true);
    let arg_date_col = Arg::with_name("date_col")
        .help("name of the date column")
        .long("date-col")
        .takes_value(true)
        .required(true);
    let arg_price_col = Arg::with_name("price_col")
        .help("name of the price column")
        .long("price-col")
        .takes_value(true)
        .required(true);
    vec![arg_csv, arg_date_col, arg_price_col]
}

fn arg_out<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("out")
        .help("output png file")
        .long("out")
        .takes_value(true)
}

/// The cli definition with the plot-recent and threshold subcommands.
pub fn build_cli() -> App<'static, 'static> {
    let arg_last = Arg::with_name("last")
        .help("number of most recent rows to plot, wins over --start/--end")
        .long("last")
        .takes_value(true);
    let arg_start = Arg::with_name("start")
        .help("first date to plot, inclusive (YYYY-MM-DD)")
        .long("start")
        .takes_value(true);
    let arg_end = Arg::with_name("end")
        .help("last date to plot, inclusive (YYYY-MM-DD)")
        .long("end")
        .takes_value(true);
    let arg_threshold = Arg::with_name("threshold")
        .help("price threshold, e.g. 3.00")
        .long("threshold")
        .takes_value(true)
        .allow_hyphen_values(true)
        .required(true);

    let plot_recent = SubCommand::with_name("plot-recent")
        .about("plot the most recent N entries or a date range")
        .args(&series_args())
        .arg(arg_last)
        .arg(arg_start)
        .arg(arg_end)
        .arg(arg_out());
    let threshold = SubCommand::with_name("threshold")
        .about("label prices relative to a threshold and plot the labels")
        .args(&series_args())
        .arg(arg_threshold)
        .arg(arg_out());

    App::new("gas_price_insights")
        .version(VERSION.unwrap_or("unknown"))
        .about("explore and visualize gas price time series")
        .subcommand(plot_recent)
        .subcommand(threshold)
}

/// Takes the CLI arguments of the process; clap exits on bad arguments and --help.
pub fn parse_cli() -> Result<Command> {
    parse_cli_from(std::env::args_os()).map_err(|e| match e.downcast::<clap::Error>() {
        Ok(clap_err) => clap_err.exit(),
        Err(e) => e,
    })
}

/// Same as `parse_cli` for the given arguments, the first being the program name.
/// Argument errors and --help are returned instead of exiting.
pub fn parse_cli_from<I, T>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli().get_matches_from_safe(args)?;
    command_from_matches(&matches)
}

pub fn print_help() -> Result<()> {
    build_cli().print_help()?;
    println!();
    Ok(())
}

fn command_from_matches(matches: &ArgMatches) -> Result<Command> {
    match matches.subcommand() {
        ("plot-recent", Some(sub)) => {
            let window = Window {
                last: parse_opt::<usize>(sub, "last")?,
                start: parse_opt_date(sub, "start")?,
                end: parse_opt_date(sub, "end")?,
            };
            Ok(Command::PlotRecent(RecentArgs {
                series: series_from_matches(sub),
                window,
                out: sub.value_of("out").map(PathBuf::from),
            }))
        }
        ("threshold", Some(sub)) => {
            let threshold = match parse_opt::<f64>(sub, "threshold")? {
                Some(t) if t.is_nan() => bail!("--threshold must be a number"),
                Some(t) => t,
                None => bail!("--threshold is required"),
            };
            Ok(Command::Threshold(ThresholdArgs {
                series: series_from_matches(sub),
                threshold,
                out: sub.value_of("out").map(PathBuf::from),
            }))
        }
        _ => Ok(Command::Help),
    }
}

fn series_from_matches(m: &ArgMatches) -> SeriesArgs {
    SeriesArgs {
        csv: PathBuf::from(m.value_of("csv").unwrap_or_default()),
        date_col: m.value_of("date_col").unwrap_or_default().to_string(),
        price_col: m.value_of("price_col").unwrap_or_default().to_string(),
    }
}

fn parse_opt<T>(m: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    m.value_of(name)
        .map(|v| {
            v.parse::<T>()
                .with_context(|| format!("invalid value '{}' for --{}", v, name))
        })
        .transpose()
}

fn parse_opt_date(m: &ArgMatches, name: &str) -> Result<Option<chrono::NaiveDateTime>> {
    m.value_of(name)
        .map(|v| parse_datetime(v).with_context(|| format!("invalid value for --{}", name)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        parse_cli_from(std::iter::once("gas_price_insights").chain(args.iter().copied()))
    }

    const SERIES: [&str; 6] = ["--csv", "prices.csv", "--date-col", "date", "--price-col", "price"];

    fn with_series(cmd: &str, extra: &[&str]) -> Vec<String> {
        std::iter::once(cmd)
            .chain(SERIES.iter().copied())
            .chain(extra.iter().copied())
            .map(String::from)
            .collect()
    }

    fn parse_owned(args: Vec<String>) -> Result<Command> {
        let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        parse(&refs)
    }

    #[test]
    fn no_arguments_is_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn plot_recent_with_last() {
        let cmd = parse_owned(with_series("plot-recent", &["--last", "30"])).unwrap();
        match cmd {
            Command::PlotRecent(args) => {
                assert_eq!(args.series.csv, PathBuf::from("prices.csv"));
                assert_eq!(args.series.date_col, "date");
                assert_eq!(args.series.price_col, "price");
                assert_eq!(args.window.last, Some(30));
                assert_eq!(args.window.start, None);
                assert_eq!(args.out, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn plot_recent_with_dates() {
        let extra = ["--start", "2024-01-01", "--end", "2024-02-01", "--out", "a/b.png"];
        let cmd = parse_owned(with_series("plot-recent", &extra)).unwrap();
        match cmd {
            Command::PlotRecent(args) => {
                assert_eq!(args.window.last, None);
                assert_eq!(args.window.start, Some(parse_datetime("2024-01-01").unwrap()));
                assert_eq!(args.window.end, Some(parse_datetime("2024-02-01").unwrap()));
                assert_eq!(args.out, Some(PathBuf::from("a/b.png")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn plot_recent_rejects_bad_values() {
        assert!(parse_owned(with_series("plot-recent", &["--last", "ten"])).is_err());
        assert!(parse_owned(with_series("plot-recent", &["--last", "-1"])).is_err());
        assert!(parse_owned(with_series("plot-recent", &["--start", "01-2024"])).is_err());
    }

    #[test]
    fn threshold_accepts_negative_values() {
        let cmd = parse_owned(with_series("threshold", &["--threshold", "-0.5"])).unwrap();
        match cmd {
            Command::Threshold(args) => assert_eq!(args.threshold, -0.5),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn threshold_is_required_and_numeric() {
        assert!(parse_owned(with_series("threshold", &[])).is_err());
        assert!(parse_owned(with_series("threshold", &["--threshold", "high"])).is_err());
        assert!(parse_owned(with_series("threshold", &["--threshold", "NaN"])).is_err());
    }

    #[test]
    fn only_long_flags() {
        assert!(parse_owned(with_series("plot-recent", &["-n", "3"])).is_err());
        assert!(parse_owned(with_series("threshold", &["-t", "3"])).is_err());
        let err = parse_owned(with_series("threshold", &["--threshold", "3", "-o", "x.png"]));
        assert!(err.is_err());
    }

    #[test]
    fn help_is_a_clap_error() {
        let err = parse(&["--help"]).unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.kind, clap::ErrorKind::HelpDisplayed);
    }

    #[test]
    fn series_columns_are_required() {
        assert!(parse(&["threshold", "--csv", "p.csv", "--threshold", "3"]).is_err());
        assert!(parse(&["plot-recent", "--date-col", "d", "--price-col", "p"]).is_err());
    }
}
