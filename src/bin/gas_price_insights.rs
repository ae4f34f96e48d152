use gas_price_insights::cli::{parse_cli, print_help, Command};
use gas_price_insights::{recent, threshold};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let written = match parse_cli()? {
        Command::PlotRecent(args) => {
            log::info!("plot-recent from {}", args.series.csv.display());
            recent::run(&args)?
        }
        Command::Threshold(args) => {
            log::info!(
                "threshold {} from {}",
                args.threshold,
                args.series.csv.display()
            );
            threshold::run(&args)?
        }
        Command::Help => {
            print_help()?;
            return Ok(());
        }
    };
    println!("Wrote: {}", written.display());
    Ok(())
}
