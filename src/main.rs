use std::process;

use clap::Parser;
use jumpstitch::{init_logging, run, Args, Error, BUILD_DATE, VERSION};
use tracing::{debug, error, info};

fn main() {
    let args = Args::parse();

    if let Err(err) = init_logging(&args.log_level) {
        eprintln!("{:#}", err);
        process::exit(2);
    }

    info!("Starting jumpstitch {} ({})", VERSION, BUILD_DATE);
    debug!(?args, "Parsed arguments");

    match run(&args) {
        Ok(report) => {
            println!(
                "{} connector(s) inserted, {} merged, {} too short, {} too long, {} break(s)",
                report.inserted,
                report.merged,
                report.skipped_short,
                report.skipped_long,
                report.breaks
            );
        }
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(e) if e.is_precondition() => eprintln!("{}", e),
                _ => error!("{:#}", err),
            }
            process::exit(1);
        }
    }
}
