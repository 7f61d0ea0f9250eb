//! Site distance calculator CLI - entry point.

use sitedist::{cli, output, planner};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    match cli::parse_cli(args) {
        Ok((source, command, params)) => {
            let start = if params.perf {
                Some(std::time::Instant::now())
            } else {
                None
            };

            let (compute_plan, output_plan) = match planner::build_job(source, command, params) {
                Ok(plan) => plan,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            };

            let planner::ComputePlan { results, params } = compute_plan;

            let record_count = match output::dispatch_output(results, &params, &output_plan) {
                Ok(count) => count,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            };

            if let Some(start_time) = start {
                let elapsed = start_time.elapsed();
                eprintln!(
                    "Processed {} records in {:.3}s ({:.0} records/sec)",
                    record_count,
                    elapsed.as_secs_f64(),
                    record_count as f64 / elapsed.as_secs_f64()
                );
            }
        }
        Err(sitedist::error::CliError::Exit(message)) => {
            println!("{}", message);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
