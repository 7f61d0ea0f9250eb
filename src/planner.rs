//! Execution planning: convert parsed CLI data into a job specification used by main.

use crate::compute::{self, ResultStream};
use crate::data::{self, Command, DataSource, Parameters};
use crate::error::PlannerError;
use tracing::debug;

pub struct ComputePlan {
    pub results: ResultStream,
    pub params: Parameters,
}

pub struct OutputPlan {
    pub command: Command,
    pub source: DataSource,
    pub flush_each_record: bool,
}

pub fn build_job(
    source: DataSource,
    command: Command,
    params: Parameters,
) -> Result<(ComputePlan, OutputPlan), PlannerError> {
    let results = match (&source, command) {
        (DataSource::Separate(origin, targets), Command::Measure) => {
            let pairs = data::expand_separate(*origin, targets.clone())?;
            compute::calculate_stream(pairs, params.clone())
        }
        (DataSource::Paired(path), Command::Measure) => {
            let pairs = data::expand_paired_file(path.clone())?;
            compute::calculate_stream(pairs, params.clone())
        }
        (DataSource::Sites(origin, path), Command::Sites) => {
            let sites = data::expand_site_file(path.clone())?;
            let selected = compute::select_sites(sites, *origin, &params)?;
            compute::site_stream(selected)
        }
        (_, command) => {
            return Err(format!("Input does not fit the {} command", command).into());
        }
    };

    let flush_each_record = source.uses_stdin() && command == Command::Measure;
    debug!(%command, flush_each_record, format = %params.output.format, "job planned");

    let compute_plan = ComputePlan { results, params };
    let output_plan = OutputPlan {
        command,
        source,
        flush_each_record,
    };
    Ok((compute_plan, output_plan))
}
