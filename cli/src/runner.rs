use std::path::PathBuf;

use clap::ArgMatches;

use util::data_layer::LocalAbstractionLayer;
use wordcount::{Job, JobOptions};

use errors::*;

/// Builds the `JobOptions` described by the command line arguments.
pub fn job_options(matches: &ArgMatches) -> Result<JobOptions> {
    let base_directory = matches
        .value_of("base")
        .chain_err(|| "Base directory must be specified")?;

    let options = JobOptions {
        base_directory: PathBuf::from(base_directory),
        input_path: matches.value_of("input").map(PathBuf::from),
        output_root: matches.value_of("output").map(PathBuf::from),
        reduce_tasks: value_t!(matches, "reducers", u64)?,
        workers: value_t!(matches, "workers", usize)?,
        split_size: value_t!(matches, "split_size", u64)?,
        use_combiner: !matches.is_present("no_combine"),
    };
    options.validate()?;

    Ok(options)
}

/// Runs a word count job and reports whether it succeeded.
pub fn run(options: JobOptions) -> Result<bool> {
    let mut job = Job::new(options).chain_err(|| "Error creating job")?;
    info!("Created job '{}' with id {}", job.name, job.id);

    let data_layer = LocalAbstractionLayer::new();
    let succeeded = job.wait_for_completion(&data_layer);
    if succeeded {
        println!("{}", job.output_path().to_string_lossy());
    }

    Ok(succeeded)
}
