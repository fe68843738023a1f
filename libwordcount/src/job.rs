use std::path::{Path, PathBuf};

use chrono::prelude::*;
use serde_json;
use uuid::Uuid;

use util::data_layer::AbstractionLayer;
use util::output_error;

use counters::JobCounters;
use errors::*;
use io::read_input_text;
use output::OutputCommitter;
use registry::WordCountStages;
use runner::{self, CancellationFlag, JobOutput, RunnerOptions};
use split::{create_input_splits, MAP_INPUT_SIZE};
use wordcount::{Count, Token};

pub const JOB_NAME: &str = "word count";
pub const DEFAULT_INPUT_FILE: &str = "input.txt";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "output";
pub const DEFAULT_WORKERS: usize = 4;

/// `JobOptions` stores arguments used to construct a `Job`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    /// The base resource location. Default input and output paths are derived from it.
    pub base_directory: PathBuf,
    /// The input file. Defaults to `<base>/input.txt`.
    pub input_path: Option<PathBuf>,
    /// The directory under which the output directory of a run is created.
    /// Defaults to `<base>/output`.
    pub output_root: Option<PathBuf>,
    /// The number of reduce tasks, and so the number of output parts.
    pub reduce_tasks: u64,
    /// The number of threads running map tasks, and then reduce tasks.
    pub workers: usize,
    /// The target size in bytes of an input split.
    pub split_size: u64,
    /// Whether map output is combined within each input split.
    pub use_combiner: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        JobOptions {
            base_directory: PathBuf::from("."),
            input_path: None,
            output_root: None,
            reduce_tasks: 1,
            workers: DEFAULT_WORKERS,
            split_size: MAP_INPUT_SIZE,
            use_combiner: true,
        }
    }
}

impl JobOptions {
    pub fn validate(&self) -> Result<()> {
        if self.reduce_tasks == 0 {
            return Err("reduce_tasks must be at least 1".into());
        }
        if self.workers == 0 {
            return Err("workers must be at least 1".into());
        }
        if self.split_size == 0 {
            return Err("split_size must be at least 1".into());
        }
        Ok(())
    }

    pub fn resolve_input_path(&self) -> PathBuf {
        match self.input_path {
            Some(ref path) => path.clone(),
            None => self.base_directory.join(DEFAULT_INPUT_FILE),
        }
    }

    pub fn resolve_output_root(&self) -> PathBuf {
        match self.output_root {
            Some(ref path) => path.clone(),
            None => self.base_directory.join(DEFAULT_OUTPUT_DIRECTORY),
        }
    }
}

/// The lifecycle of a `Job`: `NotStarted -> Running -> Succeeded | Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

/// Generates the ID of a run, which also names its output directory.
///
/// The ID starts with the UTC time the job was created, so runs sort by age, and ends with a
/// random UUID so that two runs never share an ID.
pub fn generate_run_id() -> String {
    format!(
        "{}-{}",
        Utc::now().format("%Y%m%dT%H%M%S%3fZ"),
        Uuid::new_v4()
    )
}

/// The `Job` is a struct that represents one run of the word count.
pub struct Job {
    pub id: String,
    pub name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,

    pub status: JobStatus,
    pub status_details: Option<String>,

    pub counters: JobCounters,

    pub time_requested: DateTime<Utc>,
    pub time_started: Option<DateTime<Utc>>,
    pub time_completed: Option<DateTime<Utc>>,

    options: JobOptions,
    cancellation: CancellationFlag,
}

impl Job {
    pub fn new(options: JobOptions) -> Result<Self> {
        options.validate().chain_err(|| "Invalid job options")?;

        let id = generate_run_id();
        let input_path = options.resolve_input_path();
        let output_path = options.resolve_output_root().join(&id);

        Ok(Job {
            id,
            name: JOB_NAME.to_owned(),
            input_path,
            output_path,

            status: JobStatus::NotStarted,
            status_details: None,

            counters: JobCounters::default(),

            time_requested: Utc::now(),
            time_started: None,
            time_completed: None,

            options,
            cancellation: CancellationFlag::new(),
        })
    }

    /// Returns a handle that cancels this job when set.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Runs the job to completion. A job can only be run once.
    ///
    /// Either every final result is written to `output_path`, or the job fails and
    /// `output_path` is not created.
    pub fn run(&mut self, data_layer: &dyn AbstractionLayer) -> Result<()> {
        if self.status != JobStatus::NotStarted {
            return Err(format!("Job {} has already been run", self.id).into());
        }

        self.status = JobStatus::Running;
        self.time_started = Some(Utc::now());
        info!(
            "Word counter from [{}] -> [{}]",
            self.input_path.to_string_lossy(),
            self.output_path.to_string_lossy()
        );

        let result = self.execute(data_layer);
        let completed = Utc::now();
        self.time_completed = Some(completed);
        let elapsed = self.time_started
            .map(|started| (completed - started).num_milliseconds())
            .unwrap_or(0);

        match result {
            Ok(counters) => {
                self.status = JobStatus::Succeeded;
                info!("Job {} succeeded in {} ms", self.id, elapsed);
                match serde_json::to_string(&counters) {
                    Ok(json) => info!("Job counters: {}", json),
                    Err(err) => warn!("Unable to serialise job counters: {}", err),
                }
                self.counters = counters;
                Ok(())
            }
            Err(err) => {
                self.status = JobStatus::Failed;
                self.status_details = Some(err.to_string());
                info!("Job {} failed after {} ms", self.id, elapsed);
                Err(err)
            }
        }
    }

    /// Runs the job and reports whether it succeeded. Failures are logged.
    pub fn wait_for_completion(&mut self, data_layer: &dyn AbstractionLayer) -> bool {
        match self.run(data_layer) {
            Ok(()) => true,
            Err(err) => {
                let id = self.id.clone();
                output_error(&err.chain_err(|| format!("Job {} failed", id)));
                false
            }
        }
    }

    fn execute(&self, data_layer: &dyn AbstractionLayer) -> Result<JobCounters> {
        let text = read_input_text(data_layer, &self.input_path)?;
        let committer = OutputCommitter::new(data_layer, &self.output_path)?;

        let splits = create_input_splits(&text, self.options.split_size);
        info!("Created {} input splits", splits.len());

        let stages = WordCountStages::new(self.options.reduce_tasks, self.options.use_combiner)?;
        let runner_options = RunnerOptions {
            job_id: self.id.clone(),
            workers: self.options.workers,
            reduce_tasks: self.options.reduce_tasks,
        };
        let registry = stages.registry();
        let output = runner::run_job(&registry, &splits, &text, &runner_options, &self.cancellation)?;

        committer.setup()?;
        if let Err(err) = self.write_output(&committer, &output) {
            committer.abort();
            return Err(err);
        }

        Ok(output.counters)
    }

    fn write_output(&self, committer: &OutputCommitter, output: &JobOutput<Token, Count>) -> Result<()> {
        for partition in 0..self.options.reduce_tasks {
            let pairs = output
                .partitions
                .get(&partition)
                .map(|pairs| pairs.as_slice())
                .unwrap_or(&[]);
            committer.write_part(partition, pairs)?;
        }

        if self.cancellation.is_cancelled() {
            return Err(ErrorKind::Cancelled(self.id.clone()).into());
        }
        committer.commit()
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
