use std::cmp;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use multimap::MultiMap;

use combiner::Combine;
use counters::JobCounters;
use emitter::{FinalVecEmitter, MultiMapEmitter};
use errors::*;
use intermediate::IntermediateInputKV;
use mapper::Map;
use partition::{Partition, PartitionInputKV};
use reducer::Reduce;
use registry::UserImplRegistry;
use split::InputSplit;

/// `CancellationFlag` is a handle that can be used to cancel a running job from another thread.
///
/// The runner checks the flag between units of work; a cancelled job fails with `Cancelled`.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// `RunnerOptions` stores the arguments of a single run of the runner.
#[derive(Clone, Debug)]
pub struct RunnerOptions {
    /// ID of the job being run, used for error reporting.
    pub job_id: String,
    /// The number of threads running map tasks, and then reduce tasks.
    pub workers: usize,
    /// The number of reduce tasks. Every partition returned by the partitioner must be lower.
    pub reduce_tasks: u64,
}

/// `MapTaskOutput` is the combined and partitioned output of the map task of one input split.
pub struct MapTaskOutput<K, V> {
    pub partitions: HashMap<u64, Vec<(K, V)>>,
    pub counters: JobCounters,
}

/// `JobOutput` holds the final key-value pairs of every reduce partition, sorted by key.
pub struct JobOutput<K, V> {
    pub partitions: BTreeMap<u64, Vec<(K, V)>>,
    pub counters: JobCounters,
}

fn stage_failure(stage: &str, reason: String) -> ErrorKind {
    ErrorKind::StageFailure(stage.to_owned(), reason)
}

/// `run_map_task` maps every record of `split`, combines the values of each key if the registry
/// has a combiner, and partitions the resulting pairs.
pub fn run_map_task<M, R, P, C>(
    registry: &UserImplRegistry<M, R, P, C>,
    split: &InputSplit,
    text: &str,
    reduce_tasks: u64,
) -> Result<MapTaskOutput<M::Key, M::Value>>
where
    M: Map,
    M::Key: Clone + Eq + Hash,
    R: Reduce<M::Key, M::Value>,
    P: Partition<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    let mut counters = JobCounters {
        map_tasks: 1,
        ..Default::default()
    };

    let mut grouped: MultiMap<M::Key, M::Value> = MultiMap::new();
    for record in split.records(text) {
        counters.map_input_records += 1;
        let offset = record.key;
        registry
            .mapper
            .map(record, MultiMapEmitter::new(&mut grouped))
            .chain_err(|| {
                stage_failure("map", format!("record at offset {} of split {}", offset, split.id))
            })?;
    }
    counters.map_output_records = grouped
        .iter_all()
        .map(|(_, values)| values.len() as u64)
        .sum();

    let mut pairs = Vec::new();
    match registry.combiner {
        Some(combiner) => for (key, values) in grouped {
            counters.combine_input_records += values.len() as u64;

            let mut combined = Vec::new();
            combiner
                .combine(
                    IntermediateInputKV::new(key.clone(), values),
                    FinalVecEmitter::new(&mut combined),
                )
                .chain_err(|| stage_failure("combine", format!("split {}", split.id)))?;

            counters.combine_output_records += combined.len() as u64;
            for value in combined {
                pairs.push((key.clone(), value));
            }
        },
        None => for (key, values) in grouped {
            for value in values {
                pairs.push((key.clone(), value));
            }
        },
    }

    let mut partitions: HashMap<u64, Vec<(M::Key, M::Value)>> = HashMap::new();
    for (key, value) in pairs {
        let partition = registry
            .partitioner
            .partition(PartitionInputKV::new(&key, &value))
            .chain_err(|| stage_failure("partition", format!("split {}", split.id)))?;
        if partition >= reduce_tasks {
            return Err(stage_failure(
                "partition",
                format!("partition {} is out of range for {} reduce tasks", partition, reduce_tasks),
            ).into());
        }
        partitions
            .entry(partition)
            .or_insert_with(Vec::new)
            .push((key, value));
    }

    Ok(MapTaskOutput {
        partitions,
        counters,
    })
}

/// Raises the abort flag of a worker pool when the worker holding it unwinds.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl<'a> Drop for AbortOnPanic<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

/// `run_on_workers` runs every task of a stage on at most `workers` threads, which take tasks in
/// order from a shared cursor. Outputs are returned in task order.
///
/// The first failing task, panicking worker, thread that cannot be started or cancellation stops
/// all workers before their next task and fails the stage.
fn run_on_workers<T, O, F>(
    stage: &str,
    tasks: Vec<T>,
    workers: usize,
    job_id: &str,
    cancellation: &CancellationFlag,
    run_task: F,
) -> Result<Vec<O>>
where
    T: Send,
    O: Send,
    F: Fn(T) -> Result<O> + Sync,
{
    let task_count = tasks.len();
    let slots: Vec<Mutex<Option<T>>> = tasks
        .into_iter()
        .map(|task| Mutex::new(Some(task)))
        .collect();
    let next_task = AtomicUsize::new(0);
    let aborted = AtomicBool::new(false);
    let workers = cmp::max(1, cmp::min(workers, task_count));
    debug!("Running {} {} tasks on {} workers", task_count, stage, workers);

    let (spawn_error, worker_results) = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut spawn_error = None;

        for worker in 0..workers {
            let slots = &slots;
            let next_task = &next_task;
            let aborted = &aborted;
            let run_task = &run_task;

            let spawned = thread::Builder::new()
                .name(format!("{}-worker-{}", stage, worker))
                .spawn_scoped(scope, move || -> Result<Vec<(usize, O)>> {
                    let _abort_on_panic = AbortOnPanic(aborted);
                    let mut outputs = Vec::new();

                    while !aborted.load(Ordering::SeqCst) {
                        if cancellation.is_cancelled() {
                            aborted.store(true, Ordering::SeqCst);
                            return Err(ErrorKind::Cancelled(job_id.to_owned()).into());
                        }

                        let index = next_task.fetch_add(1, Ordering::SeqCst);
                        let slot = match slots.get(index) {
                            Some(slot) => slot,
                            None => break,
                        };
                        let task = match slot.lock().ok().and_then(|mut task| task.take()) {
                            Some(task) => task,
                            None => {
                                aborted.store(true, Ordering::SeqCst);
                                let reason = format!("task {} is unavailable", index);
                                return Err(stage_failure(stage, reason).into());
                            }
                        };
                        trace!("{} worker {} running task {}", stage, worker, index);

                        match run_task(task) {
                            Ok(output) => outputs.push((index, output)),
                            Err(err) => {
                                aborted.store(true, Ordering::SeqCst);
                                return Err(err);
                            }
                        }
                    }
                    Ok(outputs)
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    aborted.store(true, Ordering::SeqCst);
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        let results: Vec<Result<Vec<(usize, O)>>> = handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(stage_failure(stage, format!("{} worker panicked", stage)).into())
                })
            })
            .collect();
        (spawn_error, results)
    });

    let mut outputs = Vec::with_capacity(task_count);
    for result in worker_results {
        outputs.extend(result?);
    }
    if let Some(err) = spawn_error {
        return Err(err)
            .chain_err(|| stage_failure(stage, "unable to start a worker thread".to_owned()));
    }
    if outputs.len() != task_count {
        return Err(stage_failure(
            stage,
            format!("{} of {} tasks completed", outputs.len(), task_count),
        ).into());
    }

    outputs.sort_by_key(|&(index, _)| index);
    Ok(outputs.into_iter().map(|(_, output)| output).collect())
}

fn run_map_phase<M, R, P, C>(
    registry: &UserImplRegistry<M, R, P, C>,
    splits: &[InputSplit],
    text: &str,
    options: &RunnerOptions,
    cancellation: &CancellationFlag,
) -> Result<Vec<MapTaskOutput<M::Key, M::Value>>>
where
    M: Map + Sync,
    M::Key: Clone + Eq + Hash + Send,
    M::Value: Send,
    R: Reduce<M::Key, M::Value> + Sync,
    P: Partition<M::Key, M::Value> + Sync,
    C: Combine<M::Key, M::Value> + Sync,
{
    let tasks: Vec<&InputSplit> = splits.iter().collect();
    run_on_workers(
        "map",
        tasks,
        options.workers,
        &options.job_id,
        cancellation,
        |split: &InputSplit| {
            debug!("Running map task for split {} ({} bytes)", split.id, split.len());
            run_map_task(registry, split, text, options.reduce_tasks)
        },
    )
}

/// Routes every value of a key to the reduce partition chosen for it by the map tasks, grouping
/// values by key. Every reduce partition is present, even if it received no values.
fn shuffle<K: Ord, V>(
    map_outputs: Vec<MapTaskOutput<K, V>>,
    reduce_tasks: u64,
) -> BTreeMap<u64, BTreeMap<K, Vec<V>>> {
    let mut partitions: BTreeMap<u64, BTreeMap<K, Vec<V>>> =
        (0..reduce_tasks).map(|partition| (partition, BTreeMap::new())).collect();

    for output in map_outputs {
        for (partition, pairs) in output.partitions {
            let groups = partitions.entry(partition).or_insert_with(BTreeMap::new);
            for (key, value) in pairs {
                groups.entry(key).or_insert_with(Vec::new).push(value);
            }
        }
    }
    partitions
}

fn run_reduce_task<M, R, P, C>(
    registry: &UserImplRegistry<M, R, P, C>,
    partition: u64,
    groups: BTreeMap<M::Key, Vec<M::Value>>,
) -> Result<(Vec<(M::Key, M::Value)>, JobCounters)>
where
    M: Map,
    M::Key: Clone,
    R: Reduce<M::Key, M::Value>,
    P: Partition<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    let mut counters = JobCounters {
        reduce_tasks: 1,
        ..Default::default()
    };
    let mut results = Vec::new();

    for (key, values) in groups {
        counters.reduce_input_groups += 1;
        counters.reduce_input_records += values.len() as u64;

        let mut reduced = Vec::new();
        registry
            .reducer
            .reduce(
                IntermediateInputKV::new(key.clone(), values),
                FinalVecEmitter::new(&mut reduced),
            )
            .chain_err(|| stage_failure("reduce", format!("partition {}", partition)))?;

        counters.reduce_output_records += reduced.len() as u64;
        for value in reduced {
            results.push((key.clone(), value));
        }
    }

    Ok((results, counters))
}

fn run_reduce_phase<M, R, P, C>(
    registry: &UserImplRegistry<M, R, P, C>,
    shuffled: BTreeMap<u64, BTreeMap<M::Key, Vec<M::Value>>>,
    options: &RunnerOptions,
    cancellation: &CancellationFlag,
) -> Result<JobOutput<M::Key, M::Value>>
where
    M: Map + Sync,
    M::Key: Clone + Send,
    M::Value: Send,
    R: Reduce<M::Key, M::Value> + Sync,
    P: Partition<M::Key, M::Value> + Sync,
    C: Combine<M::Key, M::Value> + Sync,
{
    let tasks: Vec<(u64, BTreeMap<M::Key, Vec<M::Value>>)> = shuffled.into_iter().collect();
    let task_results = run_on_workers(
        "reduce",
        tasks,
        options.workers,
        &options.job_id,
        cancellation,
        |(partition, groups): (u64, BTreeMap<M::Key, Vec<M::Value>>)| {
            run_reduce_task(registry, partition, groups)
                .map(|(results, counters)| (partition, results, counters))
        },
    )?;

    let mut output = JobOutput {
        partitions: BTreeMap::new(),
        counters: JobCounters::default(),
    };
    for (partition, results, counters) in task_results {
        output.counters.merge(&counters);
        output.partitions.insert(partition, results);
    }
    Ok(output)
}

/// `run_job` executes a whole job in this process: map tasks on a pool of worker threads, a
/// shuffle that brings all values of a key to one reduce partition, then the reduce tasks on the
/// same number of threads.
///
/// All-or-nothing: the first failure of any task fails the run.
pub fn run_job<M, R, P, C>(
    registry: &UserImplRegistry<M, R, P, C>,
    splits: &[InputSplit],
    text: &str,
    options: &RunnerOptions,
    cancellation: &CancellationFlag,
) -> Result<JobOutput<M::Key, M::Value>>
where
    M: Map + Sync,
    M::Key: Clone + Eq + Hash + Ord + Send,
    M::Value: Send,
    R: Reduce<M::Key, M::Value> + Sync,
    P: Partition<M::Key, M::Value> + Sync,
    C: Combine<M::Key, M::Value> + Sync,
{
    if options.reduce_tasks == 0 {
        return Err("At least one reduce task is required".into());
    }

    let map_outputs = run_map_phase(registry, splits, text, options, cancellation)?;
    let mut counters = JobCounters::default();
    for output in &map_outputs {
        counters.merge(&output.counters);
    }
    info!(
        "Map phase complete: {} tasks, {} records",
        counters.map_tasks, counters.map_input_records
    );

    if cancellation.is_cancelled() {
        return Err(ErrorKind::Cancelled(options.job_id.clone()).into());
    }

    let shuffled = shuffle(map_outputs, options.reduce_tasks);
    let mut output = run_reduce_phase(registry, shuffled, options, cancellation)?;
    info!(
        "Reduce phase complete: {} tasks, {} records",
        output.counters.reduce_tasks, output.counters.reduce_output_records
    );

    counters.merge(&output.counters);
    output.counters = counters;
    Ok(output)
}
