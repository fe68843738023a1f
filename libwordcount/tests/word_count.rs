/// Integration tests running whole word count jobs against the local filesystem.
extern crate util;
extern crate wordcount;

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use util::data_layer::{AbstractionLayer, LocalAbstractionLayer};
use wordcount::*;

fn test_dir(name: &str) -> PathBuf {
    let path = env::temp_dir().join("wordcount-integration").join(name);
    if path.exists() {
        fs::remove_dir_all(&path).unwrap();
    }
    fs::create_dir_all(&path).unwrap();
    path
}

fn run_word_count(name: &str, input: &str, options: JobOptions) -> (Job, BTreeMap<String, u64>) {
    let dir = test_dir(name);
    fs::write(dir.join("input.txt"), input).unwrap();

    let mut job = Job::new(JobOptions {
        base_directory: dir,
        ..options
    }).unwrap();
    job.run(&LocalAbstractionLayer).unwrap();

    let totals = read_output(&LocalAbstractionLayer, job.output_path()).unwrap();
    (job, totals)
}

fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
    pairs
        .iter()
        .map(|&(word, count)| (word.to_owned(), count))
        .collect()
}

#[test]
fn counts_a_sentence() {
    let (_, totals) = run_word_count("counts_a_sentence", "the cat sat on the mat", JobOptions::default());

    assert_eq!(
        counts(&[("the", 2), ("cat", 1), ("sat", 1), ("on", 1), ("mat", 1)]),
        totals
    );
}

#[test]
fn counts_a_repeated_word() {
    let (_, totals) = run_word_count("counts_a_repeated_word", "a a a", JobOptions::default());

    assert_eq!(counts(&[("a", 3)]), totals);
}

#[test]
fn empty_input_writes_no_records() {
    let (job, totals) = run_word_count("empty_input_writes_no_records", "", JobOptions::default());

    assert!(totals.is_empty());
    assert_eq!(0, job.counters.map_output_records);
    assert_eq!(
        "",
        fs::read_to_string(job.output_path().join("part-r-00000")).unwrap()
    );
    assert!(job.output_path().join("_SUCCESS").is_file());
}

#[test]
fn whitespace_input_writes_no_records() {
    let (_, totals) = run_word_count(
        "whitespace_input_writes_no_records",
        "  \t\n\n   \r\n",
        JobOptions::default(),
    );

    assert!(totals.is_empty());
}

#[test]
fn partial_sums_from_two_units_are_merged() {
    let options = JobOptions {
        split_size: 8,
        ..Default::default()
    };

    let (job, totals) = run_word_count("partial_sums_from_two_units_are_merged", "dog dog\ndog", options);

    assert_eq!(counts(&[("dog", 3)]), totals);
    assert_eq!(2, job.counters.map_tasks);
    assert_eq!(2, job.counters.combine_output_records);
    assert_eq!(2, job.counters.reduce_input_records);
}

#[test]
fn output_is_sorted_within_a_part() {
    let (job, _) = run_word_count("output_is_sorted_within_a_part", "b c a b", JobOptions::default());

    assert_eq!(
        "a\t1\nb\t2\nc\t1\n",
        fs::read_to_string(job.output_path().join("part-r-00000")).unwrap()
    );
}

#[test]
fn every_token_is_written_to_exactly_one_part() {
    let input = "one two three four five six seven eight nine ten\none two three\n";
    let options = JobOptions {
        reduce_tasks: 4,
        split_size: 16,
        ..Default::default()
    };

    let (job, totals) = run_word_count("every_token_is_written_to_exactly_one_part", input, options);

    let mut seen = Vec::new();
    for partition in 0..4 {
        let part = job.output_path().join(format!("part-r-{:05}", partition));
        for line in fs::read_to_string(part).unwrap().lines() {
            seen.push(line.split('\t').next().unwrap().to_owned());
        }
    }
    seen.sort();
    let mut deduplicated = seen.clone();
    deduplicated.dedup();

    assert_eq!(deduplicated, seen);
    assert_eq!(10, seen.len());
    assert_eq!(Some(&2), totals.get("one"));
    assert_eq!(Some(&1), totals.get("ten"));
}

#[test]
fn combiner_does_not_change_results() {
    let input = "x y x\nz x y\nx\n";
    let with_combiner = JobOptions {
        split_size: 4,
        ..Default::default()
    };
    let without_combiner = JobOptions {
        split_size: 4,
        use_combiner: false,
        ..Default::default()
    };

    let (_, combined) = run_word_count("combiner_does_not_change_results_on", input, with_combiner);
    let (_, uncombined) = run_word_count("combiner_does_not_change_results_off", input, without_combiner);

    assert_eq!(counts(&[("x", 4), ("y", 2), ("z", 1)]), combined);
    assert_eq!(combined, uncombined);
}

#[test]
fn two_runs_use_different_output_locations() {
    let dir = test_dir("two_runs_use_different_output_locations");
    fs::write(dir.join("input.txt"), "a b").unwrap();
    let options = JobOptions {
        base_directory: dir.clone(),
        ..Default::default()
    };

    let mut first = Job::new(options.clone()).unwrap();
    let mut second = Job::new(options).unwrap();
    first.run(&LocalAbstractionLayer).unwrap();
    second.run(&LocalAbstractionLayer).unwrap();

    assert_ne!(first.output_path(), second.output_path());
    assert_eq!(2, fs::read_dir(dir.join("output")).unwrap().count());
}

#[test]
fn existing_output_location_is_not_overwritten() {
    let dir = test_dir("existing_output_location_is_not_overwritten");
    fs::write(dir.join("input.txt"), "a b").unwrap();
    let mut job = Job::new(JobOptions {
        base_directory: dir,
        ..Default::default()
    }).unwrap();
    fs::create_dir_all(job.output_path()).unwrap();
    fs::write(job.output_path().join("keep.txt"), "mine").unwrap();

    let err = job.run(&LocalAbstractionLayer).unwrap_err();

    match *err.kind() {
        ErrorKind::OutputCollision(_) => {}
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
    assert_eq!(JobStatus::Failed, job.status);
    assert_eq!(
        "mine",
        fs::read_to_string(job.output_path().join("keep.txt")).unwrap()
    );
}

/// Delegates to the local filesystem but fails to write the second output part.
struct FailingPartLayer {
    local: LocalAbstractionLayer,
}

impl AbstractionLayer for FailingPartLayer {
    fn read_file(&self, path: &Path) -> util::errors::Result<Vec<u8>> {
        self.local.read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> util::errors::Result<()> {
        if path.ends_with("part-r-00001") {
            return Err("disk full".into());
        }
        self.local.write_file(path, data)
    }

    fn read_dir(&self, path: &Path) -> util::errors::Result<Vec<PathBuf>> {
        self.local.read_dir(path)
    }

    fn exists(&self, path: &Path) -> util::errors::Result<bool> {
        self.local.exists(path)
    }

    fn is_file(&self, path: &Path) -> util::errors::Result<bool> {
        self.local.is_file(path)
    }

    fn create_dir(&self, path: &Path) -> util::errors::Result<()> {
        self.local.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> util::errors::Result<()> {
        self.local.create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> util::errors::Result<()> {
        self.local.rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> util::errors::Result<()> {
        self.local.remove_dir_all(path)
    }
}

#[test]
fn failed_part_write_leaves_no_output() {
    let dir = test_dir("failed_part_write_leaves_no_output");
    fs::write(dir.join("input.txt"), "the cat sat on the mat").unwrap();
    let mut job = Job::new(JobOptions {
        base_directory: dir.clone(),
        reduce_tasks: 2,
        ..Default::default()
    }).unwrap();
    let layer = FailingPartLayer {
        local: LocalAbstractionLayer::new(),
    };

    assert!(!job.wait_for_completion(&layer));

    assert_eq!(JobStatus::Failed, job.status);
    assert!(!job.output_path().exists());
    assert_eq!(0, fs::read_dir(dir.join("output")).unwrap().count());
}
