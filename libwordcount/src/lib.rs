#![recursion_limit = "1024"]

extern crate chrono;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate multimap;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate util;
extern crate uuid;

pub mod errors {
    error_chain! {
        links {
            Util(::util::errors::Error, ::util::errors::ErrorKind);
        }

        foreign_links {
            Io(::std::io::Error);
            Json(::serde_json::Error);
        }

        errors {
            InvalidInput(reason: String) {
                description("invalid input")
                display("invalid input: {}", reason)
            }
            OutputCollision(path: String) {
                description("output location already exists")
                display("output location already exists: {}", path)
            }
            StageFailure(stage: String, reason: String) {
                description("pipeline stage failed")
                display("{} stage failed: {}", stage, reason)
            }
            Cancelled(job_id: String) {
                description("job was cancelled")
                display("job {} was cancelled", job_id)
            }
        }
    }
}

pub mod combiner;
pub mod counters;
pub mod emitter;
pub mod intermediate;
pub mod io;
pub mod job;
pub mod mapper;
pub mod output;
pub mod partition;
pub mod reducer;
pub mod registry;
pub mod runner;
pub mod serialise;
pub mod split;
pub mod wordcount;

pub use combiner::Combine;
pub use counters::JobCounters;
pub use emitter::{EmitFinal, EmitIntermediate, FinalVecEmitter, IntermediateVecEmitter,
                  MultiMapEmitter};
pub use errors::*;
pub use intermediate::IntermediateInputKV;
pub use job::{Job, JobOptions, JobStatus};
pub use mapper::{Map, MapInputKV};
pub use partition::{HashPartitioner, Partition, PartitionInputKV};
pub use reducer::Reduce;
pub use registry::{UserImplRegistry, WordCountStages};
pub use runner::CancellationFlag;
pub use serialise::read_output;
pub use wordcount::{tokenize, Count, IntSumReducer, Token, TokenizerMapper};

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
