pub mod blocking;
pub mod clustering;
pub mod config;
pub mod environment;
pub mod error;
pub mod evaluation;
pub mod harness;
pub mod logging;
pub mod matching;
pub mod persist;
pub mod pipeline;
pub mod record;
pub mod similarity;

pub use config::ResolutionConfig;
pub use error::{ResolutionError, Result};
pub use pipeline::{run_pipeline, ExecutionMode, PipelineOutcome};

pub const TARGET_BLOCKING: &str = "blocking";
pub const TARGET_MATCHING: &str = "matching";
pub const TARGET_CLUSTERING: &str = "clustering";
pub const TARGET_EVALUATION: &str = "evaluation";
pub const TARGET_HARNESS: &str = "harness";
pub const TARGET_PERSIST: &str = "persist";
pub const TARGET_PIPELINE: &str = "pipeline";
