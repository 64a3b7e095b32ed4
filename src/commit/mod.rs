//! Pushing edited components back to the engine

pub mod error;
pub mod pipeline;
pub mod sink;

pub use error::CommitError;
pub use pipeline::{CommitOutcome, CommitPipeline, CommitReport};
pub use sink::{CommittedDocument, DirectoryCommitSink, EngineCommitSink, MemoryCommitSink};
