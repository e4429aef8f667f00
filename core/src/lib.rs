//! Splits files into fixed-size chunks and proves the chunks reassemble into the original.
//!
//! - [`pipeline`]: text and binary split pipelines with their integrity checks
//! - [`verify`]: on-disk reassembly and full-content comparison
//! - [`service::watcher`]: the polling directory watcher feeding files into the pipelines
//! - [`processed`]: stores recording which files are done

pub mod chunk;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processed;
pub mod service;
pub mod verify;

pub use chunk::{ChunkNaming, Mode, DEFAULT_CHUNK_SIZE};
pub use config::AppConfig;
pub use error::{ChunkError, Result};
pub use pipeline::{process_file, PipelineOptions, ProcessOutcome};
pub use processed::{JsonLedger, MemoryProcessedSet, ProcessedStore};
pub use service::{
	watcher::{DirectoryWatcher, ScanReport, UnsupportedPolicy, VerificationPolicy, WatcherConfig},
	Service,
};
pub use verify::Integrity;
