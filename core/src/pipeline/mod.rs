//! Split pipelines.
//!
//! Both pipelines share the split, concatenate, compare contract but verify differently:
//! text files are rejoined and compared in memory, binary files are reassembled from the chunk
//! files on disk and compared against the source file.

use std::{
	num::NonZeroUsize,
	path::{Path, PathBuf},
};

use crate::{
	chunk::{Mode, WrittenChunk, DEFAULT_CHUNK_SIZE},
	error::{ChunkError, FileIOError, Result},
	verify::Integrity,
};

mod binary;
mod text;

pub use binary::split_binary_file;
pub use text::split_text_file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
	/// Characters per chunk in text mode, bytes per chunk in binary mode
	pub chunk_size: NonZeroUsize,
	pub output_dir: PathBuf,
}

impl PipelineOptions {
	pub fn new(output_dir: impl Into<PathBuf>) -> Self {
		Self {
			chunk_size: DEFAULT_CHUNK_SIZE,
			output_dir: output_dir.into(),
		}
	}

	pub fn with_chunk_size(mut self, chunk_size: NonZeroUsize) -> Self {
		self.chunk_size = chunk_size;
		self
	}
}

/// Result of running one file through a pipeline.
///
/// Splitting succeeded if this value exists at all; `verification` carries the integrity
/// check, or the error that kept it from running.
#[derive(Debug)]
pub struct ProcessOutcome {
	pub file_name: String,
	pub mode: Mode,
	/// Bytes read from the source
	pub source_len: u64,
	pub chunks: Vec<WrittenChunk>,
	pub verification: Result<Integrity>,
}

impl ProcessOutcome {
	pub fn passed(&self) -> bool {
		matches!(self.verification, Ok(Integrity::Pass))
	}
}

/// Runs `source` through the pipeline matching `mode`
pub fn process_file(
	source: impl AsRef<Path>,
	mode: Mode,
	options: &PipelineOptions,
) -> Result<ProcessOutcome> {
	match mode {
		Mode::Text => split_text_file(source, options),
		Mode::Binary => split_binary_file(source, options),
	}
}

fn file_name_of(path: &Path) -> String {
	path.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string())
}

fn ensure_output_dir(options: &PipelineOptions) -> Result<()> {
	std::fs::create_dir_all(&options.output_dir).map_err(|e| {
		ChunkError::Write(FileIOError::with_context(
			&options.output_dir,
			e,
			"creating output directory",
		))
	})
}
