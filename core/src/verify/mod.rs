//! Round-trip verification: reassemble chunk files from disk and compare against the source

use std::{fmt, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
	chunk::{chunk_count, ChunkNaming, Mode},
	error::{ChunkError, FileIOError, Result},
	pipeline::PipelineOptions,
};

mod compare;
mod reassemble;

pub use compare::compare_files;
pub use reassemble::reassemble;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Integrity {
	Pass,
	Fail,
}

impl Integrity {
	pub fn from_equal(equal: bool) -> Self {
		if equal {
			Self::Pass
		} else {
			Self::Fail
		}
	}

	pub fn is_pass(&self) -> bool {
		matches!(self, Self::Pass)
	}
}

impl fmt::Display for Integrity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Pass => "Pass",
			Self::Fail => "Fail",
		})
	}
}

/// Reassembles an existing chunk set for `source` and compares it to the source on disk.
///
/// The expected chunk count is derived from the source itself: bytes for binary mode, characters
/// for text mode. Text chunks are addressed 1-based and binary chunks 0-based, matching how the
/// pipelines wrote them. Returns the reassembled file path with the comparison result.
pub fn verify_on_disk(
	source: impl AsRef<Path>,
	mode: Mode,
	options: &PipelineOptions,
) -> Result<(PathBuf, Integrity)> {
	let source = source.as_ref();
	let naming = ChunkNaming::for_source(source, &options.output_dir);

	let units = match mode {
		Mode::Binary => std::fs::metadata(source)
			.map_err(|e| ChunkError::StreamRead(FileIOError::new(source, e)))?
			.len(),
		Mode::Text => std::fs::read_to_string(source)
			.map_err(|e| ChunkError::from_source_read(source, e))?
			.chars()
			.count() as u64,
	};

	let reassembled = reassemble(&naming, mode, chunk_count(units, options.chunk_size))?;
	let integrity = compare_files(source, &reassembled, mode)?;

	Ok((reassembled, integrity))
}
