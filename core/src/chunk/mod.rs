//! Chunk boundaries and chunk file naming.
//!
//! Chunk files live flat in the output directory next to the reassembled file:
//!
//! - text chunks: `<base>-chunk-<1-based index><ext>`
//! - binary chunks: `<base>-chunk-<0-based index><ext>`
//! - reassembled binary file: `<base>-concatenated<ext>`
//!
//! Callers address chunks by their zero-based position in the sequence; the name index is
//! derived from the [`Mode`].

use std::{
	fmt,
	num::NonZeroUsize,
	path::{Path, PathBuf},
};

use cw_file_ext::{extension_of, FileClass};
use serde::{Deserialize, Serialize};

mod split;
mod windows;

pub use split::{split_text, TextChunks};
pub use windows::ByteWindows;

/// 10 MiB
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(10 * 1024 * 1024) {
	Some(size) => size,
	None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	Text,
	Binary,
}

impl Mode {
	/// Index written into the file name of the chunk at `position`
	pub fn name_index(&self, position: usize) -> usize {
		match self {
			Self::Text => position + 1,
			Self::Binary => position,
		}
	}

	pub fn from_class(class: FileClass) -> Option<Self> {
		match class {
			FileClass::Text => Some(Self::Text),
			FileClass::Binary => Some(Self::Binary),
			FileClass::Unsupported => None,
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Text => "text",
			Self::Binary => "binary",
		})
	}
}

/// Number of chunks a source of `len` units splits into, `ceil(len / chunk_size)`
pub fn chunk_count(len: u64, chunk_size: NonZeroUsize) -> usize {
	len.div_ceil(chunk_size.get() as u64) as usize
}

/// Half-open range `[start, end)` of a chunk inside its source, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpan {
	pub start: u64,
	pub end: u64,
}

impl ChunkSpan {
	pub fn len(&self) -> u64 {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

/// A chunk persisted to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenChunk {
	/// Index used in the file name
	pub index: usize,
	pub span: ChunkSpan,
	pub path: PathBuf,
}

/// Builds the deterministic output paths for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkNaming {
	output_dir: PathBuf,
	base: String,
	extension: String,
}

impl ChunkNaming {
	pub fn new(
		output_dir: impl Into<PathBuf>,
		base: impl Into<String>,
		extension: impl Into<String>,
	) -> Self {
		Self {
			output_dir: output_dir.into(),
			base: base.into(),
			extension: extension.into(),
		}
	}

	/// Derives base name and extension from the source file name, keeping the extension's casing
	pub fn for_source(source: impl AsRef<Path>, output_dir: impl Into<PathBuf>) -> Self {
		let source = source.as_ref();
		let base = source
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default();

		Self::new(output_dir, base, extension_of(source))
	}

	pub fn base(&self) -> &str {
		&self.base
	}

	pub fn extension(&self) -> &str {
		&self.extension
	}

	pub fn output_dir(&self) -> &Path {
		&self.output_dir
	}

	pub fn chunk_file_name(&self, mode: Mode, position: usize) -> String {
		format!(
			"{}-chunk-{}{}",
			self.base,
			mode.name_index(position),
			self.extension
		)
	}

	pub fn chunk_path(&self, mode: Mode, position: usize) -> PathBuf {
		self.output_dir.join(self.chunk_file_name(mode, position))
	}

	pub fn concatenated_file_name(&self) -> String {
		format!("{}-concatenated{}", self.base, self.extension)
	}

	pub fn concatenated_path(&self) -> PathBuf {
		self.output_dir.join(self.concatenated_file_name())
	}
}
