use std::{
	fs::{self, File},
	path::Path,
};

use tracing::{error, info, warn};

use crate::{
	chunk::{chunk_count, ByteWindows, ChunkNaming, ChunkSpan, Mode, WrittenChunk},
	error::{ChunkError, FileIOError, Result},
	verify::{compare_files, reassemble, Integrity},
};

use super::{ensure_output_dir, file_name_of, PipelineOptions, ProcessOutcome};

/// Streams a file in `chunk_size`-byte windows into `<base>-chunk-<0..N><ext>`, then
/// reassembles the chunk files into `<base>-concatenated<ext>` and compares it to the source.
///
/// At most one window is held in memory at a time. A read error stops the split: chunks
/// written before the failure stay on disk and no later chunk is written.
pub fn split_binary_file(
	source: impl AsRef<Path>,
	options: &PipelineOptions,
) -> Result<ProcessOutcome> {
	let source = source.as_ref();
	let file_name = file_name_of(source);
	let read_err = |e| ChunkError::StreamRead(FileIOError::new(source, e));

	let file = File::open(source).map_err(read_err)?;
	let source_len = file.metadata().map_err(read_err)?.len();
	let total_chunks = chunk_count(source_len, options.chunk_size);

	ensure_output_dir(options)?;
	let naming = ChunkNaming::for_source(source, &options.output_dir);

	let mut chunks = Vec::with_capacity(total_chunks);
	let mut offset = 0u64;

	for (position, window) in ByteWindows::new(file, options.chunk_size).enumerate() {
		let window = window.map_err(|e| {
			error!("Error reading binary file {file_name}: {e}");
			read_err(e)
		})?;

		let path = naming.chunk_path(Mode::Binary, position);
		fs::write(&path, &window).map_err(|e| ChunkError::Write(FileIOError::new(&path, e)))?;

		let index = Mode::Binary.name_index(position);
		info!("Written chunk {index} of binary file {file_name}");

		let span = ChunkSpan {
			start: offset,
			end: offset + window.len() as u64,
		};
		offset = span.end;

		chunks.push(WrittenChunk { index, span, path });
	}

	if chunks.len() != total_chunks {
		warn!(
			"Binary file {file_name} changed while splitting: expected {total_chunks} chunks, wrote {}",
			chunks.len()
		);
	}

	info!("Binary file {file_name} split into {} chunks", chunks.len());

	let verification = verify(source, &naming, chunks.len());
	if let Err(e) = &verification {
		error!("Verification of {file_name} could not complete: {e:#}");
	}

	Ok(ProcessOutcome {
		file_name,
		mode: Mode::Binary,
		source_len: offset,
		chunks,
		verification,
	})
}

fn verify(source: &Path, naming: &ChunkNaming, total_chunks: usize) -> Result<Integrity> {
	let reassembled = reassemble(naming, Mode::Binary, total_chunks)?;
	compare_files(source, reassembled, Mode::Binary)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::num::NonZeroUsize;
	use tempfile::tempdir;

	fn options(dir: &Path, chunk_size: usize) -> PipelineOptions {
		PipelineOptions::new(dir.join("out"))
			.with_chunk_size(NonZeroUsize::new(chunk_size).unwrap())
	}

	#[test]
	fn writes_zero_based_chunks_and_reassembles() {
		let dir = tempdir().unwrap();
		let source = dir.path().join("photo.jpg");
		let data = (0..=255u8).cycle().take(1000).collect::<Vec<_>>();
		fs::write(&source, &data).unwrap();

		let options = options(dir.path(), 300);
		let outcome = split_binary_file(&source, &options).unwrap();

		assert!(outcome.passed());
		assert_eq!(outcome.source_len, 1000);
		assert_eq!(
			outcome.chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
			vec![0, 1, 2, 3]
		);
		assert_eq!(
			outcome.chunks.last().map(|c| c.span),
			Some(ChunkSpan {
				start: 900,
				end: 1000
			})
		);
		assert_eq!(
			fs::read(options.output_dir.join("photo-concatenated.jpg")).unwrap(),
			data
		);
	}

	#[test]
	fn empty_file_has_no_chunks_and_passes() {
		let dir = tempdir().unwrap();
		let source = dir.path().join("blank.png");
		fs::write(&source, b"").unwrap();

		let options = options(dir.path(), 16);
		let outcome = split_binary_file(&source, &options).unwrap();

		assert!(outcome.chunks.is_empty());
		assert!(outcome.passed());
		assert!(options.output_dir.join("blank-concatenated.png").exists());
	}

	#[test]
	fn missing_source_is_a_stream_error() {
		let dir = tempdir().unwrap();

		assert!(matches!(
			split_binary_file(dir.path().join("gone.pdf"), &options(dir.path(), 8)),
			Err(ChunkError::StreamRead(_))
		));
	}
}
