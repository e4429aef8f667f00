use std::{fs, path::Path};

use tracing::{error, info};

use crate::{
	chunk::{ChunkNaming, Mode, TextChunks, WrittenChunk},
	error::{ChunkError, FileIOError, Result},
	verify::Integrity,
};

use super::{ensure_output_dir, file_name_of, PipelineOptions, ProcessOutcome};

/// Splits a UTF-8 text file into `chunk_size`-character chunks named
/// `<base>-chunk-<1..=N><ext>`, then rejoins the in-memory chunks and compares them to the
/// original content.
///
/// The whole file is held in memory. A failed write aborts the file and leaves earlier chunks
/// on disk.
pub fn split_text_file(
	source: impl AsRef<Path>,
	options: &PipelineOptions,
) -> Result<ProcessOutcome> {
	let source = source.as_ref();
	let file_name = file_name_of(source);

	let original =
		fs::read_to_string(source).map_err(|e| ChunkError::from_source_read(source, e))?;

	ensure_output_dir(options)?;
	let naming = ChunkNaming::for_source(source, &options.output_dir);

	let pieces = TextChunks::new(&original, options.chunk_size).collect::<Vec<_>>();
	let mut chunks = Vec::with_capacity(pieces.len());

	for (position, (span, piece)) in pieces.iter().enumerate() {
		let path = naming.chunk_path(Mode::Text, position);
		fs::write(&path, piece).map_err(|e| ChunkError::Write(FileIOError::new(&path, e)))?;

		let index = Mode::Text.name_index(position);
		info!("Written chunk {index} of text file {file_name}");

		chunks.push(WrittenChunk {
			index,
			span: *span,
			path,
		});
	}

	let rejoined = pieces.iter().map(|(_, piece)| *piece).collect::<String>();
	let integrity = Integrity::from_equal(rejoined == original);

	match integrity {
		Integrity::Pass => info!("Data integrity check for {file_name}: {integrity}"),
		Integrity::Fail => error!("Data integrity check for {file_name}: {integrity}"),
	}

	Ok(ProcessOutcome {
		file_name,
		mode: Mode::Text,
		source_len: original.len() as u64,
		chunks,
		verification: Ok(integrity),
	})
}
