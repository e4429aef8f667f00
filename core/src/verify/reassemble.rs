use std::{
	fs::{self, File},
	io::{self, BufWriter, Write},
	path::PathBuf,
};

use tracing::{debug, info};

use crate::{
	chunk::{ChunkNaming, Mode},
	error::{ChunkError, FileIOError, Result},
};

/// Concatenates `total_chunks` chunk files, in index order, into `<base>-concatenated<ext>`.
///
/// The output is opened once and every chunk is appended whole. Chunk contents are not
/// inspected; only a missing chunk file stops reassembly.
pub fn reassemble(naming: &ChunkNaming, mode: Mode, total_chunks: usize) -> Result<PathBuf> {
	let output_path = naming.concatenated_path();
	let write_err = |e: io::Error| ChunkError::Write(FileIOError::new(&output_path, e));

	let mut output = BufWriter::new(File::create(&output_path).map_err(write_err)?);

	for position in 0..total_chunks {
		let chunk_path = naming.chunk_path(mode, position);

		let bytes = fs::read(&chunk_path).map_err(|e| {
			if e.kind() == io::ErrorKind::NotFound {
				ChunkError::MissingChunk {
					index: mode.name_index(position),
					path: chunk_path.clone(),
				}
			} else {
				ChunkError::ChunkRead(FileIOError::new(&chunk_path, e))
			}
		})?;

		output.write_all(&bytes).map_err(write_err)?;
		debug!(
			"Appended {} ({} bytes) to {}",
			chunk_path.display(),
			bytes.len(),
			output_path.display()
		);
	}

	output.flush().map_err(write_err)?;

	info!("Chunks concatenated to {}", output_path.display());

	Ok(output_path)
}
