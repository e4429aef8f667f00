use std::{fs, path::Path};

use tracing::{error, info};

use crate::{
	chunk::Mode,
	error::{ChunkError, FileIOError, Result},
};

use super::Integrity;

/// Reads both files fully and compares them.
///
/// Text mode compares decoded strings, binary mode compares the raw bytes. There is no
/// tolerance and no sampling: every byte takes part in the comparison.
pub fn compare_files(
	original: impl AsRef<Path>,
	reconstructed: impl AsRef<Path>,
	mode: Mode,
) -> Result<Integrity> {
	let (original, reconstructed) = (original.as_ref(), reconstructed.as_ref());

	let equal = match mode {
		Mode::Text => read_text(original)? == read_text(reconstructed)?,
		Mode::Binary => read_bytes(original)? == read_bytes(reconstructed)?,
	};
	let integrity = Integrity::from_equal(equal);

	if integrity.is_pass() {
		info!(
			"Files are identical, no data loss: {} == {}",
			original.display(),
			reconstructed.display()
		);
	} else {
		error!(
			"Files do not match, data might be lost: {} != {}",
			original.display(),
			reconstructed.display()
		);
	}

	Ok(integrity)
}

fn read_text(path: &Path) -> Result<String> {
	fs::read_to_string(path).map_err(|e| ChunkError::from_source_read(path, e))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
	fs::read(path).map_err(|e| {
		ChunkError::StreamRead(FileIOError::with_context(path, e, "reading for comparison"))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;
	use tracing_test::traced_test;

	#[test]
	#[traced_test]
	fn identical_bytes_pass() {
		let dir = tempdir().unwrap();
		let (a, b) = (dir.path().join("a.bin"), dir.path().join("b.bin"));
		fs::write(&a, [0u8, 1, 2, 255]).unwrap();
		fs::write(&b, [0u8, 1, 2, 255]).unwrap();

		assert_eq!(compare_files(&a, &b, Mode::Binary).unwrap(), Integrity::Pass);
		assert!(logs_contain("Files are identical"));
	}

	#[test]
	#[traced_test]
	fn single_byte_difference_fails() {
		let dir = tempdir().unwrap();
		let (a, b) = (dir.path().join("a.bin"), dir.path().join("b.bin"));
		fs::write(&a, [0u8, 1, 2, 3]).unwrap();
		fs::write(&b, [0u8, 1, 9, 3]).unwrap();

		assert_eq!(compare_files(&a, &b, Mode::Binary).unwrap(), Integrity::Fail);
		assert!(logs_contain("Files do not match"));
	}

	#[test]
	fn length_difference_fails() {
		let dir = tempdir().unwrap();
		let (a, b) = (dir.path().join("a.txt"), dir.path().join("b.txt"));
		fs::write(&a, "same prefix").unwrap();
		fs::write(&b, "same prefix plus more").unwrap();

		assert_eq!(compare_files(&a, &b, Mode::Text).unwrap(), Integrity::Fail);
	}

	#[test]
	fn empty_files_are_identical() {
		let dir = tempdir().unwrap();
		let (a, b) = (dir.path().join("a.png"), dir.path().join("b.png"));
		fs::write(&a, b"").unwrap();
		fs::write(&b, b"").unwrap();

		assert_eq!(compare_files(&a, &b, Mode::Binary).unwrap(), Integrity::Pass);
	}

	#[test]
	fn invalid_utf8_in_text_mode_is_an_error() {
		let dir = tempdir().unwrap();
		let (a, b) = (dir.path().join("a.txt"), dir.path().join("b.txt"));
		fs::write(&a, [0xFFu8, 0xFE]).unwrap();
		fs::write(&b, [0xFFu8, 0xFE]).unwrap();

		assert!(matches!(
			compare_files(&a, &b, Mode::Text),
			Err(ChunkError::TextDecode(_))
		));
	}

	#[test]
	fn missing_file_is_an_error() {
		let dir = tempdir().unwrap();
		let a = dir.path().join("a.jpg");
		fs::write(&a, b"data").unwrap();

		assert!(matches!(
			compare_files(&a, dir.path().join("nope.jpg"), Mode::Binary),
			Err(ChunkError::StreamRead(_))
		));
	}
}
