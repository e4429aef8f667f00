//! Error types shared by the pipelines, the processed store and the watcher

use std::{fmt::Display, path::Path, path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::error;

/// Report an error with tracing
pub fn report_error(res: &std::result::Result<(), impl Display>) {
	if let Err(e) = res {
		error!("{e:#}");
	}
}

/// File I/O error that includes the path that caused the error
#[derive(Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	pub maybe_context: Option<&'static str>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "file I/O error")?;
		if let Some(ctx) = self.maybe_context {
			write!(f, " ({ctx})")?;
		}
		write!(f, ": {}; path: '{}'", self.source, self.path.display())
	}
}

impl FileIOError {
	pub fn new(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}

	pub fn with_context(
		path: impl AsRef<Path>,
		source: std::io::Error,
		context: &'static str,
	) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(context),
		}
	}
}

#[derive(Error, Debug)]
pub enum ChunkError {
	/// The input directory could not be listed; the scan is abandoned for this tick
	#[error("failed to read input directory: {0}")]
	DirectoryRead(#[source] FileIOError),

	#[error("unsupported file extension '{extension}' for {}", .path.display())]
	UnsupportedExtension { path: PathBuf, extension: String },

	/// Reading the source failed part way; chunks already written stay on disk
	#[error("failed to read source stream: {0}")]
	StreamRead(#[source] FileIOError),

	#[error("failed to write: {0}")]
	Write(#[source] FileIOError),

	#[error("chunk {index} is missing at {}", .path.display())]
	MissingChunk { index: usize, path: PathBuf },

	#[error("failed to read chunk: {0}")]
	ChunkRead(#[source] FileIOError),

	#[error("{} is not valid UTF-8 text", .0.display())]
	TextDecode(PathBuf),

	#[error("configuration error: {0}")]
	Config(String),

	#[error("processed ledger error: {0}")]
	Ledger(String),

	#[error("processing {} exceeded {timeout:?}", .path.display())]
	Timeout { path: PathBuf, timeout: Duration },

	#[error("processing task failed: {0}")]
	TaskJoin(#[from] tokio::task::JoinError),

	#[error("watcher is already running")]
	AlreadyRunning,

	#[error("watcher is not running")]
	NotRunning,
}

impl ChunkError {
	/// Maps a read failure on a source file, turning invalid UTF-8 into [`ChunkError::TextDecode`]
	pub(crate) fn from_source_read(path: &Path, source: std::io::Error) -> Self {
		if source.kind() == std::io::ErrorKind::InvalidData {
			Self::TextDecode(path.to_path_buf())
		} else {
			Self::StreamRead(FileIOError::new(path, source))
		}
	}
}

pub type Result<T> = std::result::Result<T, ChunkError>;
