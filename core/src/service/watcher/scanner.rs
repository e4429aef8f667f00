use std::{
	collections::{HashMap, HashSet},
	fmt,
	path::{Path, PathBuf},
};

use tokio::{fs, task::JoinHandle, time::timeout};
use tracing::{debug, error, info, trace, warn};

use crate::{
	chunk::Mode,
	error::{ChunkError, FileIOError, Result},
	pipeline::{process_file, ProcessOutcome},
	processed::ProcessedStore,
};

use super::{UnsupportedPolicy, VerificationPolicy, WatcherConfig};

/// What a single scan did, by file name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
	/// Newly recorded in the processed set
	pub processed: Vec<String>,
	/// Splitting failed; left out of the processed set
	pub failed: Vec<String>,
	/// Split, but verification reported Fail or could not run
	pub verification_failed: Vec<String>,
	pub unsupported: Vec<String>,
	/// Still running from an earlier timeout
	pub in_flight: Vec<String>,
}

impl ScanReport {
	/// True when the scan found nothing to do
	pub fn is_idle(&self) -> bool {
		self.processed.is_empty()
			&& self.failed.is_empty()
			&& self.verification_failed.is_empty()
			&& self.unsupported.is_empty()
			&& self.in_flight.is_empty()
	}
}

impl fmt::Display for ScanReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} processed, {} failed, {} failed verification, {} unsupported, {} in flight",
			self.processed.len(),
			self.failed.len(),
			self.verification_failed.len(),
			self.unsupported.len(),
			self.in_flight.len()
		)
	}
}

/// One tick of the directory watcher.
///
/// Owns the processed store and is its only writer. Files are processed one after another on
/// the blocking pool; chunk order within a file is fixed by the pipelines.
pub struct Scanner {
	config: WatcherConfig,
	store: Box<dyn ProcessedStore>,
	in_flight: HashMap<String, JoinHandle<Result<ProcessOutcome>>>,
	reported_unsupported: HashSet<String>,
}

impl Scanner {
	pub fn new(config: WatcherConfig, store: impl ProcessedStore) -> Self {
		Self {
			config,
			store: Box::new(store),
			in_flight: HashMap::new(),
			reported_unsupported: HashSet::new(),
		}
	}

	pub fn config(&self) -> &WatcherConfig {
		&self.config
	}

	pub fn store(&self) -> &dyn ProcessedStore {
		self.store.as_ref()
	}

	pub fn in_flight(&self) -> impl Iterator<Item = &str> {
		self.in_flight.keys().map(String::as_str)
	}

	/// Lists the input directory and processes every name not yet recorded.
	///
	/// A directory listing failure abandons the scan with [`ChunkError::DirectoryRead`];
	/// per-file failures are logged and reported but never stop the scan.
	pub async fn scan(&mut self) -> Result<ScanReport> {
		let mut report = ScanReport::default();

		self.collect_finished(&mut report).await;

		for (file_name, path) in self.list_input().await? {
			if self.store.contains(&file_name) {
				trace!("Skipping already processed {file_name}");
				continue;
			}

			if self.in_flight.contains_key(&file_name) {
				debug!("{file_name} is still being processed");
				report.in_flight.push(file_name);
				continue;
			}

			let class = self.config.allow_list.classify_path(&path);
			let Some(mode) = Mode::from_class(class) else {
				self.report_unsupported(&path, &file_name);
				report.unsupported.push(file_name);
				continue;
			};

			self.dispatch(file_name, path, mode, &mut report).await;
		}

		Ok(report)
	}

	async fn list_input(&self) -> Result<Vec<(String, PathBuf)>> {
		let input_dir = &self.config.input_dir;
		let read_err = |e| ChunkError::DirectoryRead(FileIOError::new(input_dir, e));

		let mut entries = fs::read_dir(input_dir).await.map_err(read_err)?;
		let mut files = Vec::new();

		while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
			let path = entry.path();

			match fs::metadata(&path).await {
				Ok(metadata) if metadata.is_file() => {}
				Ok(_) => {
					trace!("Ignoring non-file entry {}", path.display());
					continue;
				}
				Err(e) => {
					warn!("Failed to stat {}: {e}", path.display());
					continue;
				}
			}

			match entry.file_name().into_string() {
				Ok(file_name) => files.push((file_name, path)),
				Err(raw) => warn!("Ignoring non UTF-8 file name {raw:?}"),
			}
		}

		files.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

		Ok(files)
	}

	fn report_unsupported(&mut self, path: &Path, file_name: &str) {
		let first_sighting = self.reported_unsupported.insert(file_name.to_string());

		if first_sighting || self.config.unsupported_policy == UnsupportedPolicy::RetryEveryScan {
			let err = ChunkError::UnsupportedExtension {
				path: path.to_path_buf(),
				extension: cw_file_ext::extension_of(path),
			};
			warn!("Skipping file: {err}");
		}
	}

	async fn dispatch(
		&mut self,
		file_name: String,
		path: PathBuf,
		mode: Mode,
		report: &mut ScanReport,
	) {
		debug!("Processing {} as {mode}", path.display());

		let options = self.config.pipeline.clone();
		let task_path = path.clone();
		let mut handle =
			tokio::task::spawn_blocking(move || process_file(&task_path, mode, &options));

		let joined = match self.config.file_timeout {
			Some(limit) => match timeout(limit, &mut handle).await {
				Ok(joined) => joined,
				Err(_) => {
					warn!(
						"{}, leaving it running in the background",
						ChunkError::Timeout {
							path,
							timeout: limit
						}
					);
					report.in_flight.push(file_name.clone());
					self.in_flight.insert(file_name, handle);
					return;
				}
			},
			None => (&mut handle).await,
		};

		self.complete(file_name, flatten(joined), report);
	}

	async fn collect_finished(&mut self, report: &mut ScanReport) {
		let finished = self
			.in_flight
			.iter()
			.filter(|(_, handle)| handle.is_finished())
			.map(|(file_name, _)| file_name.clone())
			.collect::<Vec<_>>();

		for file_name in finished {
			if let Some(handle) = self.in_flight.remove(&file_name) {
				info!("Collecting late result for {file_name}");
				let joined = handle.await;
				self.complete(file_name, flatten(joined), report);
			}
		}
	}

	fn complete(
		&mut self,
		file_name: String,
		result: Result<ProcessOutcome>,
		report: &mut ScanReport,
	) {
		let outcome = match result {
			Ok(outcome) => outcome,
			Err(e) => {
				error!("Failed to process {file_name}: {e:#}");
				report.failed.push(file_name);
				return;
			}
		};

		let passed = outcome.passed();
		if !passed {
			report.verification_failed.push(file_name.clone());
		}

		if !passed && self.config.verification_policy == VerificationPolicy::Gate {
			warn!("{file_name} did not pass verification, it will be retried on the next scan");
			return;
		}

		match self.store.insert(&file_name) {
			Ok(_) => {
				info!(
					"Finished {file_name}: {} {} chunks",
					outcome.chunks.len(),
					outcome.mode
				);
				report.processed.push(file_name);
			}
			Err(e) => {
				error!("Failed to record {file_name} as processed: {e:#}");
				report.failed.push(file_name);
			}
		}
	}
}

fn flatten(
	joined: std::result::Result<Result<ProcessOutcome>, tokio::task::JoinError>,
) -> Result<ProcessOutcome> {
	joined.map_err(ChunkError::from).and_then(|res| res)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::processed::MemoryProcessedSet;
	use pretty_assertions::assert_eq;
	use std::num::NonZeroUsize;
	use tempfile::tempdir;

	fn scanner_for(root: &Path) -> Scanner {
		let mut config = WatcherConfig::new(root.join("input"), root.join("output"));
		config.pipeline.chunk_size = NonZeroUsize::new(4).unwrap();
		std::fs::create_dir_all(&config.input_dir).unwrap();

		Scanner::new(config, MemoryProcessedSet::new())
	}

	#[tokio::test]
	async fn processes_each_file_once() {
		let dir = tempdir().unwrap();
		let mut scanner = scanner_for(dir.path());
		std::fs::write(dir.path().join("input/a.txt"), "hello world").unwrap();
		std::fs::write(dir.path().join("input/b.png"), [1u8, 2, 3, 4, 5]).unwrap();

		let first = scanner.scan().await.unwrap();
		assert_eq!(first.processed, vec!["a.txt", "b.png"]);

		let second = scanner.scan().await.unwrap();
		assert!(second.is_idle());
		assert_eq!(scanner.store().len(), 2);
	}

	#[tokio::test]
	async fn subdirectories_are_ignored() {
		let dir = tempdir().unwrap();
		let mut scanner = scanner_for(dir.path());
		std::fs::create_dir(dir.path().join("input/nested.txt")).unwrap();

		assert!(scanner.scan().await.unwrap().is_idle());
	}

	#[tokio::test]
	async fn failed_file_is_not_recorded() {
		let dir = tempdir().unwrap();
		let mut scanner = scanner_for(dir.path());
		std::fs::write(dir.path().join("input/bad.txt"), [0xC3u8, 0x28]).unwrap();

		let report = scanner.scan().await.unwrap();

		assert_eq!(report.failed, vec!["bad.txt"]);
		assert!(!scanner.store().contains("bad.txt"));
	}
}
