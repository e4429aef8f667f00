//! Polling Directory Watcher
//!
//! ## Architecture
//!
//! - **DirectoryWatcher**: the [`Service`] owning the poll loop; ticks on a fixed interval and
//!   stops through a cancellation token
//! - **Scanner**: one tick of work; lists the input directory, classifies new names and runs
//!   them through the pipelines one file at a time
//! - **ProcessedStore**: injected record of finished names, see [`crate::processed`]
//!
//! A file that outlives the per-file timeout keeps running on the blocking pool. The scanner
//! skips it while it is in flight and collects its outcome on a later tick, so a stalled file
//! never holds back the next poll.

use std::{
	path::PathBuf,
	sync::{Arc, Mutex, PoisonError},
	time::Duration,
};

use cw_file_ext::ExtensionAllowList;
use serde::{Deserialize, Serialize};
use tokio::{
	sync::Mutex as AsyncMutex,
	task::JoinHandle,
	time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
	error::{ChunkError, FileIOError, Result},
	pipeline::PipelineOptions,
	processed::ProcessedStore,
	service::Service,
};

mod scanner;

pub use scanner::{ScanReport, Scanner};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// What a failed integrity check means for the processed set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationPolicy {
	/// Mark the file processed once splitting completes, whatever the check reported
	#[default]
	Informational,
	/// Only a passing check marks the file processed; anything else is retried next scan
	Gate,
}

/// How files with an extension in neither allow-list are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnsupportedPolicy {
	/// Report a name the first time it is seen, then skip it quietly
	#[default]
	ReportOnce,
	/// Report the name again on every scan
	RetryEveryScan,
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
	pub input_dir: PathBuf,
	pub pipeline: PipelineOptions,
	pub allow_list: ExtensionAllowList,
	pub poll_interval: Duration,
	/// Longest a single file may hold up a scan, `None` waits forever
	pub file_timeout: Option<Duration>,
	pub verification_policy: VerificationPolicy,
	pub unsupported_policy: UnsupportedPolicy,
}

impl WatcherConfig {
	pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
		Self {
			input_dir: input_dir.into(),
			pipeline: PipelineOptions::new(output_dir),
			allow_list: ExtensionAllowList::default(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			file_timeout: Some(Duration::from_secs(300)),
			verification_policy: VerificationPolicy::default(),
			unsupported_policy: UnsupportedPolicy::default(),
		}
	}
}

struct RunningLoop {
	cancel: CancellationToken,
	handle: JoinHandle<()>,
}

/// Polls the input directory on a fixed interval and feeds new files to the pipelines
pub struct DirectoryWatcher {
	scanner: Arc<AsyncMutex<Scanner>>,
	poll_interval: Duration,
	running: Mutex<Option<RunningLoop>>,
}

impl DirectoryWatcher {
	pub fn new(config: WatcherConfig, store: impl ProcessedStore) -> Self {
		let poll_interval = config.poll_interval;

		Self {
			scanner: Arc::new(AsyncMutex::new(Scanner::new(config, store))),
			poll_interval,
			running: Mutex::new(None),
		}
	}

	/// Shared handle to the scanner, for running ad-hoc scans or inspecting the processed set
	pub fn scanner(&self) -> Arc<AsyncMutex<Scanner>> {
		Arc::clone(&self.scanner)
	}

	/// Runs a single scan outside the poll loop
	pub async fn scan_now(&self) -> Result<ScanReport> {
		self.scanner.lock().await.scan().await
	}

	async fn run(
		scanner: Arc<AsyncMutex<Scanner>>,
		poll_interval: Duration,
		cancel: CancellationToken,
	) {
		let mut ticker = interval(poll_interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				_ = cancel.cancelled() => break,
				_ = ticker.tick() => {}
			}

			let mut scanner = scanner.lock().await;

			tokio::select! {
				biased;

				_ = cancel.cancelled() => {
					debug!("Watcher stopped in the middle of a scan");
					break;
				}

				res = scanner.scan() => match res {
					Ok(report) if !report.is_idle() => info!("Scan finished: {report}"),
					Ok(_) => debug!("Scan finished, nothing new"),
					// Abandon this tick, the next one retries
					Err(e) => error!("{e:#}"),
				}
			}
		}
	}

	fn running(&self) -> std::sync::MutexGuard<'_, Option<RunningLoop>> {
		self.running.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[async_trait::async_trait]
impl Service for DirectoryWatcher {
	async fn start(&self) -> Result<()> {
		if self.is_running() {
			return Err(ChunkError::AlreadyRunning);
		}

		let (input_dir, output_dir) = {
			let scanner = self.scanner.lock().await;
			let config = scanner.config();
			(config.input_dir.clone(), config.pipeline.output_dir.clone())
		};

		tokio::fs::create_dir_all(&output_dir).await.map_err(|e| {
			ChunkError::Write(FileIOError::with_context(
				&output_dir,
				e,
				"creating output directory",
			))
		})?;

		let mut running = self.running();
		if running.is_some() {
			return Err(ChunkError::AlreadyRunning);
		}

		let cancel = CancellationToken::new();
		let handle = tokio::spawn(Self::run(
			self.scanner(),
			self.poll_interval,
			cancel.clone(),
		));

		*running = Some(RunningLoop { cancel, handle });

		info!(
			"Watching {} every {:?}, writing chunks to {}",
			input_dir.display(),
			self.poll_interval,
			output_dir.display()
		);

		Ok(())
	}

	async fn stop(&self) -> Result<()> {
		let taken = self.running().take();
		let RunningLoop { cancel, handle } = taken.ok_or(ChunkError::NotRunning)?;

		cancel.cancel();
		handle.await?;

		info!("Directory watcher stopped");

		Ok(())
	}

	fn is_running(&self) -> bool {
		self.running().is_some()
	}

	fn name(&self) -> &'static str {
		"directory_watcher"
	}
}
