//! Application configuration

use std::{
	fs,
	num::NonZeroUsize,
	path::{Component, Path, PathBuf},
	time::Duration,
};

use cw_file_ext::{ExtensionAllowList, BINARY_EXTENSIONS, TEXT_EXTENSIONS};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Migrate;
use crate::{
	chunk::DEFAULT_CHUNK_SIZE,
	error::{ChunkError, Result},
	pipeline::PipelineOptions,
	service::watcher::{UnsupportedPolicy, VerificationPolicy, WatcherConfig},
};

pub const DEFAULT_CONFIG_FILE: &str = "chunkwatch.json";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Directory polled for new files
	pub input_dir: PathBuf,

	/// Directory receiving chunk and reassembled files
	pub output_dir: PathBuf,

	/// Characters (text) or bytes (binary) per chunk
	pub chunk_size: NonZeroUsize,

	pub poll_interval_ms: u64,

	/// Per-file processing timeout, `None` disables it
	pub file_timeout_ms: Option<u64>,

	pub text_extensions: Vec<String>,

	pub binary_extensions: Vec<String>,

	pub verification_policy: VerificationPolicy,

	pub unsupported_policy: UnsupportedPolicy,

	/// Persist the processed set here; kept in memory only when unset
	pub ledger_path: Option<PathBuf>,
}

impl AppConfig {
	/// Load configuration from a JSON file, migrating older schema versions
	pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();

		info!("Loading config from {}", path.display());
		let json = fs::read_to_string(path).map_err(|e| {
			ChunkError::Config(format!("failed to read {}: {e}", path.display()))
		})?;
		let mut config: AppConfig = serde_json::from_str(&json)
			.map_err(|e| ChunkError::Config(format!("invalid {}: {e}", path.display())))?;

		if config.version > Self::target_version() {
			return Err(ChunkError::Config(format!(
				"{} has config version {}, newer than the supported v{}",
				path.display(),
				config.version,
				Self::target_version()
			)));
		}

		if config.version < Self::target_version() {
			info!(
				"Migrating config from v{} to v{}",
				config.version,
				Self::target_version()
			);
			config.migrate()?;
			config.save(path)?;
		}

		config.validate()?;

		Ok(config)
	}

	/// Load configuration, writing the defaults first if the file does not exist
	pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();

		if path.exists() {
			Self::load_from(path)
		} else {
			warn!("No config found, creating default at {}", path.display());
			let config = Self::default();
			config.save(path)?;
			Ok(config)
		}
	}

	/// Save configuration to disk
	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| {
				ChunkError::Config(format!("failed to create {}: {e}", parent.display()))
			})?;
		}

		let json =
			serde_json::to_string_pretty(self).map_err(|e| ChunkError::Config(e.to_string()))?;
		fs::write(path, json).map_err(|e| {
			ChunkError::Config(format!("failed to write {}: {e}", path.display()))
		})?;

		info!("Saved config to {}", path.display());
		Ok(())
	}

	pub fn validate(&self) -> Result<()> {
		if self.poll_interval_ms == 0 {
			return Err(ChunkError::Config("poll_interval_ms must be positive".into()));
		}

		if self.file_timeout_ms == Some(0) {
			return Err(ChunkError::Config(
				"file_timeout_ms must be positive, or null to disable it".into(),
			));
		}

		if same_directory(&self.input_dir, &self.output_dir) {
			return Err(ChunkError::Config(
				"input_dir and output_dir must differ, chunks would be picked up as new files"
					.into(),
			));
		}

		Ok(())
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn file_timeout(&self) -> Option<Duration> {
		self.file_timeout_ms.map(Duration::from_millis)
	}

	pub fn allow_list(&self) -> ExtensionAllowList {
		ExtensionAllowList::new(&self.text_extensions, &self.binary_extensions)
	}

	pub fn pipeline_options(&self) -> PipelineOptions {
		PipelineOptions::new(&self.output_dir).with_chunk_size(self.chunk_size)
	}

	pub fn watcher_config(&self) -> WatcherConfig {
		WatcherConfig {
			input_dir: self.input_dir.clone(),
			pipeline: self.pipeline_options(),
			allow_list: self.allow_list(),
			poll_interval: self.poll_interval(),
			file_timeout: self.file_timeout(),
			verification_policy: self.verification_policy,
			unsupported_policy: self.unsupported_policy,
		}
	}
}

/// Compares resolved paths when both exist, otherwise compares them with `.` components removed
fn same_directory(a: &Path, b: &Path) -> bool {
	match (fs::canonicalize(a), fs::canonicalize(b)) {
		(Ok(a), Ok(b)) => a == b,
		_ => without_cur_dir(a) == without_cur_dir(b),
	}
}

fn without_cur_dir(path: &Path) -> PathBuf {
	path.components()
		.filter(|component| !matches!(component, Component::CurDir))
		.collect()
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			version: Self::target_version(),
			input_dir: PathBuf::from("./input"),
			output_dir: PathBuf::from("./output"),
			chunk_size: DEFAULT_CHUNK_SIZE,
			poll_interval_ms: 10_000,
			file_timeout_ms: Some(300_000),
			text_extensions: TEXT_EXTENSIONS.iter().map(ToString::to_string).collect(),
			binary_extensions: BINARY_EXTENSIONS.iter().map(ToString::to_string).collect(),
			verification_policy: VerificationPolicy::default(),
			unsupported_policy: UnsupportedPolicy::default(),
			ledger_path: None,
		}
	}
}

impl Migrate for AppConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		1 // Current schema version
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				self.version = 1;
				Ok(())
			}
			1 => Ok(()),
			v => Err(ChunkError::Config(format!("unknown config version: {v}"))),
		}
	}
}
