use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cw_core::{
	error::report_error, pipeline::process_file, verify::verify_on_disk, AppConfig, ChunkError,
	DirectoryWatcher, Integrity, JsonLedger, MemoryProcessedSet, Mode, ProcessedStore, Service,
};
use tracing::{info, warn};

/// Config file location plus command line overrides applied on top of it
#[derive(Debug, Clone)]
pub struct Overrides {
	pub config: PathBuf,
	pub input: Option<PathBuf>,
	pub output: Option<PathBuf>,
}

impl Overrides {
	pub fn resolve(&self) -> Result<AppConfig> {
		let mut config = AppConfig::load_or_create(&self.config)
			.with_context(|| format!("loading {}", self.config.display()))?;

		if let Some(input) = &self.input {
			config.input_dir = input.clone();
		}
		if let Some(output) = &self.output {
			config.output_dir = output.clone();
		}

		config.validate()?;
		Ok(config)
	}
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
	if path.exists() && !force {
		bail!(
			"{} already exists, pass --force to overwrite it",
			path.display()
		);
	}

	AppConfig::default().save(path)?;
	println!("Wrote default config to {}", path.display());

	Ok(())
}

pub async fn watch(config: &AppConfig) -> Result<()> {
	match &config.ledger_path {
		Some(ledger_path) => run_watcher(config, JsonLedger::open(ledger_path)?).await,
		None => run_watcher(config, MemoryProcessedSet::new()).await,
	}
}

async fn run_watcher(config: &AppConfig, store: impl ProcessedStore) -> Result<()> {
	if !config.input_dir.is_dir() {
		warn!(
			"Input directory {} does not exist yet, scans will fail until it does",
			config.input_dir.display()
		);
	}

	let allow_list = config.allow_list();
	info!(
		"Text extensions: {}; binary extensions: {}",
		sorted_list(allow_list.text_extensions()),
		sorted_list(allow_list.binary_extensions())
	);

	let watcher = DirectoryWatcher::new(config.watcher_config(), store);
	watcher.start().await?;

	tokio::signal::ctrl_c()
		.await
		.context("failed to listen for Ctrl+C")?;

	info!("Shutting down {}", watcher.name());
	report_error(&watcher.stop().await);

	let processed = watcher.scanner().lock().await.store().len();
	println!("Processed {processed} files");

	Ok(())
}

pub fn split(config: &AppConfig, file: &Path, mode: Option<Mode>) -> Result<()> {
	let mode = resolve_mode(config, file, mode)?;
	let outcome = process_file(file, mode, &config.pipeline_options())?;

	println!(
		"Split {} into {} {} chunks in {}",
		outcome.file_name,
		outcome.chunks.len(),
		outcome.mode,
		config.output_dir.display()
	);

	match outcome.verification {
		Ok(Integrity::Pass) => {
			println!("Integrity: Pass");
			Ok(())
		}
		Ok(Integrity::Fail) => bail!("integrity check failed for {}", outcome.file_name),
		Err(e) => Err(e).context("verification could not run"),
	}
}

pub fn verify(config: &AppConfig, file: &Path, mode: Option<Mode>) -> Result<()> {
	let mode = resolve_mode(config, file, mode)?;
	let (reassembled, integrity) = verify_on_disk(file, mode, &config.pipeline_options())?;

	println!("Reassembled into {}", reassembled.display());
	println!("Integrity: {integrity}");

	if !integrity.is_pass() {
		bail!("{} does not match its chunks", file.display());
	}

	Ok(())
}

fn sorted_list<'a>(extensions: impl Iterator<Item = &'a str>) -> String {
	let mut extensions = extensions.collect::<Vec<_>>();
	extensions.sort_unstable();
	extensions.join(" ")
}

/// Explicit mode wins, otherwise the extension decides
fn resolve_mode(config: &AppConfig, file: &Path, mode: Option<Mode>) -> Result<Mode> {
	if let Some(mode) = mode {
		return Ok(mode);
	}

	let class = config.allow_list().classify_path(file);
	Mode::from_class(class).ok_or_else(|| {
		ChunkError::UnsupportedExtension {
			path: file.to_path_buf(),
			extension: cw_file_ext::extension_of(file),
		}
		.into()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use tempfile::tempdir;

	#[test]
	fn mode_follows_extension_unless_forced() {
		let config = AppConfig::default();

		assert_eq!(
			resolve_mode(&config, Path::new("notes.TXT"), None).unwrap(),
			Mode::Text
		);
		assert_eq!(
			resolve_mode(&config, Path::new("photo.jpg"), None).unwrap(),
			Mode::Binary
		);
		assert_eq!(
			resolve_mode(&config, Path::new("archive.zip"), Some(Mode::Binary)).unwrap(),
			Mode::Binary
		);
		assert!(resolve_mode(&config, Path::new("archive.zip"), None).is_err());
	}

	#[test]
	fn extension_lists_print_sorted() {
		let allow_list = AppConfig::default().allow_list();

		assert_eq!(
			sorted_list(allow_list.binary_extensions()),
			".gif .jpeg .jpg .pdf .png"
		);
	}

	#[test]
	fn overrides_replace_configured_directories() {
		let tmp = tempdir().unwrap();
		let dir = tmp.path();
		let overrides = Overrides {
			config: dir.join("chunkwatch.json"),
			input: Some(dir.join("in")),
			output: Some(dir.join("out")),
		};

		let config = overrides.resolve().unwrap();

		assert_eq!(config.input_dir, dir.join("in"));
		assert_eq!(config.output_dir, dir.join("out"));
		// The file on disk keeps its defaults
		assert_eq!(
			AppConfig::load_from(dir.join("chunkwatch.json")).unwrap(),
			AppConfig::default()
		);
	}

	#[test]
	fn init_config_refuses_to_overwrite() {
		let tmp = tempdir().unwrap();
		let dir = tmp.path();
		let path = dir.join("chunkwatch.json");

		init_config(&path, false).unwrap();
		assert!(init_config(&path, false).is_err());
		init_config(&path, true).unwrap();
	}

	#[test]
	fn split_then_verify_text_file() {
		let tmp = tempdir().unwrap();
		let dir = tmp.path();
		let source = dir.join("notes.md");
		std::fs::write(&source, "# heading\n\nbody text\n").unwrap();

		let config = AppConfig {
			input_dir: dir.to_path_buf(),
			output_dir: dir.join("out"),
			chunk_size: std::num::NonZeroUsize::new(5).unwrap(),
			..AppConfig::default()
		};

		split(&config, &source, None).unwrap();
		verify(&config, &source, None).unwrap();
		assert!(dir.join("out").join("notes-concatenated.md").exists());
	}
}
