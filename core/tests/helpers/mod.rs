//! Test helper modules for integration tests

#![allow(dead_code)]

use std::{
	num::NonZeroUsize,
	path::{Path, PathBuf},
	time::Duration,
};

use cw_core::{PipelineOptions, WatcherConfig};
use tempfile::TempDir;

/// Scratch input and output directories under one temporary root
pub struct TestDirs {
	_root: TempDir,
	pub input: PathBuf,
	pub output: PathBuf,
}

impl TestDirs {
	pub fn new() -> Self {
		let root = TempDir::new().unwrap();
		let input = root.path().join("input");
		let output = root.path().join("output");
		std::fs::create_dir_all(&input).unwrap();

		Self {
			_root: root,
			input,
			output,
		}
	}

	pub fn write_input(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
		let path = self.input.join(name);
		std::fs::write(&path, contents).unwrap();
		path
	}

	pub fn output_path(&self, name: &str) -> PathBuf {
		self.output.join(name)
	}

	pub fn options(&self, chunk_size: usize) -> PipelineOptions {
		PipelineOptions::new(&self.output).with_chunk_size(size(chunk_size))
	}

	pub fn watcher_config(&self, chunk_size: usize) -> WatcherConfig {
		let mut config = WatcherConfig::new(&self.input, &self.output);
		config.pipeline.chunk_size = size(chunk_size);
		config.poll_interval = Duration::from_millis(25);
		config
	}

	/// Output file names, sorted
	pub fn output_names(&self) -> Vec<String> {
		list_names(&self.output)
	}
}

pub fn size(n: usize) -> NonZeroUsize {
	NonZeroUsize::new(n).unwrap()
}

/// Deterministic, non-repeating looking bytes
pub fn pseudo_random_bytes(len: usize) -> Vec<u8> {
	let mut state = 0x2545_F491_u32;
	(0..len)
		.map(|_| {
			state ^= state << 13;
			state ^= state >> 17;
			state ^= state << 5;
			(state >> 24) as u8
		})
		.collect()
}

fn list_names(dir: &Path) -> Vec<String> {
	let mut names = std::fs::read_dir(dir)
		.map(|entries| {
			entries
				.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();
	names.sort();
	names
}
