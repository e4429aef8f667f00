//! Stores recording which source file names have already been split.
//!
//! Entries are never evicted. [`MemoryProcessedSet`] forgets everything when the process
//! exits; [`JsonLedger`] persists every insert so a restarted watcher skips finished files.

use std::{
	collections::{BTreeSet, HashSet},
	fs,
	path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::error::{ChunkError, Result};

pub trait ProcessedStore: Send + Sync + 'static {
	fn contains(&self, file_name: &str) -> bool;

	/// Records `file_name`, returning `false` if it was already present
	fn insert(&mut self, file_name: &str) -> Result<bool>;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Recorded names, sorted
	fn names(&self) -> Vec<String>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryProcessedSet {
	names: HashSet<String>,
}

impl MemoryProcessedSet {
	pub fn new() -> Self {
		Self::default()
	}
}

impl ProcessedStore for MemoryProcessedSet {
	fn contains(&self, file_name: &str) -> bool {
		self.names.contains(file_name)
	}

	fn insert(&mut self, file_name: &str) -> Result<bool> {
		Ok(self.names.insert(file_name.to_string()))
	}

	fn len(&self) -> usize {
		self.names.len()
	}

	fn names(&self) -> Vec<String> {
		let mut names = self.names.iter().cloned().collect::<Vec<_>>();
		names.sort();
		names
	}
}

/// Processed set persisted as a JSON array of file names.
///
/// The ledger file is rewritten through a temporary sibling and a rename on every new entry,
/// so a crash leaves either the old or the new list on disk.
#[derive(Debug)]
pub struct JsonLedger {
	path: PathBuf,
	names: BTreeSet<String>,
}

impl JsonLedger {
	/// Opens the ledger at `path`, starting empty if the file does not exist yet
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();

		let names = match fs::read(&path) {
			Ok(bytes) => serde_json::from_slice::<BTreeSet<String>>(&bytes).map_err(|e| {
				ChunkError::Ledger(format!("corrupted ledger at {}: {e}", path.display()))
			})?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!("No ledger at {}, starting empty", path.display());
				BTreeSet::new()
			}
			Err(e) => {
				return Err(ChunkError::Ledger(format!(
					"failed to read {}: {e}",
					path.display()
				)))
			}
		};

		info!(
			"Opened processed ledger at {} with {} entries",
			path.display(),
			names.len()
		);

		Ok(Self { path, names })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist(&self) -> Result<()> {
		let ledger_err =
			|e: std::io::Error| ChunkError::Ledger(format!("{}: {e}", self.path.display()));

		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).map_err(ledger_err)?;
		}

		let json = serde_json::to_vec_pretty(&self.names)
			.map_err(|e| ChunkError::Ledger(e.to_string()))?;

		let tmp_path = self.path.with_extension("tmp");
		fs::write(&tmp_path, json).map_err(ledger_err)?;
		fs::rename(&tmp_path, &self.path).map_err(ledger_err)
	}
}

impl ProcessedStore for JsonLedger {
	fn contains(&self, file_name: &str) -> bool {
		self.names.contains(file_name)
	}

	fn insert(&mut self, file_name: &str) -> Result<bool> {
		if !self.names.insert(file_name.to_string()) {
			return Ok(false);
		}

		if let Err(e) = self.persist() {
			// Keep memory and disk in agreement
			self.names.remove(file_name);
			return Err(e);
		}

		Ok(true)
	}

	fn len(&self) -> usize {
		self.names.len()
	}

	fn names(&self) -> Vec<String> {
		self.names.iter().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use tempfile::tempdir;

	#[test]
	fn memory_set_deduplicates() {
		let mut set = MemoryProcessedSet::new();

		assert!(set.insert("b.txt").unwrap());
		assert!(set.insert("a.pdf").unwrap());
		assert!(!set.insert("b.txt").unwrap());

		assert!(set.contains("a.pdf"));
		assert!(!set.contains("c.png"));
		assert_eq!(set.names(), vec!["a.pdf", "b.txt"]);
	}

	#[test]
	fn ledger_survives_reopen() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("state").join("processed.json");

		{
			let mut ledger = JsonLedger::open(&path).unwrap();
			assert!(ledger.is_empty());
			ledger.insert("report.csv").unwrap();
			ledger.insert("photo.jpg").unwrap();
		}

		let ledger = JsonLedger::open(&path).unwrap();
		assert_eq!(ledger.names(), vec!["photo.jpg", "report.csv"]);
		assert!(!path.with_extension("tmp").exists());
	}

	#[test]
	fn corrupted_ledger_is_rejected() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("processed.json");
		fs::write(&path, "{ not a list").unwrap();

		assert!(matches!(JsonLedger::open(&path), Err(ChunkError::Ledger(_))));
	}
}
