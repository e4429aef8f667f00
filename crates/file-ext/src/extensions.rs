//! Extension allow-lists used to pick a chunking pipeline.
//!
//! Extensions are stored normalized: lowercase with a single leading dot, the same shape
//! `<base>-chunk-<i><ext>` file names are built from. A file without an extension has the
//! empty extension `""` and is never supported.

use std::{collections::HashSet, ffi::OsStr, path::Path};

use serde::{Deserialize, Serialize};

use crate::kind::FileClass;

/// Extensions split through the text pipeline by default
pub const TEXT_EXTENSIONS: &[&str] = &[
	".txt", ".json", ".csv", ".html", ".xml", ".md", ".js", ".css",
];

/// Extensions split through the binary pipeline by default
pub const BINARY_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".gif"];

/// Lowercases an extension and makes sure it carries exactly one leading dot.
///
/// An empty input stays empty.
pub fn normalize_extension(extension: &str) -> String {
	let trimmed = extension.trim().trim_start_matches('.');
	if trimmed.is_empty() {
		String::new()
	} else {
		format!(".{}", trimmed.to_ascii_lowercase())
	}
}

/// Returns the extension of `path` with its leading dot and original casing, or `""`.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(path: impl AsRef<Path>) -> String {
	path.as_ref()
		.extension()
		.and_then(OsStr::to_str)
		.map(|ext| format!(".{ext}"))
		.unwrap_or_default()
}

fn normalize_all<I>(extensions: I) -> HashSet<String>
where
	I: IntoIterator,
	I::Item: AsRef<str>,
{
	extensions
		.into_iter()
		.map(|ext| normalize_extension(ext.as_ref()))
		.filter(|ext| !ext.is_empty())
		.collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAllowList {
	text: HashSet<String>,
	binary: HashSet<String>,
}

impl ExtensionAllowList {
	pub fn new<T, B>(text: T, binary: B) -> Self
	where
		T: IntoIterator,
		T::Item: AsRef<str>,
		B: IntoIterator,
		B::Item: AsRef<str>,
	{
		Self {
			text: normalize_all(text),
			binary: normalize_all(binary),
		}
	}

	/// Classifies an extension (with or without its dot, any casing).
	///
	/// An extension present in both lists is treated as text.
	pub fn classify(&self, extension: &str) -> FileClass {
		let extension = normalize_extension(extension);

		if self.text.contains(&extension) {
			FileClass::Text
		} else if self.binary.contains(&extension) {
			FileClass::Binary
		} else {
			FileClass::Unsupported
		}
	}

	pub fn classify_path(&self, path: impl AsRef<Path>) -> FileClass {
		self.classify(&extension_of(path))
	}

	pub fn text_extensions(&self) -> impl Iterator<Item = &str> {
		self.text.iter().map(String::as_str)
	}

	pub fn binary_extensions(&self) -> impl Iterator<Item = &str> {
		self.binary.iter().map(String::as_str)
	}
}

impl Default for ExtensionAllowList {
	fn default() -> Self {
		Self::new(TEXT_EXTENSIONS, BINARY_EXTENSIONS)
	}
}
