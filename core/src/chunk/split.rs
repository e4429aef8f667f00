use std::{iter::FusedIterator, num::NonZeroUsize};

use super::ChunkSpan;

/// Splits `content` into pieces of `chunk_size` characters, the last one holding the remainder.
///
/// Empty input yields no chunks.
pub fn split_text(content: &str, chunk_size: NonZeroUsize) -> Vec<&str> {
	TextChunks::new(content, chunk_size)
		.map(|(_, chunk)| chunk)
		.collect()
}

/// Lazy character-count splitter over a borrowed string.
///
/// Yields each chunk together with its byte span inside the source string, so boundaries
/// always fall on `char` boundaries.
#[derive(Debug, Clone)]
pub struct TextChunks<'a> {
	rest: &'a str,
	offset: usize,
	chunk_size: NonZeroUsize,
}

impl<'a> TextChunks<'a> {
	pub fn new(content: &'a str, chunk_size: NonZeroUsize) -> Self {
		Self {
			rest: content,
			offset: 0,
			chunk_size,
		}
	}
}

impl<'a> Iterator for TextChunks<'a> {
	type Item = (ChunkSpan, &'a str);

	fn next(&mut self) -> Option<Self::Item> {
		if self.rest.is_empty() {
			return None;
		}

		let split_at = self
			.rest
			.char_indices()
			.nth(self.chunk_size.get())
			.map_or(self.rest.len(), |(byte_idx, _)| byte_idx);

		let (chunk, rest) = self.rest.split_at(split_at);
		let span = ChunkSpan {
			start: self.offset as u64,
			end: (self.offset + chunk.len()) as u64,
		};

		self.rest = rest;
		self.offset += chunk.len();

		Some((span, chunk))
	}
}

impl FusedIterator for TextChunks<'_> {}
