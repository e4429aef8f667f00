use std::{
	io::{self, Read},
	iter::FusedIterator,
	num::NonZeroUsize,
};

/// Reads a stream in fixed-size byte windows.
///
/// Every window is exactly `window` bytes long except the final one, which holds whatever is
/// left. Short reads from the underlying reader are retried until the window is full or the
/// stream ends, so window boundaries only depend on the stream offset. The sequence is finite
/// and can not be restarted: the reader is consumed as windows are pulled, and iteration stops
/// after the first error.
#[derive(Debug)]
pub struct ByteWindows<R> {
	reader: R,
	window: NonZeroUsize,
	done: bool,
}

impl<R: Read> ByteWindows<R> {
	pub fn new(reader: R, window: NonZeroUsize) -> Self {
		Self {
			reader,
			window,
			done: false,
		}
	}

	fn fill(&mut self) -> io::Result<Vec<u8>> {
		let mut buf = vec![0u8; self.window.get()];
		let mut filled = 0;

		while filled < buf.len() {
			match self.reader.read(&mut buf[filled..]) {
				Ok(0) => break,
				Ok(n) => filled += n,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e),
			}
		}

		buf.truncate(filled);
		Ok(buf)
	}
}

impl<R: Read> Iterator for ByteWindows<R> {
	type Item = io::Result<Vec<u8>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		match self.fill() {
			Ok(buf) if buf.is_empty() => {
				self.done = true;
				None
			}
			Ok(buf) => {
				// A short window means the stream hit EOF
				self.done = buf.len() < self.window.get();
				Some(Ok(buf))
			}
			Err(e) => {
				self.done = true;
				Some(Err(e))
			}
		}
	}
}

impl<R: Read> FusedIterator for ByteWindows<R> {}
