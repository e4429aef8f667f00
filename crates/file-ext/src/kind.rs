//! Which pipeline, if any, a file is split through
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
	Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileClass {
	// Decoded as UTF-8 and split by character count
	Text,
	// Streamed and split by byte count
	Binary,
	// In neither allow-list, never chunked
	Unsupported,
}
