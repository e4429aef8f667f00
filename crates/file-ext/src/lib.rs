pub mod extensions;
pub mod kind;

pub use extensions::{
	extension_of, normalize_extension, ExtensionAllowList, BINARY_EXTENSIONS, TEXT_EXTENSIONS,
};
pub use kind::FileClass;
