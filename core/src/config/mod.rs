//! Application configuration management

pub mod app_config;

pub use app_config::AppConfig;

use crate::error::Result;

/// Schema migrations for versioned configuration files
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	fn migrate(&mut self) -> Result<()>;
}
