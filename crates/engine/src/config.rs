//! Engine configuration.
//!
//! Parsed from TOML text; locating and reading the file is the host's job.
//!
//! ```toml
//! suggest-timeout-ms = 2000
//!
//! [provider.shortcuts]
//! # handed verbatim to the provider named "shortcuts"
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
	/// Abandon a provider's `suggest` call after this many milliseconds.
	/// Unset means a call lives until its session is superseded.
	pub suggest_timeout_ms: Option<u64>,
	/// Per-provider sections keyed by provider name.
	pub provider: BTreeMap<String, toml::Table>,
}

impl EngineConfig {
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn suggest_timeout(&self) -> Option<Duration> {
		self.suggest_timeout_ms.map(Duration::from_millis)
	}
}
