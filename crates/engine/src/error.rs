//! Error types for the suggestion engine.

use thiserror::Error;

/// Error type returned by fallible provider hooks.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the engine.
///
/// None of these is fatal: the worst outcome of any of them is an empty or
/// stale-looking suggestion list that the next keystroke replaces.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// A provider hook (static enumeration, refresh, configure) failed.
	#[error("provider `{provider}` failed: {source}")]
	Provider {
		provider: String,
		#[source]
		source: ProviderError,
	},

	/// No provider is registered under this name.
	#[error("unknown provider `{0}`")]
	UnknownProvider(String),

	/// A provider with this name is already registered.
	#[error("provider `{0}` is already registered")]
	DuplicateProvider(String),

	/// Drilldown attempted on a candidate whose argument hint forbids it.
	#[error("candidate `{label}` does not accept arguments")]
	InvalidDrilldown { label: String },

	/// Engine configuration could not be parsed.
	#[error("invalid engine configuration: {0}")]
	Config(#[from] toml::de::Error),
}

impl Error {
	pub(crate) fn provider(provider: &str, source: ProviderError) -> Self {
		Self::Provider {
			provider: provider.to_owned(),
			source,
		}
	}
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
