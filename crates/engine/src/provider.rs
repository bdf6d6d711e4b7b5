//! Provider capability and registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kestrel_worker::GenerationToken;
use tokio::sync::mpsc::UnboundedSender;

use crate::candidate::{Candidate, IconRef, MatchMode, ProviderId};
use crate::config::EngineConfig;
use crate::error::{Error, ProviderError, Result};

/// A source of candidates, static or query-driven.
///
/// Implementations must be safe to call concurrently with other providers'
/// calls and with their own earlier, superseded `suggest` calls.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
	/// Stable identifier used to route drilldown queries and commits.
	fn name(&self) -> &str;

	/// Fallback icon for candidates that carry none.
	fn icon(&self) -> Option<IconRef> {
		None
	}

	/// Receives this provider's configuration section, if the host has one.
	fn configure(&self, _section: &toml::Table) -> std::result::Result<(), ProviderError> {
		Ok(())
	}

	/// Rebuilds provider-internal indexes before the catalog is rebuilt.
	async fn refresh(&self) -> std::result::Result<(), ProviderError> {
		Ok(())
	}

	/// Candidates available regardless of the query. May block.
	fn static_items(&self) -> std::result::Result<Vec<Candidate>, ProviderError>;

	/// Answers one query.
	///
	/// May deliver any number of batches through `sink` until the session is
	/// superseded. Batches delivered after that are dropped by the engine
	/// whether or not the provider notices.
	async fn suggest(&self, request: SuggestRequest, sink: SuggestionSink);

	/// Commits a terminal candidate this provider produced.
	fn execute(&self, candidate: &Candidate);
}

/// Query handed to a provider.
#[derive(Debug, Clone)]
pub struct SuggestRequest {
	/// The literal input text, untrimmed and in its original case.
	pub query: String,
	/// Drilldown context from the bottom of the navigation stack to the top.
	/// Empty for broadcast queries.
	pub chain: Vec<Arc<Candidate>>,
}

/// One batch on its way from a provider to the merge step.
#[derive(Debug)]
pub(crate) struct Delivery {
	pub(crate) provider: ProviderId,
	pub(crate) candidates: Vec<Candidate>,
	pub(crate) mode: MatchMode,
}

/// Per-session channel a provider delivers batches through.
#[derive(Debug, Clone)]
pub struct SuggestionSink {
	provider: ProviderId,
	token: GenerationToken,
	tx: UnboundedSender<Delivery>,
}

impl SuggestionSink {
	pub(crate) fn new(provider: ProviderId, token: GenerationToken, tx: UnboundedSender<Delivery>) -> Self {
		Self { provider, token, tx }
	}

	/// Sends one batch.
	///
	/// Returns false once the session has been superseded; the batch is
	/// dropped and the provider should stop producing.
	pub fn deliver(&self, candidates: Vec<Candidate>, mode: MatchMode) -> bool {
		if self.token.is_cancelled() {
			return false;
		}
		if candidates.is_empty() {
			return true;
		}
		self.tx
			.send(Delivery {
				provider: self.provider.clone(),
				candidates,
				mode,
			})
			.is_ok()
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Resolves once the session has been superseded.
	pub async fn cancelled(&self) {
		self.token.cancelled().await;
	}
}

/// Registered providers, in registration order, addressable by name.
#[derive(Default)]
pub struct ProviderRegistry {
	providers: Vec<(ProviderId, Arc<dyn Provider>)>,
	by_name: HashMap<ProviderId, usize>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, provider: Arc<dyn Provider>) -> Result<ProviderId> {
		let id = ProviderId::from(provider.name());
		if self.by_name.contains_key(&id) {
			return Err(Error::DuplicateProvider(id.to_string()));
		}
		tracing::debug!(provider = %id, "registered provider");
		self.by_name.insert(id.clone(), self.providers.len());
		self.providers.push((id.clone(), provider));
		Ok(id)
	}

	pub fn get(&self, id: &ProviderId) -> Option<&Arc<dyn Provider>> {
		self.by_name.get(id).map(|&idx| &self.providers[idx].1)
	}

	pub fn get_by_name(&self, name: &str) -> Option<&Arc<dyn Provider>> {
		self.get(&ProviderId::from(name))
	}

	pub fn iter(&self) -> impl Iterator<Item = (&ProviderId, &Arc<dyn Provider>)> {
		self.providers.iter().map(|(id, provider)| (id, provider))
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	/// Hands each provider its configuration section.
	///
	/// Sections naming unregistered providers are logged and skipped.
	pub fn apply_config(&self, config: &EngineConfig) -> Result<()> {
		for (name, section) in &config.provider {
			let Some(provider) = self.get_by_name(name) else {
				tracing::warn!(provider = %name, "configuration section for unknown provider");
				continue;
			};
			provider.configure(section).map_err(|source| Error::provider(name, source))?;
		}
		Ok(())
	}
}

impl std::fmt::Debug for ProviderRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.providers.iter().map(|(id, _)| id)).finish()
	}
}
