//! Cached concatenation of every provider's static items.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use kestrel_matcher::match_score;

use crate::candidate::{Candidate, ProviderId, ScoredCandidate};
use crate::provider::ProviderRegistry;

#[derive(Debug)]
struct CatalogEntry {
	candidate: Arc<Candidate>,
	provider: ProviderId,
	lookup: String,
}

/// Static items of all providers, built on first use and replaced wholesale
/// on rebuild, so readers never see a half-built catalog.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
	entries: ArcSwapOption<Vec<CatalogEntry>>,
}

impl Catalog {
	/// Re-enumerates every provider's static items.
	///
	/// A provider whose enumeration fails contributes nothing; the others are
	/// unaffected. Returns the number of entries.
	pub(crate) fn rebuild(&self, registry: &ProviderRegistry) -> usize {
		let entries = Arc::new(collect_entries(registry));
		let count = entries.len();
		self.entries.store(Some(entries));
		tracing::debug!(count, "catalog rebuilt");
		count
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.load_full().map_or(0, |entries| entries.len())
	}

	/// Scores every entry against an already normalized query, keeping
	/// positive scores. Builds the catalog first if it has never been built.
	pub(crate) fn scan(&self, registry: &ProviderRegistry, normalized: &str) -> Vec<ScoredCandidate> {
		let entries = match self.entries.load_full() {
			Some(entries) => entries,
			None => {
				self.rebuild(registry);
				self.entries.load_full().unwrap_or_default()
			}
		};

		entries
			.iter()
			.filter_map(|entry| {
				let score = match_score(normalized, &entry.lookup);
				(score > 0.0).then(|| ScoredCandidate::new(Arc::clone(&entry.candidate), score, entry.provider.clone()))
			})
			.collect()
	}
}

fn collect_entries(registry: &ProviderRegistry) -> Vec<CatalogEntry> {
	let mut entries = Vec::new();
	for (id, provider) in registry.iter() {
		match provider.static_items() {
			Ok(items) => {
				tracing::trace!(provider = %id, count = items.len(), "enumerated static items");
				entries.extend(items.into_iter().map(|candidate| CatalogEntry {
					lookup: candidate.lookup_name(),
					candidate: Arc::new(candidate),
					provider: id.clone(),
				}));
			}
			Err(error) => {
				tracing::warn!(provider = %id, %error, "failed to enumerate static items");
			}
		}
	}
	entries
}
