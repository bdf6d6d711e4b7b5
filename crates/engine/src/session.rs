//! One search session: provider fan-out and the merge of what comes back.
//!
//! A session owns a [`GenerationToken`]. Every provider call runs as its own
//! isolated task and writes batches into one channel; a single merge task
//! drains it, scores each batch outside the store lock and merges under it.
//! The store only accepts batches tagged with its current generation, so a
//! superseded session can never write, whether or not its providers stop.
//! Calls in flight are left to finish; only the suggest timeout cuts one short.

use std::sync::Arc;
use std::time::Duration;

use kestrel_matcher::match_score;
use kestrel_worker::{Generation, GenerationToken, TaskClass};
use tokio::sync::mpsc;

use crate::candidate::{Candidate, MatchMode, ProviderId, ScoredCandidate};
use crate::provider::{Delivery, Provider, ProviderRegistry, SuggestRequest, SuggestionSink};
use crate::store::SharedStore;

/// Which providers a session queries.
#[derive(Debug, Clone)]
pub(crate) enum SessionScope {
	/// Every registered provider, with an empty chain.
	Broadcast,
	/// Only the provider owning the top navigation frame.
	Drilldown { owner: ProviderId, chain: Vec<Arc<Candidate>> },
}

#[derive(Debug)]
pub(crate) struct SearchSession {
	pub(crate) token: GenerationToken,
	/// Literal text handed to providers.
	pub(crate) query: String,
	/// Trimmed, lower-cased text used for engine-side scoring.
	pub(crate) normalized: Arc<str>,
	pub(crate) scope: SessionScope,
}

/// Handle kept by the orchestrator for the session currently in flight.
#[derive(Debug)]
pub(crate) struct ActiveSession {
	pub(crate) token: GenerationToken,
	pub(crate) providers: Vec<ProviderId>,
}

impl ActiveSession {
	pub(crate) fn supersede(self) {
		self.token.cancel();
	}
}

impl SearchSession {
	/// Starts every provider call and the merge task, then returns at once.
	pub(crate) fn dispatch(self, registry: &ProviderRegistry, store: SharedStore, timeout: Option<Duration>) -> ActiveSession {
		let targets: Vec<(ProviderId, Arc<dyn Provider>)> = match &self.scope {
			SessionScope::Broadcast => registry.iter().map(|(id, provider)| (id.clone(), Arc::clone(provider))).collect(),
			SessionScope::Drilldown { owner, .. } => match registry.get(owner) {
				Some(provider) => vec![(owner.clone(), Arc::clone(provider))],
				None => {
					tracing::warn!(provider = %owner, "drilldown owner is not registered");
					Vec::new()
				}
			},
		};
		let chain = match self.scope {
			SessionScope::Broadcast => Vec::new(),
			SessionScope::Drilldown { chain, .. } => chain,
		};

		let generation = self.token.generation();
		tracing::debug!(%generation, query = %self.query, providers = targets.len(), depth = chain.len(), "session started");

		let (tx, rx) = mpsc::unbounded_channel();
		let mut providers = Vec::with_capacity(targets.len());
		for (id, provider) in targets {
			let request = SuggestRequest {
				query: self.query.clone(),
				chain: chain.clone(),
			};
			let sink = SuggestionSink::new(id.clone(), self.token.child(), tx.clone());
			spawn_provider_call(id.clone(), provider, request, sink, generation, timeout);
			providers.push(id);
		}
		drop(tx);

		spawn_merge(self.token.clone(), self.normalized, rx, store);

		ActiveSession {
			token: self.token,
			providers,
		}
	}
}

/// Runs one `suggest` call to completion.
///
/// Superseding the session never aborts the call: the provider sees the
/// cancellation through its sink and the store drops anything stale. Only
/// the configured timeout abandons a call.
fn spawn_provider_call(
	id: ProviderId,
	provider: Arc<dyn Provider>,
	request: SuggestRequest,
	sink: SuggestionSink,
	generation: Generation,
	timeout: Option<Duration>,
) {
	let label = format!("suggest:{id}");
	kestrel_worker::spawn_isolated(TaskClass::Provider, label, async move {
		let call = provider.suggest(request, sink);
		match timeout {
			Some(limit) => {
				if tokio::time::timeout(limit, call).await.is_err() {
					tracing::warn!(provider = %id, %generation, ?limit, "suggest timed out");
					return;
				}
			}
			None => call.await,
		}
		tracing::trace!(provider = %id, %generation, "suggest finished");
	});
}

fn spawn_merge(token: GenerationToken, normalized: Arc<str>, mut rx: mpsc::UnboundedReceiver<Delivery>, store: SharedStore) {
	kestrel_worker::spawn(TaskClass::Interactive, async move {
		let generation = token.generation();
		while let Some(Some(delivery)) = token.run_until_cancelled(rx.recv()).await {
			let batch = score_delivery(&normalized, delivery);
			if batch.is_empty() {
				continue;
			}
			if !store.merge(generation, batch) {
				break;
			}
		}
		tracing::trace!(%generation, "merge task finished");
	});
}

/// Scores one delivered batch against the normalized query.
///
/// `Any` batches score `1.0`. `Fuzzy` batches are matched on lower-cased
/// labels and lose their zero-score candidates, except under an empty query,
/// where everything scores `1.0`.
pub(crate) fn score_delivery(normalized: &str, delivery: Delivery) -> Vec<ScoredCandidate> {
	let Delivery { provider, candidates, mode } = delivery;
	candidates
		.into_iter()
		.filter_map(|candidate| {
			let score = match mode {
				MatchMode::Any => 1.0,
				MatchMode::Fuzzy if normalized.is_empty() => 1.0,
				MatchMode::Fuzzy => {
					let score = match_score(normalized, &candidate.lookup_name());
					if score <= 0.0 {
						return None;
					}
					score
				}
			};
			Some(ScoredCandidate::new(Arc::new(candidate), score, provider.clone()))
		})
		.collect()
}
