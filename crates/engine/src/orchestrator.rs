//! Input handling: local catalog matching, session lifecycle and drilldown.

use std::sync::Arc;
use std::time::Duration;

use kestrel_worker::{Generation, GenerationToken, LabelledJoinSet, TaskClass, TaskFailure};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::candidate::{ArgsHint, Category, IconRef, ProviderId, ScoredCandidate};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::navigation::{NavigationFrame, NavigationStack};
use crate::provider::ProviderRegistry;
use crate::session::{ActiveSession, SearchSession, SessionScope};
use crate::store::{EngineEvent, SharedStore, StoreSnapshot};

/// What the cancel/back gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
	/// The input had text; it was cleared and the stack left alone.
	ClearedInput,
	/// The input was empty; the top drilldown frame was popped.
	Popped,
	/// Nothing left to undo; the surface should be hidden.
	Dismissed,
}

/// Something the host must open on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
	File(String),
	Url(String),
}

/// What committing the current selection did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
	/// No selection.
	Nothing,
	/// The candidate requires arguments and became a drilldown frame.
	DrilledDown,
	/// The host should open this target; the surface was dismissed.
	Open(Launch),
	/// The owning provider's `execute` was started; the surface was dismissed.
	Executed,
	/// The candidate's category cannot be committed.
	Unsupported,
}

/// Owns the result store, the navigation stack and the current session.
///
/// Every input change supersedes the running session before anything else
/// happens. The store lock is never held across a provider call.
pub struct Orchestrator {
	registry: ProviderRegistry,
	catalog: Catalog,
	store: SharedStore,
	stack: NavigationStack,
	input: String,
	generation: Generation,
	active: Option<ActiveSession>,
	suggest_timeout: Option<Duration>,
}

impl Orchestrator {
	/// Creates an orchestrator and the channel its change notifications
	/// arrive on.
	pub fn new(registry: ProviderRegistry, config: &EngineConfig) -> (Self, UnboundedReceiver<EngineEvent>) {
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let orchestrator = Self {
			registry,
			catalog: Catalog::default(),
			store: SharedStore::new(events_tx),
			stack: NavigationStack::new(),
			input: String::new(),
			generation: Generation::ZERO,
			active: None,
			suggest_timeout: config.suggest_timeout(),
		};
		(orchestrator, events_rx)
	}

	pub fn registry(&self) -> &ProviderRegistry {
		&self.registry
	}

	/// Re-enumerates every provider's static items and swaps the catalog.
	pub fn rebuild_catalog(&self) -> usize {
		self.catalog.rebuild(&self.registry)
	}

	pub fn catalog_len(&self) -> usize {
		self.catalog.len()
	}

	/// Runs every provider's `refresh` concurrently, then rebuilds the catalog.
	///
	/// Failing or panicking providers are logged; the catalog is rebuilt
	/// regardless. Returns the number of catalog entries.
	pub async fn refresh_providers(&self) -> usize {
		let mut refreshes = LabelledJoinSet::new(TaskClass::Background);
		for (id, provider) in self.registry.iter() {
			let provider = Arc::clone(provider);
			refreshes.spawn(id.to_string(), async move { provider.refresh().await });
		}

		while let Some((provider, outcome)) = refreshes.join_next().await {
			match outcome {
				Ok(Ok(())) => tracing::debug!(%provider, "provider refreshed"),
				Ok(Err(error)) => tracing::warn!(%provider, %error, "provider refresh failed"),
				Err(failure) => tracing::warn!(%provider, %failure, "provider refresh did not complete"),
			}
		}

		self.rebuild_catalog()
	}

	pub fn input(&self) -> &str {
		&self.input
	}

	/// Replaces the input text and starts a new search for it.
	pub fn set_input(&mut self, text: impl Into<String>) {
		self.input = text.into();
		self.start_session();
	}

	/// Generation of the session that currently owns the store.
	pub fn generation(&self) -> Generation {
		self.generation
	}

	/// Providers the current session fanned out to.
	pub fn session_providers(&self) -> &[ProviderId] {
		self.active.as_ref().map(|active| active.providers.as_slice()).unwrap_or_default()
	}

	pub fn snapshot(&self) -> StoreSnapshot {
		self.store.snapshot()
	}

	pub fn selection(&self) -> Option<ScoredCandidate> {
		self.store.current_selection()
	}

	/// Moves the selection cursor; does not wrap.
	pub fn move_selection(&self, delta: isize) {
		self.store.move_selection(delta);
	}

	pub fn stack(&self) -> &NavigationStack {
		&self.stack
	}

	/// Icon for a result row, falling back to the provider's icon.
	pub fn icon_for(&self, item: &ScoredCandidate) -> Option<IconRef> {
		item.candidate
			.icon
			.clone()
			.or_else(|| self.registry.get(&item.provider).and_then(|provider| provider.icon()))
	}

	/// Drills into `candidate`: records the current input with it, clears the
	/// input and searches the candidate's own suggestion space.
	pub fn push(&mut self, candidate: ScoredCandidate) -> Result<()> {
		self.stack.push(candidate, self.input.as_str())?;
		tracing::debug!(depth = self.stack.depth(), "drilled down");
		self.input.clear();
		self.start_session();
		Ok(())
	}

	/// Leaves the top drilldown frame and restores the input it recorded.
	pub fn pop(&mut self) -> Option<NavigationFrame> {
		let frame = self.stack.pop()?;
		tracing::debug!(depth = self.stack.depth(), "popped drilldown frame");
		self.input.clone_from(&frame.search_text);
		self.start_session();
		Some(frame)
	}

	/// Drills into the current selection (the tab gesture).
	///
	/// Returns `Ok(false)` without a selection.
	pub fn drill(&mut self) -> Result<bool> {
		let Some(selected) = self.selection() else {
			return Ok(false);
		};
		self.push(selected)?;
		Ok(true)
	}

	/// The cancel/back gesture: clear the input, else pop, else dismiss.
	pub fn cancel(&mut self) -> CancelOutcome {
		if !self.input.is_empty() {
			self.set_input(String::new());
			CancelOutcome::ClearedInput
		} else if self.pop().is_some() {
			CancelOutcome::Popped
		} else {
			self.dismiss();
			CancelOutcome::Dismissed
		}
	}

	/// Resets everything the surface shows: stack, input, session and store.
	pub fn dismiss(&mut self) {
		self.stack.reset();
		self.input.clear();
		if let Some(previous) = self.active.take() {
			previous.supersede();
		}
		self.generation = self.generation.next();
		self.store.begin(self.generation, None);
	}

	/// Commits the current selection (the enter gesture).
	pub fn commit(&mut self) -> Result<CommitOutcome> {
		let Some(selected) = self.selection() else {
			return Ok(CommitOutcome::Nothing);
		};

		if selected.candidate.args == ArgsHint::Required {
			self.push(selected)?;
			return Ok(CommitOutcome::DrilledDown);
		}

		let outcome = match selected.candidate.category {
			Category::File => {
				tracing::info!(path = %selected.candidate.target, "opening file");
				CommitOutcome::Open(Launch::File(selected.candidate.target.clone()))
			}
			Category::Url => {
				tracing::info!(url = %selected.candidate.target, "opening url");
				CommitOutcome::Open(Launch::Url(selected.candidate.target.clone()))
			}
			Category::User(_) => {
				self.execute(&selected)?;
				CommitOutcome::Executed
			}
			Category::Error | Category::Keyword => {
				tracing::warn!(label = %selected.label(), category = ?selected.candidate.category, "cannot commit this category");
				return Ok(CommitOutcome::Unsupported);
			}
		};

		self.dismiss();
		Ok(outcome)
	}

	fn execute(&self, selected: &ScoredCandidate) -> Result<()> {
		let provider = self
			.registry
			.get(&selected.provider)
			.map(Arc::clone)
			.ok_or_else(|| Error::UnknownProvider(selected.provider.to_string()))?;
		let candidate = Arc::clone(&selected.candidate);
		let id = selected.provider.clone();
		tracing::info!(provider = %id, label = %candidate.label, "executing candidate");

		let execution = kestrel_worker::spawn_blocking(TaskClass::Blocking, move || provider.execute(&candidate));
		kestrel_worker::spawn(TaskClass::Background, async move {
			if let Err(err) = execution.await {
				tracing::warn!(provider = %id, failure = %TaskFailure::from(err), "execute did not complete");
			}
		});
		Ok(())
	}

	fn start_session(&mut self) {
		if let Some(previous) = self.active.take() {
			previous.supersede();
		}

		let normalized: Arc<str> = Arc::from(self.input.trim().to_lowercase());
		self.generation = self.generation.next();
		let generation = self.generation;

		let initial = (self.stack.is_empty() && !normalized.is_empty()).then(|| self.catalog.scan(&self.registry, &normalized));
		self.store.begin(generation, initial);

		let scope = match self.stack.owner() {
			None => SessionScope::Broadcast,
			Some(owner) => SessionScope::Drilldown {
				owner: owner.clone(),
				chain: self.stack.chain(),
			},
		};
		let session = SearchSession {
			token: GenerationToken::new(generation),
			query: self.input.clone(),
			normalized,
			scope,
		};
		self.active = Some(session.dispatch(&self.registry, self.store.clone(), self.suggest_timeout));
	}
}

impl Drop for Orchestrator {
	fn drop(&mut self) {
		if let Some(active) = self.active.take() {
			active.supersede();
		}
	}
}

impl std::fmt::Debug for Orchestrator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Orchestrator")
			.field("providers", &self.registry)
			.field("input", &self.input)
			.field("depth", &self.stack.depth())
			.field("generation", &self.generation)
			.finish_non_exhaustive()
	}
}
