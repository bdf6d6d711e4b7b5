//! Ranked result set and its locked, generation-aware wrapper.

use std::sync::Arc;

use kestrel_worker::Generation;
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::candidate::ScoredCandidate;

/// Notification sent to the host. Carries no data; the host re-reads
/// [`StoreSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineEvent {
	SuggestionsChanged,
}

/// Ordered suggestions plus the selection cursor.
///
/// Items are sorted descending by score; equal scores keep discovery order.
/// The selection is `None` exactly when there is nothing to select.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
	items: Vec<ScoredCandidate>,
	selection: Option<usize>,
}

impl ResultStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn clear(&mut self) {
		self.items.clear();
		self.selection = None;
	}

	/// Replaces the contents with a fresh result set and selects its top item.
	pub fn replace(&mut self, items: Vec<ScoredCandidate>) {
		self.items = items;
		sort_by_score(&mut self.items);
		self.selection = if self.items.is_empty() { None } else { Some(0) };
	}

	/// Appends a batch after the existing items and re-sorts the whole set.
	///
	/// An existing selection index is kept; an empty store that gains items
	/// selects its top item.
	pub fn merge(&mut self, batch: Vec<ScoredCandidate>) {
		self.items.extend(batch);
		sort_by_score(&mut self.items);
		if self.selection.is_none() && !self.items.is_empty() {
			self.selection = Some(0);
		}
	}

	/// Moves the cursor by `delta`, stopping at either end.
	pub fn move_selection(&mut self, delta: isize) {
		let Some(current) = self.selection else {
			return;
		};
		let last = self.items.len().saturating_sub(1);
		self.selection = Some(current.saturating_add_signed(delta).min(last));
	}

	pub fn current_selection(&self) -> Option<&ScoredCandidate> {
		self.selection.and_then(|idx| self.items.get(idx))
	}

	pub fn items(&self) -> &[ScoredCandidate] {
		&self.items
	}

	pub fn selection(&self) -> Option<usize> {
		self.selection
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

fn sort_by_score(items: &mut [ScoredCandidate]) {
	items.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Owned copy of the store taken under its lock.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
	pub items: Vec<ScoredCandidate>,
	pub selection: Option<usize>,
	/// Session generation the contents belong to.
	pub generation: Generation,
}

impl StoreSnapshot {
	pub fn labels(&self) -> Vec<&str> {
		self.items.iter().map(ScoredCandidate::label).collect()
	}

	pub fn selected(&self) -> Option<&ScoredCandidate> {
		self.selection.and_then(|idx| self.items.get(idx))
	}
}

#[derive(Debug, Default)]
struct StoreState {
	generation: Generation,
	results: ResultStore,
}

/// [`ResultStore`] behind one lock together with the generation of the
/// session allowed to write to it.
///
/// Every mutation runs under the lock for the length of an in-memory sort at
/// most; notifications go out after it is released.
#[derive(Debug, Clone)]
pub(crate) struct SharedStore {
	state: Arc<Mutex<StoreState>>,
	events: UnboundedSender<EngineEvent>,
}

impl SharedStore {
	pub(crate) fn new(events: UnboundedSender<EngineEvent>) -> Self {
		Self {
			state: Arc::default(),
			events,
		}
	}

	/// Hands the store to `generation`: later merges from older sessions are
	/// rejected. `initial` replaces the contents, `None` clears them.
	pub(crate) fn begin(&self, generation: Generation, initial: Option<Vec<ScoredCandidate>>) {
		{
			let mut state = self.state.lock();
			state.generation = generation;
			match initial {
				Some(items) => state.results.replace(items),
				None => state.results.clear(),
			}
		}
		self.notify();
	}

	/// Merges `batch` if `generation` still owns the store.
	pub(crate) fn merge(&self, generation: Generation, batch: Vec<ScoredCandidate>) -> bool {
		let count = batch.len();
		{
			let mut state = self.state.lock();
			if state.generation != generation {
				tracing::trace!(%generation, current = %state.generation, count, "dropped stale batch");
				return false;
			}
			state.results.merge(batch);
		}
		tracing::debug!(%generation, count, "merged batch");
		self.notify();
		true
	}

	pub(crate) fn move_selection(&self, delta: isize) {
		self.state.lock().results.move_selection(delta);
	}

	pub(crate) fn current_selection(&self) -> Option<ScoredCandidate> {
		self.state.lock().results.current_selection().cloned()
	}

	pub(crate) fn snapshot(&self) -> StoreSnapshot {
		let state = self.state.lock();
		StoreSnapshot {
			items: state.results.items().to_vec(),
			selection: state.results.selection(),
			generation: state.generation,
		}
	}

	fn notify(&self) {
		// A closed receiver means the host has gone away; nothing to tell.
		let _ = self.events.send(EngineEvent::SuggestionsChanged);
	}
}
