//! Drilldown history.
//!
//! Each frame records a candidate the user drilled into and the input text
//! that was active at that moment, so popping the frame can restore it.

use std::sync::Arc;

use crate::candidate::{Candidate, ProviderId, ScoredCandidate};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct NavigationFrame {
	pub candidate: ScoredCandidate,
	/// Input text at the time of the drilldown.
	pub search_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
	frames: Vec<NavigationFrame>,
}

impl NavigationStack {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pushes a drilldown frame.
	///
	/// Fails with [`Error::InvalidDrilldown`] when the candidate's argument hint
	/// is [`ArgsHint::Forbidden`](crate::ArgsHint::Forbidden).
	pub fn push(&mut self, candidate: ScoredCandidate, search_text: impl Into<String>) -> Result<()> {
		if !candidate.candidate.args.allows_drilldown() {
			return Err(Error::InvalidDrilldown {
				label: candidate.candidate.label.clone(),
			});
		}
		self.frames.push(NavigationFrame {
			candidate,
			search_text: search_text.into(),
		});
		Ok(())
	}

	pub fn pop(&mut self) -> Option<NavigationFrame> {
		self.frames.pop()
	}

	pub fn reset(&mut self) {
		self.frames.clear();
	}

	pub fn top(&self) -> Option<&NavigationFrame> {
		self.frames.last()
	}

	/// Provider that owns the top frame's candidate, which is the only one
	/// queried while the stack is non-empty.
	pub fn owner(&self) -> Option<&ProviderId> {
		self.top().map(|frame| &frame.candidate.provider)
	}

	/// Candidates from the bottom frame to the top one.
	pub fn chain(&self) -> Vec<Arc<Candidate>> {
		self.frames.iter().map(|frame| Arc::clone(&frame.candidate.candidate)).collect()
	}

	pub fn frames(&self) -> &[NavigationFrame] {
		&self.frames
	}

	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}
}
