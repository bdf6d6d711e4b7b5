//! User-defined bookmarks to files and URLs.
//!
//! ```toml
//! [[provider.shortcuts.entry]]
//! label = "Rust docs"
//! target = "https://doc.rust-lang.org/std/"
//!
//! [[provider.shortcuts.entry]]
//! label = "Notes"
//! target = "/home/me/notes.md"
//! kind = "file"
//! ```

use async_trait::async_trait;
use kestrel_engine::{Candidate, Category, IconRef, Provider, ProviderError, SuggestRequest, SuggestionSink};
use parking_lot::RwLock;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Section {
	#[serde(default)]
	entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Entry {
	label: String,
	target: String,
	#[serde(default)]
	kind: EntryKind,
	#[serde(default)]
	description: String,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EntryKind {
	File,
	#[default]
	Url,
}

impl Entry {
	fn into_candidate(self) -> Candidate {
		let category = match self.kind {
			EntryKind::File => Category::File,
			EntryKind::Url => Category::Url,
		};
		Candidate::new(self.label)
			.with_description(self.description)
			.with_category(category)
			.with_target(self.target)
	}
}

/// Static catalog built from the `shortcuts` configuration section.
#[derive(Debug, Default)]
pub struct Shortcuts {
	entries: RwLock<Vec<Candidate>>,
}

#[async_trait]
impl Provider for Shortcuts {
	fn name(&self) -> &str {
		"shortcuts"
	}

	fn icon(&self) -> Option<IconRef> {
		Some(IconRef::new("bookmark"))
	}

	fn configure(&self, section: &toml::Table) -> Result<(), ProviderError> {
		let section: Section = toml::Value::Table(section.clone()).try_into()?;
		let entries: Vec<_> = section.entry.into_iter().map(Entry::into_candidate).collect();
		tracing::debug!(count = entries.len(), "configured shortcuts");
		*self.entries.write() = entries;
		Ok(())
	}

	fn static_items(&self) -> Result<Vec<Candidate>, ProviderError> {
		Ok(self.entries.read().clone())
	}

	async fn suggest(&self, _request: SuggestRequest, _sink: SuggestionSink) {}

	fn execute(&self, candidate: &Candidate) {
		// Files and URLs are opened by the host, so nothing gets here.
		tracing::debug!(label = %candidate.label, "shortcut has nothing to execute");
	}
}
