//! Candidate data model.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// What a candidate's target refers to, which decides how committing it is
/// handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	/// A provider reporting a problem as a visible row.
	Error,
	Keyword,
	/// Target is a filesystem path to open.
	File,
	/// Target is a URL to open.
	Url,
	/// Provider-defined kind; committing calls the provider's `execute`.
	User(u32),
}

/// Whether a candidate can become the context of a refined sub-search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgsHint {
	#[default]
	Forbidden,
	/// Drilldown is available on request (tab).
	Accepted,
	/// Committing the candidate drills down instead of executing it.
	Required,
}

impl ArgsHint {
	pub const fn allows_drilldown(self) -> bool {
		matches!(self, Self::Accepted | Self::Required)
	}
}

/// Opaque icon reference (a path or resource name) resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRef(Arc<str>);

impl IconRef {
	pub fn new(reference: impl Into<Arc<str>>) -> Self {
		Self(reference.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// Provider-defined data attached to a candidate, read back by the owning
/// provider via [`Payload::downcast_ref`].
#[derive(Clone)]
pub struct Payload(Arc<dyn Any + Send + Sync>);

impl Payload {
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self(Arc::new(value))
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.downcast_ref()
	}
}

impl fmt::Debug for Payload {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Payload(..)")
	}
}

/// One suggestable action or object. Immutable once produced.
#[derive(Debug, Clone)]
pub struct Candidate {
	pub label: String,
	pub description: String,
	pub category: Category,
	/// Interpretation depends on [`Self::category`].
	pub target: String,
	pub payload: Option<Payload>,
	pub args: ArgsHint,
	pub icon: Option<IconRef>,
}

impl Candidate {
	/// A keyword candidate with only a label.
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			description: String::new(),
			category: Category::Keyword,
			target: String::new(),
			payload: None,
			args: ArgsHint::Forbidden,
			icon: None,
		}
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	pub fn with_category(mut self, category: Category) -> Self {
		self.category = category;
		self
	}

	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = target.into();
		self
	}

	pub fn with_args(mut self, args: ArgsHint) -> Self {
		self.args = args;
		self
	}

	pub fn with_icon(mut self, icon: IconRef) -> Self {
		self.icon = Some(icon);
		self
	}

	pub fn with_payload(mut self, payload: Payload) -> Self {
		self.payload = Some(payload);
		self
	}

	/// Normalized label used for fuzzy matching.
	pub(crate) fn lookup_name(&self) -> String {
		self.label.to_lowercase()
	}
}

/// How the engine should rank a delivered batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
	/// The provider vouches for relevance; every candidate scores `1.0`.
	Any,
	/// The engine scores each label against the query and drops non-matches.
	Fuzzy,
}

/// Stable provider identity, used to route drilldown queries and commits back
/// to the provider that produced a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(Arc<str>);

impl ProviderId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ProviderId {
	fn from(name: &str) -> Self {
		Self(Arc::from(name))
	}
}

impl fmt::Display for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A candidate ranked for the current query. Recreated on every scoring pass.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
	pub candidate: Arc<Candidate>,
	/// Match quality in `[0, 1]`.
	pub score: f64,
	pub provider: ProviderId,
}

impl ScoredCandidate {
	pub fn new(candidate: Arc<Candidate>, score: f64, provider: ProviderId) -> Self {
		Self { candidate, score, provider }
	}

	pub fn label(&self) -> &str {
		&self.candidate.label
	}
}
