/// Execution classes used for task routing and log attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Merging provider batches into the visible result set.
	Interactive,
	/// One provider `suggest` call for one session.
	Provider,
	/// Provider refreshes and other work nobody waits on interactively.
	Background,
	/// Blocking provider hooks such as `execute`.
	Blocking,
}

impl TaskClass {
	/// Stable name used in tracing fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Provider => "provider",
			Self::Background => "background",
			Self::Blocking => "blocking",
		}
	}
}
