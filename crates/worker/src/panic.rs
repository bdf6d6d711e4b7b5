use std::fmt;

use tokio::task::JoinError;

/// Why a joined task produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
	/// The task panicked; carries the panic message when it was a string.
	Panicked(String),
	/// The task was aborted before completing.
	Cancelled,
}

impl From<JoinError> for TaskFailure {
	fn from(err: JoinError) -> Self {
		match join_error_panic_message(err) {
			Some(message) => Self::Panicked(message),
			None => Self::Cancelled,
		}
	}
}

impl fmt::Display for TaskFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Panicked(message) => write!(f, "panicked: {message}"),
			Self::Cancelled => f.write_str("cancelled"),
		}
	}
}

/// Extracts the panic message from a [`JoinError`].
///
/// Returns `None` for cancellation. Non-string payloads yield a placeholder.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}

	let payload = err.into_panic();
	let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
		(*s).to_owned()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"<non-string panic payload>".to_owned()
	};
	Some(message)
}
