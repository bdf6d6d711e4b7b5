//! Base64 transforms of the typed text.
//!
//! Offers one catalog entry, "String: Base64". Drilling into it turns every
//! query into its encoding and, when the query is valid base64, its decoding.
//! Committing a result writes it to stderr, away from the listing on stdout.

use std::io::Write;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kestrel_engine::{
	ArgsHint, Candidate, Category, IconRef, MatchMode, Payload, Provider, ProviderError, SuggestRequest, SuggestionSink,
};
use parking_lot::Mutex;

const STRING_TOOL: Category = Category::User(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
	Encoded,
	Decoded,
}

pub struct Strings {
	output: Mutex<Box<dyn Write + Send>>,
}

impl Strings {
	/// Writes committed results to `output` instead of stderr.
	pub fn with_output(output: impl Write + Send + 'static) -> Self {
		Self {
			output: Mutex::new(Box::new(output)),
		}
	}
}

impl Default for Strings {
	fn default() -> Self {
		Self::with_output(std::io::stderr())
	}
}

impl std::fmt::Debug for Strings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Strings").finish_non_exhaustive()
	}
}

#[async_trait]
impl Provider for Strings {
	fn name(&self) -> &str {
		"str"
	}

	fn icon(&self) -> Option<IconRef> {
		Some(IconRef::new("text"))
	}

	fn static_items(&self) -> Result<Vec<Candidate>, ProviderError> {
		Ok(vec![
			Candidate::new("String: Base64")
				.with_category(STRING_TOOL)
				.with_args(ArgsHint::Required),
		])
	}

	async fn suggest(&self, request: SuggestRequest, sink: SuggestionSink) {
		if request.chain.is_empty() {
			return;
		}
		sink.deliver(transforms(&request.query), MatchMode::Any);
	}

	fn execute(&self, candidate: &Candidate) {
		let transform = candidate.payload.as_ref().and_then(|payload| payload.downcast_ref::<Transform>());
		tracing::info!(?transform, "emitting transformed string");
		let mut output = self.output.lock();
		if let Err(error) = writeln!(output, "{}", candidate.target).and_then(|()| output.flush()) {
			tracing::warn!(%error, "could not write transformed string");
		}
	}
}

fn transforms(input: &str) -> Vec<Candidate> {
	if input.is_empty() {
		return Vec::new();
	}

	let encoded = STANDARD.encode(input);
	let mut out = vec![transformed(encoded, "Encoded string", Transform::Encoded)];

	if let Some(decoded) = STANDARD.decode(input).ok().and_then(|bytes| String::from_utf8(bytes).ok()) {
		out.push(transformed(decoded, "Decoded string", Transform::Decoded));
	}
	out
}

fn transformed(text: String, description: &str, transform: Transform) -> Candidate {
	Candidate::new(text.clone())
		.with_description(description)
		.with_category(STRING_TOOL)
		.with_target(text)
		.with_payload(Payload::new(transform))
}
